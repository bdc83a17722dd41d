//! Minimal ZIP central-directory reader.
//!
//! Only the records needed to list entries are parsed: the end-of-central-
//! directory record and the central file headers. Entry data is never read.

use crate::error::ArchiveError;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Seek, SeekFrom};

const EOCD_SIGNATURE: u32 = 0x0605_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;

/// Fixed part of the end-of-central-directory record.
const EOCD_SIZE: u64 = 22;
/// Longest archive comment the EOCD can announce.
const MAX_COMMENT: u64 = u16::MAX as u64;

/// Entry counts and offsets announced by the end-of-central-directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EndOfCentralDirectory {
    pub entry_count: u16,
    pub directory_size: u32,
    pub directory_offset: u32,
}

/// Locates and decodes the end-of-central-directory record.
///
/// The record sits in the last `22 + 65535` bytes; the search walks
/// backwards so a signature inside the comment does not shadow the real one.
pub(crate) fn read_eocd<R: Read + Seek>(
    reader: &mut R,
    size: u64,
) -> Result<EndOfCentralDirectory, ArchiveError> {
    if size < EOCD_SIZE {
        return Err(ArchiveError::Malformed(format!(
            "{} bytes is too short for an end-of-central-directory record",
            size
        )));
    }

    let tail_len = size.min(EOCD_SIZE + MAX_COMMENT);
    let tail_start = size - tail_len;
    reader.seek(SeekFrom::Start(tail_start))?;
    let mut tail = vec![0u8; tail_len as usize];
    reader.read_exact(&mut tail)?;

    let last_candidate = tail.len() - EOCD_SIZE as usize;
    for pos in (0..=last_candidate).rev() {
        let mut record = &tail[pos..];
        if record.read_u32::<LittleEndian>()? != EOCD_SIGNATURE {
            continue;
        }

        let disk = record.read_u16::<LittleEndian>()?;
        let directory_disk = record.read_u16::<LittleEndian>()?;
        let entries_on_disk = record.read_u16::<LittleEndian>()?;
        let entry_count = record.read_u16::<LittleEndian>()?;
        let directory_size = record.read_u32::<LittleEndian>()?;
        let directory_offset = record.read_u32::<LittleEndian>()?;
        let comment_len = record.read_u16::<LittleEndian>()?;

        // The comment must run exactly to the end of the file.
        if pos + EOCD_SIZE as usize + comment_len as usize != tail.len() {
            continue;
        }
        if disk != 0 || directory_disk != 0 || entries_on_disk != entry_count {
            return Err(ArchiveError::Malformed(
                "multi-disk archives are not supported".to_string(),
            ));
        }
        if entry_count == u16::MAX || directory_offset == u32::MAX {
            return Err(ArchiveError::Malformed(
                "ZIP64 archives are not supported".to_string(),
            ));
        }

        let eocd_offset = tail_start + pos as u64;
        let directory_end = u64::from(directory_offset) + u64::from(directory_size);
        if directory_end > eocd_offset {
            return Err(ArchiveError::Malformed(format!(
                "central directory ends at {} past its end record at {}",
                directory_end, eocd_offset
            )));
        }

        return Ok(EndOfCentralDirectory {
            entry_count,
            directory_size,
            directory_offset,
        });
    }

    Err(ArchiveError::Malformed(
        "end-of-central-directory record not found".to_string(),
    ))
}

/// One central file header, reduced to what the validators need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CentralHeader {
    pub name: String,
    pub method: u16,
}

/// Reads the next central file header.
pub(crate) fn read_central_header<R: Read>(reader: &mut R) -> Result<CentralHeader, ArchiveError> {
    let signature = reader.read_u32::<LittleEndian>().map_err(truncated)?;
    if signature != CENTRAL_HEADER_SIGNATURE {
        return Err(ArchiveError::Malformed(format!(
            "bad central header signature 0x{:08x}",
            signature
        )));
    }

    let _version_made_by = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let _version_needed = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let _flags = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let method = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let _mod_time = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let _mod_date = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let _crc32 = reader.read_u32::<LittleEndian>().map_err(truncated)?;
    let _compressed_size = reader.read_u32::<LittleEndian>().map_err(truncated)?;
    let _uncompressed_size = reader.read_u32::<LittleEndian>().map_err(truncated)?;
    let name_len = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let extra_len = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let comment_len = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let _disk_start = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let _internal_attributes = reader.read_u16::<LittleEndian>().map_err(truncated)?;
    let _external_attributes = reader.read_u32::<LittleEndian>().map_err(truncated)?;
    let _local_header_offset = reader.read_u32::<LittleEndian>().map_err(truncated)?;

    let mut name = vec![0u8; name_len as usize];
    reader.read_exact(&mut name).map_err(truncated)?;

    let skip = u64::from(extra_len) + u64::from(comment_len);
    let skipped = io::copy(&mut reader.by_ref().take(skip), &mut io::sink())?;
    if skipped != skip {
        return Err(ArchiveError::Malformed(
            "central directory truncated".to_string(),
        ));
    }

    Ok(CentralHeader {
        name: String::from_utf8_lossy(&name).into_owned(),
        method,
    })
}

/// A short read inside the central directory means the announced size lied.
fn truncated(err: io::Error) -> ArchiveError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        ArchiveError::Malformed("central directory truncated".to_string())
    } else {
        ArchiveError::Io(err)
    }
}
