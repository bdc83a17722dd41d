//! Writes small ZIP archives for tests.
//!
//! Entries are written with local headers, data and a central directory.
//! Data is never actually compressed; a deflated entry only carries the
//! method number, which is all the archive validator reads.

use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{self, Write};

const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4b50;
const EOCD_SIGNATURE: u32 = 0x0605_4b50;

/// Compression method recorded for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipMethod {
    Stored,
    Deflated,
}

impl ZipMethod {
    fn code(self) -> u16 {
        match self {
            ZipMethod::Stored => 0,
            ZipMethod::Deflated => 8,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    data: Vec<u8>,
    method: ZipMethod,
}

/// Builder for an in-memory ZIP archive.
#[derive(Debug, Clone, Default)]
pub struct ZipBuilder {
    entries: Vec<Entry>,
    comment: Vec<u8>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stored entry.
    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.entry(name, data, ZipMethod::Stored)
    }

    /// Adds an entry flagged as deflated.
    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        self.entry(name, data, ZipMethod::Deflated)
    }

    pub fn entry(mut self, name: &str, data: &[u8], method: ZipMethod) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            data: data.to_vec(),
            method,
        });
        self
    }

    /// Sets the archive comment stored after the end record.
    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    /// Serializes the archive.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out).expect("writing to a Vec cannot fail");
        out
    }

    fn write_to(&self, out: &mut Vec<u8>) -> io::Result<()> {
        let mut offsets = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            offsets.push(out.len() as u32);
            let crc = crc32(&entry.data);
            out.write_u32::<LittleEndian>(LOCAL_HEADER_SIGNATURE)?;
            out.write_u16::<LittleEndian>(20)?; // version needed
            out.write_u16::<LittleEndian>(0)?; // flags
            out.write_u16::<LittleEndian>(entry.method.code())?;
            out.write_u16::<LittleEndian>(0)?; // mod time
            out.write_u16::<LittleEndian>(0x21)?; // mod date: 1980-01-01
            out.write_u32::<LittleEndian>(crc)?;
            out.write_u32::<LittleEndian>(entry.data.len() as u32)?;
            out.write_u32::<LittleEndian>(entry.data.len() as u32)?;
            out.write_u16::<LittleEndian>(entry.name.len() as u16)?;
            out.write_u16::<LittleEndian>(0)?;
            out.write_all(entry.name.as_bytes())?;
            out.write_all(&entry.data)?;
        }

        let directory_offset = out.len() as u32;
        for (entry, offset) in self.entries.iter().zip(&offsets) {
            out.write_u32::<LittleEndian>(CENTRAL_HEADER_SIGNATURE)?;
            out.write_u16::<LittleEndian>(20)?; // version made by
            out.write_u16::<LittleEndian>(20)?;
            out.write_u16::<LittleEndian>(0)?;
            out.write_u16::<LittleEndian>(entry.method.code())?;
            out.write_u16::<LittleEndian>(0)?;
            out.write_u16::<LittleEndian>(0x21)?;
            out.write_u32::<LittleEndian>(crc32(&entry.data))?;
            out.write_u32::<LittleEndian>(entry.data.len() as u32)?;
            out.write_u32::<LittleEndian>(entry.data.len() as u32)?;
            out.write_u16::<LittleEndian>(entry.name.len() as u16)?;
            out.write_u16::<LittleEndian>(0)?; // extra
            out.write_u16::<LittleEndian>(0)?; // comment
            out.write_u16::<LittleEndian>(0)?; // disk start
            out.write_u16::<LittleEndian>(0)?; // internal attributes
            out.write_u32::<LittleEndian>(0)?; // external attributes
            out.write_u32::<LittleEndian>(*offset)?;
            out.write_all(entry.name.as_bytes())?;
        }
        let directory_size = out.len() as u32 - directory_offset;

        out.write_u32::<LittleEndian>(EOCD_SIGNATURE)?;
        out.write_u16::<LittleEndian>(0)?;
        out.write_u16::<LittleEndian>(0)?;
        out.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        out.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        out.write_u32::<LittleEndian>(directory_size)?;
        out.write_u32::<LittleEndian>(directory_offset)?;
        out.write_u16::<LittleEndian>(self.comment.len() as u16)?;
        out.write_all(&self.comment)?;
        Ok(())
    }
}

/// CRC-32 (IEEE), bitwise.
fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xedb8_8320 & mask);
        }
    }
    !crc
}
