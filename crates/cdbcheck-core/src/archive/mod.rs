//! Archive validator: container structure and entry names of tiled archives.

mod zip;

use crate::error::ArchiveError;
use crate::grammar::FilenameGrammar;
use crate::name::{validate_name, NameContext};
use crate::policy::ReferencePolicy;
use crate::report::{Violation, ViolationKind};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Largest archive size accepted, in bytes.
pub const MAX_ARCHIVE_SIZE: u64 = 32_000_000;

/// Compression method of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    Deflated,
    Other(u16),
}

impl Compression {
    pub fn from_method(method: u16) -> Self {
        match method {
            0 => Compression::Stored,
            8 => Compression::Deflated,
            other => Compression::Other(other),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::Stored => f.write_str("stored"),
            Compression::Deflated => f.write_str("deflated"),
            Compression::Other(method) => write!(f, "method {}", method),
        }
    }
}

/// An entry as listed in the central directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub compression: Compression,
}

/// An open archive file.
///
/// Owns the file handle for as long as the descriptor lives; dropping it
/// closes the file, whichever check finished last.
#[derive(Debug)]
pub struct ArchiveDescriptor {
    file: File,
    size: u64,
    directory: Result<zip::EndOfCentralDirectory, String>,
}

impl ArchiveDescriptor {
    /// Opens the archive and locates its central directory.
    ///
    /// I/O failures are errors. A file that is not a well-formed container
    /// still opens; [`ArchiveDescriptor::is_valid_format`] reports it.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();

        let directory = match zip::read_eocd(&mut file, size) {
            Ok(eocd) => Ok(eocd),
            Err(ArchiveError::Malformed(reason)) => Err(reason),
            Err(err) => return Err(err),
        };

        Ok(Self {
            file,
            size,
            directory,
        })
    }

    /// Size of the archive file in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// True if the end-of-central-directory record was found and is consistent.
    pub fn is_valid_format(&self) -> bool {
        self.directory.is_ok()
    }

    /// Why the container is not well-formed, if it is not.
    pub fn format_error(&self) -> Option<&str> {
        self.directory.as_ref().err().map(String::as_str)
    }

    /// Lists entries lazily from the central directory.
    ///
    /// A malformed container yields no entries.
    pub fn entries(&self) -> Result<Entries<'_>, ArchiveError> {
        let Ok(eocd) = self.directory.as_ref() else {
            return Ok(Entries {
                reader: None,
                remaining: 0,
            });
        };

        let mut file = &self.file;
        file.seek(SeekFrom::Start(u64::from(eocd.directory_offset)))?;
        let reader = BufReader::new(file).take(u64::from(eocd.directory_size));
        Ok(Entries {
            reader: Some(reader),
            remaining: eocd.entry_count,
        })
    }
}

/// Iterator over the central directory of an [`ArchiveDescriptor`].
///
/// Stops after the first malformed header.
pub struct Entries<'a> {
    reader: Option<std::io::Take<BufReader<&'a File>>>,
    remaining: u16,
}

impl Iterator for Entries<'_> {
    type Item = Result<ArchiveEntry, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let reader = self.reader.as_mut()?;
        self.remaining -= 1;

        match zip::read_central_header(reader) {
            Ok(header) => Some(Ok(ArchiveEntry {
                name: header.name,
                compression: Compression::from_method(header.method),
            })),
            Err(err) => {
                self.remaining = 0;
                Some(Err(err))
            }
        }
    }
}

/// Checks the container: size bounds, format, and store-only compression.
///
/// A zero-length file gets only the size violation. Every other rule runs
/// independently of the others.
pub fn validate_archive(path: &Path) -> Vec<Violation> {
    let descriptor = match ArchiveDescriptor::open(path) {
        Ok(descriptor) => descriptor,
        Err(err) => return vec![unreadable(&err)],
    };

    let mut violations = Vec::new();
    if descriptor.size() == 0 {
        violations.push(structure("Zero-length ZIP archive".to_string()));
        return violations;
    }
    if descriptor.size() > MAX_ARCHIVE_SIZE {
        violations.push(structure(format!(
            "ZIP archive exceeds 32 Megabytes ({} bytes)",
            descriptor.size()
        )));
    }

    if let Some(reason) = descriptor.format_error() {
        tracing::debug!(path = %path.display(), reason, "malformed ZIP container");
        violations.push(structure("Invalid ZIP archive file".to_string()));
        return violations;
    }

    let entries = match descriptor.entries() {
        Ok(entries) => entries,
        Err(err) => {
            violations.push(unreadable(&err));
            return violations;
        }
    };
    for entry in entries {
        match entry {
            Ok(entry) if entry.compression != Compression::Stored => {
                violations.push(structure(format!(
                    "ZIP entry '{}' should not be compressed ({})",
                    entry.name, entry.compression
                )));
            }
            Ok(_) => {}
            Err(ArchiveError::Malformed(reason)) => {
                tracing::debug!(path = %path.display(), reason = %reason, "malformed central directory");
                violations.push(structure("Invalid ZIP archive file".to_string()));
            }
            Err(err) => violations.push(unreadable(&err)),
        }
    }

    violations
}

/// Checks every entry name against the dataset's entry grammar.
///
/// With an `archive_stem`, every entry must also start with it. Entries of an
/// unreadable or malformed container are not checked; the container defect is
/// reported by [`validate_archive`].
pub fn validate_entries(
    path: &Path,
    grammar: &FilenameGrammar,
    policy: &ReferencePolicy,
    archive_stem: Option<&str>,
) -> Vec<Violation> {
    let Ok(descriptor) = ArchiveDescriptor::open(path) else {
        return Vec::new();
    };
    let Ok(entries) = descriptor.entries() else {
        return Vec::new();
    };

    let ctx = archive_stem.map_or_else(NameContext::any_entry, NameContext::entry);
    let mut violations = Vec::new();
    for entry in entries {
        let Ok(entry) = entry else { break };
        // Directory records carry no payload.
        if entry.name.ends_with('/') {
            continue;
        }
        violations.extend(validate_name(&entry.name, grammar, policy, &ctx));
    }
    violations
}

fn structure(message: String) -> Violation {
    Violation::new(ViolationKind::ArchiveStructure, message)
}

fn unreadable(err: &ArchiveError) -> Violation {
    let detail = match err {
        ArchiveError::Io(io) => io.to_string(),
        ArchiveError::Malformed(reason) => reason.clone(),
    };
    structure(format!("Unable to read ZIP archive ({})", detail))
}
