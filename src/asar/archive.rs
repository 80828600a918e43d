use std::fs;
use std::path::{Path, PathBuf};

use crate::asar::header::{parse_header, AsarDirectory, FileRecord};
use crate::asar::integrity::{self, IntegrityCheck};
use crate::error::{AsarPickError, Result};

/// A loaded archive: the raw bytes plus the parsed index. Reads are slices
/// of the in-memory content region, checked against the recorded integrity.
#[derive(Debug)]
pub struct AsarArchive {
    path: PathBuf,
    data: Vec<u8>,
    root: AsarDirectory,
    content_start: u64,
}

/// Bytes of one entry plus the integrity verdict, when the index carried
/// checksums for it. A failed check does not withhold the content.
#[derive(Debug)]
pub struct EntryData {
    pub bytes: Vec<u8>,
    pub integrity: Option<IntegrityCheck>,
}

impl AsarArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => AsarPickError::SourceNotFound {
                path: path.display().to_string(),
            },
            _ => AsarPickError::Read {
                path: path.display().to_string(),
                source,
            },
        })?;
        let (root, content_start) = parse_header(path, &data)?;
        Ok(Self {
            path: path.to_path_buf(),
            data,
            root,
            content_start,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn root(&self) -> &AsarDirectory {
        &self.root
    }

    pub fn content_start(&self) -> u64 {
        self.content_start
    }

    /// Reads a file directly inside the archive root.
    pub fn read_root_file(&self, name: &str) -> Result<EntryData> {
        let record = self
            .root
            .file(name)
            .ok_or_else(|| self.malformed(format!("no file entry named '{}' at archive root", name)))?;
        self.read_entry(name, record)
    }

    pub fn read_entry(&self, name: &str, record: &FileRecord) -> Result<EntryData> {
        if record.unpacked {
            return Err(AsarPickError::UnpackedEntry {
                name: name.to_string(),
            });
        }

        let offset = record
            .data_offset()
            .ok_or_else(|| self.malformed(format!("file entry '{}' has no content offset", name)))?;

        let start = self.content_start.checked_add(offset);
        let end = start.and_then(|start| start.checked_add(record.size));
        let range = match (start, end) {
            (Some(start), Some(end)) if end <= self.data.len() as u64 => {
                start as usize..end as usize
            }
            _ => {
                return Err(self.malformed(format!(
                    "content range for '{}' ({} bytes at offset {}) runs past the end of the archive",
                    name, record.size, offset
                )))
            }
        };

        let bytes = self.data[range].to_vec();
        let integrity = record
            .integrity
            .as_ref()
            .map(|integrity| integrity::verify(&bytes, integrity));

        Ok(EntryData { bytes, integrity })
    }

    fn malformed(&self, reason: String) -> AsarPickError {
        AsarPickError::MalformedArchive {
            path: self.path.display().to_string(),
            reason,
        }
    }
}
