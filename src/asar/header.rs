use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::asar::integrity::Integrity;
use crate::error::{AsarPickError, Result};

// Archive layout: a 16-byte prelude of four little-endian u32 pickle fields
// (the fourth is the JSON index length), the JSON index itself, then file
// content aligned to 4 bytes.
// Format reference: https://knifecoat.com/Posts/ASAR+Format+Spec
pub const INDEX_START: usize = 16;
const INDEX_LEN_FIELD: usize = 4;
pub const CONTENT_ALIGNMENT: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AsarEntry {
    Directory(AsarDirectory),
    File(FileRecord),
}

/// A folder node in the index. Folders are objects whose only key is
/// `files`; anything else is a file record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AsarDirectory {
    pub files: BTreeMap<String, AsarEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub size: u64,
    // Decimal string in the index, relative to the content region start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
    #[serde(default)]
    pub unpacked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrity: Option<Integrity>,
}

impl FileRecord {
    pub fn data_offset(&self) -> Option<u64> {
        self.offset.as_deref().and_then(|offset| offset.parse().ok())
    }
}

impl AsarDirectory {
    /// Looks up a file directly inside this folder. Subfolders are not
    /// descended into and never resolve as files.
    pub fn file(&self, name: &str) -> Option<&FileRecord> {
        match self.files.get(name) {
            Some(AsarEntry::File(record)) => Some(record),
            _ => None,
        }
    }

    /// Files directly inside this folder, in name order.
    pub fn file_entries(&self) -> impl Iterator<Item = (&str, &FileRecord)> {
        self.files.iter().filter_map(|(name, entry)| match entry {
            AsarEntry::File(record) => Some((name.as_str(), record)),
            AsarEntry::Directory(_) => None,
        })
    }
}

/// Parses the archive prelude and JSON index, returning the root folder and
/// the byte position where file content begins.
pub fn parse_header(path: &Path, data: &[u8]) -> Result<(AsarDirectory, u64)> {
    if data.len() < INDEX_START {
        return Err(malformed(
            path,
            format!(
                "file is {} bytes, shorter than the {}-byte prelude",
                data.len(),
                INDEX_START
            ),
        ));
    }

    let mut len_bytes = [0u8; INDEX_LEN_FIELD];
    len_bytes.copy_from_slice(&data[INDEX_START - INDEX_LEN_FIELD..INDEX_START]);
    let index_len = u32::from_le_bytes(len_bytes) as usize;

    let index_end = INDEX_START
        .checked_add(index_len)
        .filter(|end| *end <= data.len())
        .ok_or_else(|| {
            malformed(
                path,
                format!("JSON index of {} bytes runs past the end of the archive", index_len),
            )
        })?;

    let root: AsarDirectory = serde_json::from_slice(&data[INDEX_START..index_end])
        .map_err(|error| malformed(path, format!("undecodable JSON index: {}", error)))?;

    let content_start = index_end.div_ceil(CONTENT_ALIGNMENT) * CONTENT_ALIGNMENT;
    Ok((root, content_start as u64))
}

fn malformed(path: &Path, reason: String) -> AsarPickError {
    AsarPickError::MalformedArchive {
        path: path.display().to_string(),
        reason,
    }
}
