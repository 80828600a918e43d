use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::asar::{AsarArchive, EntryData};
use crate::error::{AsarPickError, Result};

/// One entry directly at the bundle root. Only files are entries;
/// directories are never extraction candidates.
#[derive(Debug, Clone)]
pub struct BundleEntry {
    pub name: String,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleInfo {
    pub location: String,
    pub packed: bool,
}

/// The application bundle under `<resources>/app/`, in either of the two
/// shapes it ships in. Both flavors present the same directory-tree view,
/// so callers never touch the archive format.
#[derive(Debug)]
pub enum AppBundle {
    /// The packed `application.asar`, addressed by callers through its
    /// logical directory path (without the archive extension).
    Archive {
        archive: AsarArchive,
        virtual_dir: PathBuf,
    },
    /// An already-unpacked `application` directory.
    Directory { dir: PathBuf },
}

impl AppBundle {
    /// Resolves the bundle under `<resources>/<app_dir>/`. The packed
    /// archive wins when both shapes exist; the error names the archive
    /// path, the canonical location.
    pub fn locate(resources: &Path, app_dir: &str, bundle_name: &str) -> Result<Self> {
        let base = resources.join(app_dir);
        let archive_path = base.join(format!("{}.asar", bundle_name));
        let dir_path = base.join(bundle_name);

        if archive_path.is_file() {
            let archive = AsarArchive::open(&archive_path)?;
            return Ok(AppBundle::Archive {
                archive,
                virtual_dir: dir_path,
            });
        }

        if dir_path.is_dir() {
            return Ok(AppBundle::Directory { dir: dir_path });
        }

        Err(AsarPickError::SourceNotFound {
            path: archive_path.display().to_string(),
        })
    }

    /// The on-disk location entries are actually read from.
    pub fn location(&self) -> &Path {
        match self {
            AppBundle::Archive { archive, .. } => archive.path(),
            AppBundle::Directory { dir } => dir,
        }
    }

    pub fn is_packed(&self) -> bool {
        matches!(self, AppBundle::Archive { .. })
    }

    pub fn info(&self) -> BundleInfo {
        BundleInfo {
            location: self.location().display().to_string(),
            packed: self.is_packed(),
        }
    }

    /// The logical source path an entry is presented under in progress
    /// output: the bundle's directory name plus the entry name.
    pub fn entry_source_path(&self, name: &str) -> PathBuf {
        match self {
            AppBundle::Archive { virtual_dir, .. } => virtual_dir.join(name),
            AppBundle::Directory { dir } => dir.join(name),
        }
    }

    /// Root-level file entries, in name order.
    pub fn entries(&self) -> Result<Vec<BundleEntry>> {
        match self {
            AppBundle::Archive { archive, .. } => {
                let mut entries = Vec::new();
                for (name, record) in archive.root().file_entries() {
                    // Index keys are single path components; anything else
                    // could escape the output directory on write.
                    if name.contains(['/', '\\']) || name == ".." {
                        return Err(AsarPickError::MalformedArchive {
                            path: archive.path().display().to_string(),
                            reason: format!("entry name '{}' escapes the bundle root", name),
                        });
                    }
                    entries.push(BundleEntry {
                        name: name.to_string(),
                        size: record.size,
                        modified: None,
                    });
                }
                Ok(entries)
            }
            AppBundle::Directory { dir } => list_directory(dir),
        }
    }

    pub fn read(&self, name: &str) -> Result<EntryData> {
        match self {
            AppBundle::Archive { archive, .. } => archive.read_root_file(name),
            AppBundle::Directory { dir } => {
                let path = dir.join(name);
                let bytes = fs::read(&path).map_err(|source| AsarPickError::Read {
                    path: path.display().to_string(),
                    source,
                })?;
                Ok(EntryData {
                    bytes,
                    integrity: None,
                })
            }
        }
    }
}

fn list_directory(dir: &Path) -> Result<Vec<BundleEntry>> {
    let mut entries = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false);

    for entry in walker {
        let entry = entry.map_err(|error| read_error(dir, error))?;

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata().map_err(|error| read_error(dir, error))?;

        entries.push(BundleEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            size: metadata.len(),
            modified: metadata.modified().ok(),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn read_error(dir: &Path, error: walkdir::Error) -> AsarPickError {
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "filesystem loop"));
    AsarPickError::Read {
        path: dir.display().to_string(),
        source,
    }
}
