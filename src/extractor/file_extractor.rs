use crate::bundle::AppBundle;
use crate::error::{AsarPickError, Result};
use crate::scanner::PreloadFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// The copy currently in flight: the logical source path and the
/// destination it is being written to.
#[derive(Debug, Clone)]
pub struct CopyStep {
    pub source: PathBuf,
    pub dest: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExtractionProgress {
    pub files_processed: usize,
    pub total_files: usize,
    pub bytes_processed: u64,
    pub total_bytes: u64,
    pub current: Option<CopyStep>,
    pub start_time: Instant,
    pub warnings: Vec<String>,
}

impl ExtractionProgress {
    pub fn new(total_files: usize, total_bytes: u64) -> Self {
        Self {
            files_processed: 0,
            total_files,
            bytes_processed: 0,
            total_bytes,
            current: None,
            start_time: Instant::now(),
            warnings: Vec::new(),
        }
    }

    pub fn begin_file(&mut self, source: PathBuf, dest: PathBuf) {
        self.current = Some(CopyStep { source, dest });
    }

    pub fn finish_file(&mut self, bytes: u64) {
        self.files_processed += 1;
        self.bytes_processed += bytes;
    }

    pub fn clear_current(&mut self) {
        self.current = None;
    }

    pub fn add_warning<S: Into<String>>(&mut self, warning: S) {
        self.warnings.push(warning.into());
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        self.files_processed as f64 * 100.0 / self.total_files as f64
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Linear projection from the average time per finished file.
    pub fn estimated_remaining(&self) -> Duration {
        if self.files_processed == 0 {
            return Duration::ZERO;
        }

        let per_file = self.elapsed().as_secs_f64() / self.files_processed as f64;
        let remaining = (self.total_files - self.files_processed) as f64;
        Duration::from_secs_f64(per_file * remaining)
    }
}

pub struct FileOperations {
    preserve_mtime: bool,
}

impl FileOperations {
    pub fn new() -> Self {
        Self {
            preserve_mtime: true,
        }
    }

    pub fn with_preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }

    /// Copies every selected entry into `output_root`, in order, stopping
    /// at the first failure. The callback fires before each copy (with
    /// `current` set to the pending step) and once more after the last
    /// file, with `current` cleared.
    ///
    /// Existing destination files are truncated and rewritten; reruns are
    /// the supported way to refresh a stale extraction.
    pub fn extract_files(
        &self,
        bundle: &AppBundle,
        files: &[PreloadFile],
        output_root: &Path,
        progress_callback: Option<&dyn Fn(&ExtractionProgress)>,
    ) -> Result<ExtractionProgress> {
        let total_bytes = files.iter().map(|f| f.size).sum();
        let mut progress = ExtractionProgress::new(files.len(), total_bytes);

        for file in files {
            progress.begin_file(file.source_path.clone(), output_root.join(&file.name));
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            let bytes_written = self.copy_entry(bundle, file, output_root, &mut progress)?;
            progress.finish_file(bytes_written);
        }

        progress.clear_current();
        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        Ok(progress)
    }

    fn copy_entry(
        &self,
        bundle: &AppBundle,
        file: &PreloadFile,
        output_root: &Path,
        progress: &mut ExtractionProgress,
    ) -> Result<u64> {
        let entry = bundle.read(&file.name)?;

        if let Some(check) = &entry.integrity {
            if !check.is_valid() {
                progress.add_warning(format!(
                    "Integrity check failed for '{}': {}",
                    file.name, check
                ));
            }
        }

        // Entries are text: decode under the fixed encoding and write the
        // decoded form back out. Valid UTF-8 round-trips byte for byte.
        let text = String::from_utf8_lossy(&entry.bytes);
        let dest = output_root.join(&file.name);

        let mut dest_file = fs::File::create(&dest).map_err(|source| AsarPickError::Write {
            path: dest.display().to_string(),
            source,
        })?;
        dest_file
            .write_all(text.as_bytes())
            .map_err(|source| AsarPickError::Write {
                path: dest.display().to_string(),
                source,
            })?;
        drop(dest_file);

        if self.preserve_mtime {
            if let Some(modified) = file.modified {
                let _ = filetime::set_file_mtime(&dest, filetime::FileTime::from_system_time(modified));
            }
        }

        Ok(text.len() as u64)
    }
}

impl Default for FileOperations {
    fn default() -> Self {
        Self::new()
    }
}
