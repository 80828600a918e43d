use crate::bundle::BundleInfo;
use crate::error::{AsarPickError, Result};
use crate::extractor::ExtractionProgress;
use crate::scanner::PreloadFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub bundle_info: BundleInfo,
    pub extraction_summary: ExtractionSummary,
    pub files: Vec<FileInfo>,
    pub extraction_time: DateTime<Utc>,
    pub warnings: Vec<String>,
    pub config_used: ConfigSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub total_files_processed: usize,
    pub total_bytes_processed: u64,
    pub extraction_duration: Duration,
    pub largest_file: Option<FileInfo>,
    pub average_file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub filename: String,
    pub source_path: String,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub pattern: String,
    pub resources_dir: String,
    pub output_directory: String,
}

impl From<&PreloadFile> for FileInfo {
    fn from(file: &PreloadFile) -> Self {
        Self {
            filename: file.name.clone(),
            source_path: file.source_path.display().to_string(),
            size: file.size,
            modified: file.modified,
        }
    }
}

/// Owns the output directory. Unlike the entries written into it, the
/// directory itself is never cleared: it is created once when absent and
/// reused silently on reruns.
pub struct OutputManager {
    output_directory: PathBuf,
}

impl OutputManager {
    pub fn new(output_directory: PathBuf) -> Self {
        Self { output_directory }
    }

    pub fn needs_creation(&self) -> bool {
        !self.output_directory.exists()
    }

    /// Creates the output directory a single level deep. An existing
    /// directory is a no-op; a missing parent or a file squatting on the
    /// path is a creation failure.
    pub fn initialize(&self) -> Result<()> {
        if self.output_directory.is_dir() {
            return Ok(());
        }

        fs::create_dir(&self.output_directory).map_err(|source| {
            AsarPickError::DirectoryCreation {
                path: self.output_directory.display().to_string(),
                source,
            }
        })
    }

    pub fn get_output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn destination_for(&self, name: &str) -> PathBuf {
        self.output_directory.join(name)
    }

    /// Assembles the run report. The report is printed by the caller, not
    /// written into the output directory: after a run the directory holds
    /// exactly the extracted entries.
    pub fn create_extraction_report(
        &self,
        bundle_info: &BundleInfo,
        files: &[PreloadFile],
        progress: &ExtractionProgress,
        config: &ConfigSnapshot,
    ) -> ExtractionReport {
        let extraction_summary = self.create_extraction_summary(files, progress);
        let file_infos: Vec<FileInfo> = files.iter().map(FileInfo::from).collect();

        ExtractionReport {
            bundle_info: bundle_info.clone(),
            extraction_summary,
            files: file_infos,
            extraction_time: Utc::now(),
            warnings: progress.warnings.clone(),
            config_used: config.clone(),
        }
    }

    fn create_extraction_summary(
        &self,
        files: &[PreloadFile],
        progress: &ExtractionProgress,
    ) -> ExtractionSummary {
        let mut largest_file: Option<&PreloadFile> = None;

        for file in files {
            if largest_file.is_none_or(|f| file.size > f.size) {
                largest_file = Some(file);
            }
        }

        let total_bytes: u64 = files.iter().map(|f| f.size).sum();
        let average_file_size = if files.is_empty() {
            0
        } else {
            total_bytes / files.len() as u64
        };

        ExtractionSummary {
            total_files_processed: progress.files_processed,
            total_bytes_processed: progress.bytes_processed,
            extraction_duration: progress.elapsed(),
            largest_file: largest_file.map(FileInfo::from),
            average_file_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_file(name: &str, size: u64) -> PreloadFile {
        PreloadFile {
            name: name.to_string(),
            source_path: PathBuf::from("/resources/app/application").join(name),
            size,
            modified: None,
        }
    }

    fn create_test_bundle_info() -> BundleInfo {
        BundleInfo {
            location: "/resources/app/application.asar".to_string(),
            packed: true,
        }
    }

    fn snapshot_fixture() -> ConfigSnapshot {
        ConfigSnapshot {
            pattern: "preload".to_string(),
            resources_dir: "/resources".to_string(),
            output_directory: "/work/preloads".to_string(),
        }
    }

    #[test]
    fn test_initialize_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let manager = OutputManager::new(temp.path().join("preloads"));

        assert!(manager.needs_creation());
        manager.initialize().unwrap();
        assert!(!manager.needs_creation());
        assert!(manager.get_output_directory().is_dir());
    }

    #[test]
    fn test_initialize_existing_directory_is_untouched() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("preloads");
        fs::create_dir(&output).unwrap();
        fs::write(output.join("kept.js"), "keep me").unwrap();

        let manager = OutputManager::new(output.clone());
        manager.initialize().unwrap();

        assert_eq!(fs::read_to_string(output.join("kept.js")).unwrap(), "keep me");
    }

    #[test]
    fn test_initialize_is_single_level() {
        let temp = TempDir::new().unwrap();
        let manager = OutputManager::new(temp.path().join("missing-parent/preloads"));

        let error = manager.initialize().unwrap_err();
        assert!(matches!(error, AsarPickError::DirectoryCreation { .. }));
    }

    #[test]
    fn test_initialize_rejects_file_on_path() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("preloads");
        fs::write(&output, "not a directory").unwrap();

        let manager = OutputManager::new(output);
        let error = manager.initialize().unwrap_err();
        assert!(matches!(error, AsarPickError::DirectoryCreation { .. }));
    }

    #[test]
    fn test_destination_for_joins_name() {
        let manager = OutputManager::new(PathBuf::from("/work/preloads"));
        assert_eq!(
            manager.destination_for("preload.js"),
            PathBuf::from("/work/preloads/preload.js")
        );
    }

    #[test]
    fn test_report_collects_files_and_summary() {
        let temp = TempDir::new().unwrap();
        let manager = OutputManager::new(temp.path().join("preloads"));

        let files = vec![
            create_test_file("preload.js", 100),
            create_test_file("preload-renderer.js", 300),
        ];

        let mut progress = ExtractionProgress::new(2, 400);
        progress.finish_file(100);
        progress.finish_file(300);
        progress.add_warning("integrity note");

        let report = manager.create_extraction_report(
            &create_test_bundle_info(),
            &files,
            &progress,
            &snapshot_fixture(),
        );

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.extraction_summary.total_files_processed, 2);
        assert_eq!(report.extraction_summary.total_bytes_processed, 400);
        assert_eq!(report.extraction_summary.average_file_size, 200);
        assert_eq!(
            report.extraction_summary.largest_file.as_ref().unwrap().filename,
            "preload-renderer.js"
        );
        assert_eq!(report.warnings, vec!["integrity note".to_string()]);
        assert!(report.bundle_info.packed);
    }

    #[test]
    fn test_empty_report() {
        let temp = TempDir::new().unwrap();
        let manager = OutputManager::new(temp.path().join("preloads"));

        let progress = ExtractionProgress::new(0, 0);
        let report = manager.create_extraction_report(
            &create_test_bundle_info(),
            &[],
            &progress,
            &snapshot_fixture(),
        );

        assert!(report.files.is_empty());
        assert_eq!(report.extraction_summary.average_file_size, 0);
        assert!(report.extraction_summary.largest_file.is_none());
    }
}
