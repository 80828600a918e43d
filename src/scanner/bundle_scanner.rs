use std::path::PathBuf;
use std::time::SystemTime;

use crate::bundle::AppBundle;
use crate::config::FilterConfig;
use crate::error::Result;
use crate::scanner::name_filter::NameFilter;

/// A bundle entry selected for extraction.
#[derive(Debug, Clone)]
pub struct PreloadFile {
    pub name: String,
    pub source_path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl PreloadFile {
    pub fn format_size(&self) -> String {
        format_bytes(self.size)
    }
}

pub struct BundleScanner {
    filter: NameFilter,
}

impl BundleScanner {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            filter: NameFilter::new(config),
        }
    }

    pub fn with_filter(filter: NameFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &NameFilter {
        &self.filter
    }

    /// Lists the bundle root and keeps the entries whose names match the
    /// filter. An empty result is a normal outcome, not an error.
    pub fn scan(&self, bundle: &AppBundle) -> Result<Vec<PreloadFile>> {
        let mut matches = Vec::new();

        for entry in bundle.entries()? {
            if !self.filter.matches(&entry.name) {
                continue;
            }

            matches.push(PreloadFile {
                source_path: bundle.entry_source_path(&entry.name),
                name: entry.name,
                size: entry.size,
                modified: entry.modified,
            });
        }

        // Sort by name for consistent output
        matches.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(matches)
    }

    pub fn get_statistics(&self, files: &[PreloadFile]) -> ScanStatistics {
        let total_files = files.len();
        let total_size = files.iter().map(|f| f.size).sum();

        let (largest_file_size, largest_file_name) = files
            .iter()
            .max_by_key(|f| f.size)
            .map(|f| (f.size, f.name.clone()))
            .unwrap_or((0, String::new()));

        ScanStatistics {
            total_files,
            total_size,
            largest_file_size,
            largest_file_name,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub total_files: usize,
    pub total_size: u64,
    pub largest_file_size: u64,
    pub largest_file_name: String,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        let mut summary = format!(
            "Scan Results:\n  Matched files: {}\n  Total size: {}\n",
            self.total_files,
            format_bytes(self.total_size)
        );

        if self.largest_file_size > 0 {
            summary.push_str(&format!(
                "  Largest file: {} ({})\n",
                self.largest_file_name,
                format_bytes(self.largest_file_size)
            ));
        }

        summary
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asar::testutil::AsarBuilder;
    use std::fs;
    use tempfile::TempDir;

    fn directory_bundle(names: &[&str]) -> (TempDir, AppBundle) {
        let temp = TempDir::new().unwrap();
        let resources = temp.path().join("resources");
        let app = resources.join("app/application");
        fs::create_dir_all(&app).unwrap();
        for name in names {
            fs::write(app.join(name), format!("// {}", name)).unwrap();
        }
        let bundle = AppBundle::locate(&resources, "app", "application").unwrap();
        (temp, bundle)
    }

    #[test]
    fn test_scan_selects_only_matching_names() {
        let (_temp, bundle) = directory_bundle(&["preload.js", "preload-renderer.js", "index.js"]);
        let scanner = BundleScanner::new(&FilterConfig::default());

        let files = scanner.scan(&bundle).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["preload-renderer.js", "preload.js"]);
    }

    #[test]
    fn test_scan_is_case_sensitive() {
        let (_temp, bundle) = directory_bundle(&["Preload.js", "preload.js"]);
        let scanner = BundleScanner::new(&FilterConfig::default());

        let files = scanner.scan(&bundle).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "preload.js");
    }

    #[test]
    fn test_scan_with_no_matches_is_empty_not_error() {
        let (_temp, bundle) = directory_bundle(&["index.js", "renderer.js"]);
        let scanner = BundleScanner::new(&FilterConfig::default());

        let files = scanner.scan(&bundle).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_records_source_paths() {
        let (_temp, bundle) = directory_bundle(&["preload.js"]);
        let scanner = BundleScanner::new(&FilterConfig::default());

        let files = scanner.scan(&bundle).unwrap();
        assert_eq!(files[0].source_path, bundle.entry_source_path("preload.js"));
        assert!(files[0].size > 0);
    }

    #[test]
    fn test_scan_packed_archive() {
        let temp = TempDir::new().unwrap();
        let resources = temp.path().join("resources");
        fs::create_dir_all(resources.join("app")).unwrap();
        let archive = AsarBuilder::new()
            .file("preload.js", b"exports.a = 1;")
            .file("main.preload.bundle.js", b"exports.b = 2;")
            .file("renderer.js", b"exports.c = 3;")
            .build();
        fs::write(resources.join("app/application.asar"), archive).unwrap();
        let bundle = AppBundle::locate(&resources, "app", "application").unwrap();

        let scanner = BundleScanner::new(&FilterConfig::default());
        let files = scanner.scan(&bundle).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main.preload.bundle.js", "preload.js"]);
    }

    #[test]
    fn test_custom_filter_pattern() {
        let (_temp, bundle) = directory_bundle(&["preload.js", "worker.js"]);
        let scanner = BundleScanner::with_filter(NameFilter::from_pattern("worker"));

        let files = scanner.scan(&bundle).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "worker.js");
    }

    #[test]
    fn test_scan_statistics() {
        let (_temp, bundle) = directory_bundle(&["preload.js", "preload-renderer.js"]);
        let scanner = BundleScanner::new(&FilterConfig::default());
        let files = scanner.scan(&bundle).unwrap();

        let stats = scanner.get_statistics(&files);
        assert_eq!(stats.total_files, 2);
        assert!(stats.total_size > 0);
        assert!(stats.display_summary().contains("Matched files: 2"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }
}
