use crate::error::{AsarPickError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub filters: FilterConfig,
    pub output: OutputConfig,
}

/// Files probed, in order, when no --config path is given.
const DEFAULT_CONFIG_PATHS: &[&str] = &["asarpick.toml", "asarpick.config.toml", ".asarpick.toml"];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// The Electron resources directory the bundle lives under.
    pub resources_dir: PathBuf,
    /// Directory under resources that holds the bundle.
    pub app_dir: String,
    /// Bundle name without the archive extension.
    pub bundle_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Literal, case-sensitive substring an entry name must contain.
    pub pattern: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            resources_dir: PathBuf::from("."),
            app_dir: "app".to_string(),
            bundle_name: "application".to_string(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            pattern: "preload".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("preloads"),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(AsarPickError::Config {
                message: format!("Config file does not exist: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| AsarPickError::Config {
            message: format!("Could not read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| AsarPickError::Config {
            message: format!("Invalid TOML in {}: {}", path.display(), e),
        })
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        match DEFAULT_CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(found) => Self::load_from_file(found),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(dir) = &cli_args.resources_dir {
            self.source.resources_dir = dir.clone();
        }

        if let Some(dir) = &cli_args.output_dir {
            self.output.directory = dir.clone();
        }

        // Matching is literal and case-sensitive; the override is taken
        // exactly as typed.
        if let Some(pattern) = &cli_args.pattern {
            self.filters.pattern = pattern.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;

        std::fs::write(path, content).map_err(|e| AsarPickError::Config {
            message: format!("Could not write config file {}: {}", path.display(), e),
        })
    }

    /// Checks values only. Whether paths exist is decided at run time so
    /// failures classify as source or directory-creation errors, not as
    /// configuration errors.
    pub fn validate(&self) -> Result<()> {
        if self.filters.pattern.is_empty() {
            return Err(AsarPickError::Config {
                message: "Filter pattern must not be empty".to_string(),
            });
        }

        if self.source.app_dir.is_empty() {
            return Err(AsarPickError::Config {
                message: "Application directory name must not be empty".to_string(),
            });
        }

        if self.source.bundle_name.is_empty() {
            return Err(AsarPickError::Config {
                message: "Bundle name must not be empty".to_string(),
            });
        }

        if self.source.bundle_name.contains(['/', '\\']) {
            return Err(AsarPickError::Config {
                message: "Bundle name must be a single path component".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub resources_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub pattern: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resources_dir(mut self, resources_dir: Option<PathBuf>) -> Self {
        self.resources_dir = resources_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_conventional_layout() {
        let config = Config::default();
        assert_eq!(config.source.resources_dir, PathBuf::from("."));
        assert_eq!(config.source.app_dir, "app");
        assert_eq!(config.source.bundle_name, "application");
        assert_eq!(config.filters.pattern, "preload");
        assert!(config.output.directory.ends_with("preloads"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.filters.pattern.clear();
        assert!(config.validate().is_err());

        config.filters.pattern = "preload".to_string();
        config.source.bundle_name = "nested/app".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let config = Config::default();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.filters.pattern, loaded.filters.pattern);
        assert_eq!(config.source.bundle_name, loaded.source.bundle_name);
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[filters]\npattern = \"inject\"").unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.filters.pattern, "inject");
        assert_eq!(config.source.bundle_name, "application");
    }

    #[test]
    fn test_invalid_toml_names_the_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "pattern = = nope").unwrap();

        let error = Config::load_from_file(temp_file.path()).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Invalid TOML"));
        assert!(message.contains(&temp_file.path().display().to_string()));
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_resources_dir(Some(PathBuf::from("/opt/App/resources")))
            .with_pattern(Some("Preload".to_string()));

        config.merge_with_cli_args(&overrides);

        assert_eq!(
            config.source.resources_dir,
            PathBuf::from("/opt/App/resources")
        );
        // Case preserved, matching stays case-sensitive
        assert_eq!(config.filters.pattern, "Preload");
    }

    #[test]
    fn test_sample_config_lists_every_section() {
        let sample = Config::create_sample_config();
        assert!(!sample.is_empty());
        assert!(sample.contains("[source]"));
        assert!(sample.contains("[filters]"));
        assert!(sample.contains("[output]"));
    }
}
