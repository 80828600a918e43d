use crate::config::FilterConfig;

/// Filename filter: literal, case-sensitive substring containment. No
/// pattern syntax; `preload` is a fixed needle, not a glob or regex.
pub struct NameFilter {
    pattern: String,
}

impl NameFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            pattern: config.pattern.clone(),
        }
    }

    pub fn from_pattern<S: Into<String>>(pattern: S) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        name.contains(&self.pattern)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        let config = FilterConfig::default();
        Self::new(&config)
    }
}
