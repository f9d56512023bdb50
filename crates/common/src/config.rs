//! Analyzer configuration loaded from TOML.
//!
//! The struct is small and typed; every field has a default so an empty
//! file is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Upper bound on candidate principal sets kept after merging the
    /// alternatives of two chaincodes. `0` (the default) disables it.
    pub max_merged_principal_sets: usize,
}

impl AnalyzerConfig {
    /// The effective bound, `None` when unbounded.
    #[must_use]
    pub fn merge_limit(&self) -> Option<usize> {
        (self.max_merged_principal_sets > 0).then_some(self.max_merged_principal_sets)
    }
}

/// Load config from a TOML file path.
/// If the file is missing or parsing fails, an error is returned.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<AnalyzerConfig, ConfigError> {
    let s = fs::read_to_string(path.as_ref())?;
    let cfg: AnalyzerConfig = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_unbounded() {
        let def = AnalyzerConfig::default();
        assert_eq!(def.max_merged_principal_sets, 0);
        assert_eq!(def.merge_limit(), None);
        let bounded = AnalyzerConfig {
            max_merged_principal_sets: 12,
        };
        assert_eq!(bounded.merge_limit(), Some(12));
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        let tmp = tempfile::NamedTempFile::new().expect("temp file");
        let mut f = tmp.reopen().expect("reopen");
        write!(f, "max_merged_principal_sets = 12").expect("write");
        let cfg = load_from_file(tmp.path()).expect("load");
        assert_eq!(cfg.max_merged_principal_sets, 12);
    }

    #[test]
    fn test_load_empty_file_uses_defaults() {
        let tmp = tempfile::NamedTempFile::new().expect("temp file");
        let cfg = load_from_file(tmp.path()).expect("load");
        assert_eq!(cfg, AnalyzerConfig::default());
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        use std::io::Write;
        let tmp = tempfile::NamedTempFile::new().expect("temp file");
        let mut f = tmp.reopen().expect("reopen");
        write!(f, "max_merged_principal_sets = \"many\"").expect("write");
        assert!(matches!(load_from_file(tmp.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            load_from_file("/nonexistent/analyzer.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
