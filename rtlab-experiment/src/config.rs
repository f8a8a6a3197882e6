use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("grace_range_ms must satisfy 0 < min <= max, got [{min}, {max}]")]
    InvalidGraceRange { min: u64, max: u64 },
}

/// Session parameters. The trial plan itself is fixed and not configurable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Inclusive bounds of the randomized pre-stimulus delay
    pub grace_range_ms: (u64, u64),
    /// Directory that session exports are written to
    pub export_dir: PathBuf,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            grace_range_ms: (7_000, 12_000),
            export_dir: PathBuf::from("."),
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (min, max) = self.grace_range_ms;
        if min == 0 || min > max {
            return Err(ConfigError::InvalidGraceRange { min, max });
        }
        Ok(())
    }

    /// Sampling range for the pre-stimulus delay. Reversed bounds are
    /// swapped so an unvalidated config can't yield an empty range.
    pub fn grace_range(&self) -> RangeInclusive<u64> {
        let (a, b) = self.grace_range_ms;
        a.min(b)..=a.max(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_standard_protocol() {
        let config = ExperimentConfig::default();
        assert_eq!(config.grace_range(), 7_000..=12_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn grace_range_orders_bounds() {
        let config = ExperimentConfig {
            grace_range_ms: (9_000, 4_000),
            ..ExperimentConfig::default()
        };
        assert!(config.validate().is_err());
        assert_eq!(config.grace_range(), 4_000..=9_000);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = ExperimentConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExperimentConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = ExperimentConfig::from_toml_str(
            r#"
grace_range_ms = [2000, 3000]
"#,
        )
        .unwrap();
        assert_eq!(config.grace_range_ms, (2_000, 3_000));
        assert_eq!(config.export_dir, PathBuf::from("."));
    }

    #[test]
    fn rejects_reversed_range() {
        let err = ExperimentConfig::from_toml_str("grace_range_ms = [5000, 4000]").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidGraceRange {
                min: 5000,
                max: 4000
            }
        ));
        assert!(err.to_string().contains("0 < min <= max"));
    }

    #[test]
    fn rejects_zero_lower_bound() {
        let err = ExperimentConfig::from_toml_str("grace_range_ms = [0, 4000]").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidGraceRange { .. }));
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = ExperimentConfig::from_toml_str("grace_range_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "export_dir = \"/tmp/rtlab\"").unwrap();
        let config = ExperimentConfig::load(file.path()).unwrap();
        assert_eq!(config.export_dir, PathBuf::from("/tmp/rtlab"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ExperimentConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
