//! Runtime configuration for the store hub.
//!
//! # Responsibility
//! - Describe logging bootstrap inputs and store policy knobs.
//! - Load them from JSON with strict field checking.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - Unknown fields are rejected.

use crate::logging::default_log_level;
use crate::store::entity::RemoveNotifyPolicy;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Hub configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
    /// Notification behavior when removing an unknown identifier.
    pub remove_notify: RemoveNotifyPolicy,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            remove_notify: RemoveNotifyPolicy::default(),
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::logging::default_log_level;
    use crate::store::entity::RemoveNotifyPolicy;

    #[test]
    fn empty_object_yields_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.remove_notify, RemoveNotifyPolicy::Always);
    }

    #[test]
    fn parses_all_fields() {
        let config = CoreConfig::from_json_str(
            r#"{"log_level": "warn", "log_dir": "/tmp/console", "remove_notify": "only_when_removed"}"#,
        )
        .unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some(std::path::Path::new("/tmp/console")));
        assert_eq!(config.remove_notify, RemoveNotifyPolicy::OnlyWhenRemoved);
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = CoreConfig::from_json_str(r#"{"verbose": true}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CoreConfig::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }
}
