use std::path::PathBuf;

use thiserror::Error;

/// Programmer errors caught while wiring a character or scene together.
///
/// These fail fast during setup, never at first use.
#[derive(Debug, Error, PartialEq)]
pub enum SetupError {
    #[error("input aggregator needs at least one control scheme")]
    NoControlSchemes,
    #[error("jump ability `{0}` requires a character motor")]
    AbilityWithoutMotor(&'static str),
    #[error("character is missing its motor")]
    MissingMotor,
    #[error("invalid setting `{field}`: {reason}")]
    InvalidSetting {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Setup(#[from] SetupError),
}
