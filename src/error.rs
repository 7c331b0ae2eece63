//! Setup-time errors
//!
//! Only configuration can fail. Everything that happens inside a tick
//! degrades locally instead of returning an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid setting `{field}` = {value}: {reason}")]
    Invalid {
        field: &'static str,
        value: f32,
        reason: &'static str,
    },

    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Settings IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, value: f32, reason: &'static str) -> Self {
        ConfigError::Invalid {
            field,
            value,
            reason,
        }
    }
}
