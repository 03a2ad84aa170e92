//! Errors raised while resolving `GatekeeperConfig`.

use super::error_code::{self, GatekeeperErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A config layer exists but could not be read.
    #[error("cannot read config layer {path}: {message}")]
    Unreadable { path: String, message: String },

    #[error("malformed TOML in {path}: {message}")]
    ParseError { path: String, message: String },

    /// A resolved value breaks a constraint; `field` is the dotted TOML key.
    #[error("invalid `{field}`: {message}")]
    ValidationFailed { field: String, message: String },
}

impl GatekeeperErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        error_code::CONFIG_ERROR
    }
}
