//! Anonymizer, salt, and nonce freshness errors.
//!
//! Privacy fails closed: every variant maps to an invariant violation whose
//! id is the variant's error code.

use super::error_code::{self, GatekeeperErrorCode};
use super::InvariantViolation;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrivacyError {
    #[error("organization id is empty")]
    EmptyOrgId,

    #[error("organization id is {len} characters, limit is {max}")]
    OrgIdTooLong { len: usize, max: usize },

    #[error("salt parameter {parameter} not found")]
    SaltNotFound { parameter: String },

    #[error("salt parameter {parameter} is empty")]
    SaltEmpty { parameter: String },

    #[error("salt from {parameter} is malformed: expected 64 hex characters, got {len} characters")]
    SaltMalformed { parameter: String, len: usize },

    #[error("failed to fetch salt parameter {parameter}: {message}")]
    SaltFetchFailed { parameter: String, message: String },

    #[error("HMAC key rejected: {message}")]
    HmacKeyRejected { message: String },

    #[error("nonce is {age_seconds}s old, limit is {max_age_seconds}s")]
    NonceExpired { age_seconds: i64, max_age_seconds: u64 },

    #[error("nonce issued {ahead_seconds}s in the future")]
    NonceFromFuture { ahead_seconds: i64 },

    #[error("nonce does not match an active binding for the organization")]
    NonceUnbound,

    #[error("nonce used {usages} times")]
    NonceReplayed { usages: usize },
}

impl PrivacyError {
    pub fn into_invariant(self) -> InvariantViolation {
        let id = self.error_code();
        let base = InvariantViolation::new(id, self.to_string());
        match self {
            Self::OrgIdTooLong { len, max } => base
                .with_evidence("len", len)
                .with_evidence("max", max),
            Self::SaltNotFound { parameter } | Self::SaltEmpty { parameter } => {
                base.with_evidence("parameter", parameter)
            }
            Self::SaltMalformed { parameter, len } => base
                .with_evidence("parameter", parameter)
                .with_evidence("len", len),
            Self::SaltFetchFailed { parameter, message } => base
                .with_evidence("parameter", parameter)
                .with_evidence("cause", message),
            Self::NonceExpired {
                age_seconds,
                max_age_seconds,
            } => base
                .with_evidence("age_seconds", age_seconds)
                .with_evidence("max_age_seconds", max_age_seconds),
            Self::NonceFromFuture { ahead_seconds } => {
                base.with_evidence("ahead_seconds", ahead_seconds)
            }
            Self::NonceReplayed { usages } => base.with_evidence("usages", usages),
            Self::EmptyOrgId | Self::HmacKeyRejected { .. } | Self::NonceUnbound => base,
        }
    }
}

impl GatekeeperErrorCode for PrivacyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyOrgId => error_code::ORG_ID_EMPTY,
            Self::OrgIdTooLong { .. } => error_code::ORG_ID_TOO_LONG,
            Self::SaltNotFound { .. } => error_code::SALT_NOT_FOUND,
            Self::SaltEmpty { .. } => error_code::SALT_EMPTY,
            Self::SaltMalformed { .. } => error_code::SALT_MALFORMED,
            Self::SaltFetchFailed { .. } => error_code::SALT_FETCH_FAILED,
            Self::HmacKeyRejected { .. } => error_code::HMAC_KEY_REJECTED,
            Self::NonceExpired { .. } => error_code::NONCE_EXPIRED,
            Self::NonceFromFuture { .. } => error_code::NONCE_FROM_FUTURE,
            Self::NonceUnbound => error_code::NONCE_UNBOUND,
            Self::NonceReplayed { .. } => error_code::NONCE_REPLAYED,
        }
    }
}
