//! GatekeeperErrorCode trait for stable machine-readable codes.

/// Every error enum implements this to provide a structured error code string.
pub trait GatekeeperErrorCode {
    /// Returns the error code string (e.g., "INVARIANT_VIOLATION").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const INVARIANT_VIOLATION: &str = "INVARIANT_VIOLATION";
pub const DEGRADED: &str = "DEGRADED";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_UNAVAILABLE: &str = "STORAGE_UNAVAILABLE";
pub const STORAGE_IO: &str = "STORAGE_IO";
pub const STORAGE_SERIALIZATION: &str = "STORAGE_SERIALIZATION";
pub const STORAGE_SQLITE: &str = "STORAGE_SQLITE";
pub const UNIQUE_CONSTRAINT: &str = "UNIQUE_CONSTRAINT";
pub const ORG_ID_EMPTY: &str = "ORG_ID_EMPTY";
pub const ORG_ID_TOO_LONG: &str = "ORG_ID_TOO_LONG";
pub const SALT_NOT_FOUND: &str = "SALT_NOT_FOUND";
pub const SALT_EMPTY: &str = "SALT_EMPTY";
pub const SALT_MALFORMED: &str = "SALT_MALFORMED";
pub const SALT_FETCH_FAILED: &str = "SALT_FETCH_FAILED";
pub const HMAC_KEY_REJECTED: &str = "HMAC_KEY_REJECTED";
pub const NONCE_EXPIRED: &str = "NONCE_EXPIRED";
pub const NONCE_FROM_FUTURE: &str = "NONCE_FROM_FUTURE";
pub const NONCE_UNBOUND: &str = "NONCE_UNBOUND";
pub const NONCE_REPLAYED: &str = "NONCE_REPLAYED";
