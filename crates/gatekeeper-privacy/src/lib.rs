//! # gatekeeper-privacy
//!
//! Turns organization identifiers into stable anonymized tokens
//! (HMAC-SHA256 keyed by a rotating salt) and decides whether a request may
//! contribute to cross-customer pooling.

pub mod anonymizer;
pub mod nonce;
pub mod pooling;
pub mod salt;

pub use anonymizer::{keyed_token, validate_org_id, Anonymizer};
pub use nonce::{is_fresh, FreshnessCheck};
pub use pooling::{NoncePolicy, PooledToken, PoolingGate, PoolingRequest};
pub use salt::{rotation_month_of, SaltConfig, SaltRecord, SaltSource, INSECURE_TEST_SALT};
