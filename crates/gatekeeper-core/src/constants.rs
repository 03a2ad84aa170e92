//! Shared constants for the Gatekeeper decision core.

/// Gatekeeper version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of blocks per repository per hour before the circuit breaker trips.
pub const DEFAULT_MAX_BLOCKS_PER_HOUR: u64 = 10;

/// Default TTL for hourly block counters (3 hours: one bucket plus grace).
pub const DEFAULT_BUCKET_TTL_SECONDS: u64 = 10_800;

/// Smallest accepted block counter TTL. A counter must outlive its own bucket.
pub const MIN_BUCKET_TTL_SECONDS: u64 = 3_600;

/// Prefix of every block counter key: `blocks:{owner}/{repo}:{YYYY-MM-DDTHH}`.
pub const BLOCK_COUNTER_PREFIX: &str = "blocks";

/// chrono format of the hour bucket component of a counter key.
pub const HOUR_BUCKET_FORMAT: &str = "%Y-%m-%dT%H";

/// chrono format of a salt rotation month.
pub const ROTATION_MONTH_FORMAT: &str = "%Y-%m";

/// Maximum accepted organization identifier length (characters).
pub const MAX_ORG_ID_LEN: usize = 255;

/// Length of an anonymization salt in hex characters.
pub const SALT_HEX_LEN: usize = 64;

/// Default nonce freshness window (1 hour).
pub const DEFAULT_NONCE_MAX_AGE_SECONDS: u64 = 3_600;

/// Default execution mode recorded in decision metadata.
pub const DEFAULT_MODE: &str = "standard";

/// Exit code for a successful evaluation.
pub const EXIT_OK: i32 = 0;

/// Exit code for a hard failure (invariant violation or non-proceedable degradation).
pub const EXIT_HARD_FAILURE: i32 = 1;

/// Exit code for "degraded but did not block".
pub const EXIT_DEGRADED: i32 = 2;

/// File names used by the file-backed trust store.
pub const IDENTITIES_FILE: &str = "identities.json";
pub const REPUTATIONS_FILE: &str = "reputations.json";
pub const PLEDGES_FILE: &str = "pledges.json";
pub const NONCE_BINDINGS_FILE: &str = "nonce_bindings.json";
