//! Logging setup: `tracing` events filtered per crate through `GATEKEEPER_LOG`.

pub mod setup;

pub use setup::{init_json_tracing, init_tracing, init_with, LogFormat, LOG_ENV};
