//! Tracing setup is idempotent and safe to call from any entry point.

use gatekeeper_core::tracing::{init_json_tracing, init_tracing, init_with, LogFormat, LOG_ENV};

#[test]
fn init_is_idempotent_across_formats() {
    std::env::set_var(LOG_ENV, "gatekeeper_core=debug");
    init_tracing();
    init_tracing();
    init_json_tracing();
    init_with(LogFormat::Json);
    tracing::info!("tracing initialized");
    assert_eq!(LogFormat::default(), LogFormat::Pretty);
}
