//! Ambient logging init (ambient stack), grounded on the teacher's `main.rs`
//! startup sequence, replacing its bare `println!` diagnostics with
//! structured `tracing` spans so erosion/synthesis passes can be traced by
//! level and module.

use tracing_subscriber::EnvFilter;

/// Installs a global `tracing` subscriber reading `HIGHMAP_LOG` (falling
/// back to `info`). Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_env("HIGHMAP_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
