//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Route crate logs to the test output. Set `RUST_LOG=gridio=trace` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Fresh temporary directory plus a path inside it.
pub fn scratch(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    (dir, path)
}
