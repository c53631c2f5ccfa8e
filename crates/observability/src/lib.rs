//! Tracing/logging setup shared by the `itam` binaries.

/// Initialize process-wide logging, format taken from `ITAM_LOG_FORMAT`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(default_directive: &str) {
    tracing::init(default_directive, LogFormat::from_env());
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use tracing::{FORMAT_ENV, LogFormat};
