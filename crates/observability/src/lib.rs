//! Tracing/logging setup shared by the binaries.

/// Tracing configuration (filters, output layout).
pub mod tracing;

pub use crate::tracing::{LogConfig, LogFormat};

/// Initialize process-wide tracing.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &LogConfig) {
    tracing::init(config);
}
