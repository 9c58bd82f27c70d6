//! Tracing and logging (shared setup).

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use self::tracing::{LogFormat, ParseLogFormatError};

/// Initialize process-wide logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    self::tracing::init(format);
}
