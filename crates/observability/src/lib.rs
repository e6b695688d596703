//! Tracing and logging setup shared by every binary and test harness.

/// Subscriber configuration (filters, formatting).
pub mod subscriber;

/// Initialize process-wide tracing/logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init();
}
