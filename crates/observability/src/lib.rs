//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing.
///
/// Safe to call multiple times; later calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Span helpers for request correlation.
pub mod request;

/// Subscriber configuration (filters, formatting).
pub mod tracing;
