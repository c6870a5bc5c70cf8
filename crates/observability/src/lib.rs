//! Process-wide log setup shared by every StockTrack entry point.

/// Subscriber installation (filter, format).
pub mod tracing;

pub use crate::tracing::{LogFormat, LogSettings};

/// Install the default subscriber: JSON lines filtered by `RUST_LOG`
/// (falling back to `info`).
///
/// Calling this more than once is harmless; only the first call installs.
pub fn init() -> bool {
    tracing::init(&LogSettings::default())
}
