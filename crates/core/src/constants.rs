//! Shared constants for source scheduling

use std::time::Duration;

/// No source may be refreshed more often than this, whatever its kind.
pub const MIN_REFRESH_RATE: Duration = Duration::from_secs(2);

/// Delay between two scheduler ticks.
///
/// This is the practical refresh granularity: a source is gathered on the
/// first tick at or after its due time.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
