//! Time source abstraction for supporting both real and pinned time.
//!
//! The scheduler never reads a hardware clock directly; it asks this module
//! for the current local date-time and UTC offset. The trait-based global
//! lets tests pin the clock to a fixed instant instead of waiting for real
//! solar events to pass.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Global time source instance, defaults to [`RealTimeSource`].
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting clock reads.
pub trait TimeSource: Send + Sync {
    /// Current local date-time.
    fn now(&self) -> DateTime<Local>;

    /// Local UTC offset in effect right now. Whatever DST handling the host
    /// clock applies is reflected here; sunswitch adds nothing on top.
    fn utc_offset(&self) -> FixedOffset {
        self.now().offset().fix()
    }
}

/// Real-time implementation that uses the actual system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Fixed-time source for tests: `now()` always returns the pinned instant.
#[cfg(any(test, feature = "testing-support"))]
pub struct FixedTimeSource(pub DateTime<Local>);

#[cfg(any(test, feature = "testing-support"))]
impl TimeSource for FixedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

#[cfg(any(test, feature = "testing-support"))]
impl FixedTimeSource {
    /// Pin the clock to a naive local timestamp.
    pub fn at(naive: chrono::NaiveDateTime) -> Self {
        let pinned = Local
            .from_local_datetime(&naive)
            .single()
            .unwrap_or_else(|| Local.from_utc_datetime(&naive));
        Self(pinned)
    }
}

/// Initialize the global time source (call once at startup or test setup).
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Get the current local time from the global time source.
pub fn now() -> DateTime<Local> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).now()
}

/// Get the local UTC offset from the global time source.
pub fn utc_offset() -> FixedOffset {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .utc_offset()
}
