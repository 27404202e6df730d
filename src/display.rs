//! Status indicator collaborator.
//!
//! The scheduler derives three text values ("Next Sunset", "Next Sunrise",
//! "Last Action Time") and a binary indicator after every toggle; a
//! [`StatusDisplay`] renders them. The shipped implementation writes to the
//! structured log, standing in for the panel widget of the original
//! hardware. Tests capture updates behind the `testing-support` feature.

use chrono::NaiveDateTime;

/// Binary indicator colour: lit while the output is asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// Output asserted, dark outside.
    Night,
    /// Output released, daylight.
    Day,
}

/// Snapshot of the display fields after a state change.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleStatus {
    /// Next sunset instant, or `None` when only the 24-hour re-evaluation
    /// tick is armed (polar case).
    pub next_sunset: Option<NaiveDateTime>,
    /// Next sunrise instant, or `None` for the polar re-evaluation tick.
    pub next_sunrise: Option<NaiveDateTime>,
    /// Wall-clock time of the most recent toggle.
    pub last_action: NaiveDateTime,
    /// Indicator colour matching the output level.
    pub indicator: Indicator,
}

/// Trait for collaborators that render schedule status.
pub trait StatusDisplay {
    /// Render the given status. Rendering failures are the collaborator's
    /// problem; the scheduler never depends on the display succeeding.
    fn update(&mut self, status: &ScheduleStatus);
}

/// Display implementation that renders status into the structured log.
pub struct LogDisplay;

impl LogDisplay {
    fn format_deadline(instant: Option<NaiveDateTime>) -> String {
        match instant {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "none (24h re-check)".to_string(),
        }
    }
}

impl StatusDisplay for LogDisplay {
    fn update(&mut self, status: &ScheduleStatus) {
        log_indented!("Next Sunset: {}", Self::format_deadline(status.next_sunset));
        log_indented!("Next Sunrise: {}", Self::format_deadline(status.next_sunrise));
        log_indented!(
            "Last Action Time: {}",
            status.last_action.format("%Y-%m-%d %H:%M:%S")
        );
        log_indented!(
            "Indicator: {}",
            match status.indicator {
                Indicator::Night => "night (output asserted)",
                Indicator::Day => "day (output released)",
            }
        );
    }
}

/// Display that records every update for assertions.
#[cfg(any(test, feature = "testing-support"))]
pub struct CaptureDisplay {
    updates: std::sync::Arc<std::sync::Mutex<Vec<ScheduleStatus>>>,
}

#[cfg(any(test, feature = "testing-support"))]
impl CaptureDisplay {
    /// Create a capturing display and a handle to its update log.
    pub fn new() -> (
        Self,
        std::sync::Arc<std::sync::Mutex<Vec<ScheduleStatus>>>,
    ) {
        let updates = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        (
            Self {
                updates: std::sync::Arc::clone(&updates),
            },
            updates,
        )
    }
}

#[cfg(any(test, feature = "testing-support"))]
impl StatusDisplay for CaptureDisplay {
    fn update(&mut self, status: &ScheduleStatus) {
        self.updates.lock().unwrap().push(status.clone());
    }
}
