//! Default values and validation ranges used across sunswitch.

use std::time::Duration;

/// GPIO pin driven by the scheduler when none is configured.
/// Matches the channel the original deployment wired its relay to.
pub const DEFAULT_GPIO_PIN: u32 = 5;

/// Whether the output line is wired active-low by default.
/// Solid-state relay boards commonly switch on when the line is pulled low.
pub const DEFAULT_ACTIVE_LOW: bool = true;

/// Re-arm interval used when a solar event does not occur on the source day
/// (polar day/night). Keeps the scheduler re-evaluating daily instead of
/// hanging forever on an event that never fires.
pub const FALLBACK_REARM_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Minimum positive interval a deadline may be armed with. A computed
/// interval at or below zero (clock skew, process started mid-event) is
/// clamped to this so the scheduler fires almost immediately and
/// self-corrects on the next cycle instead of stalling.
pub const MINIMUM_TIMER_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound for a single signal-aware sleep. Long waits are chunked so
/// host clock adjustments are noticed within this window.
pub const SLEEP_CHUNK_INTERVAL: Duration = Duration::from_secs(300);

/// Months treated as "summer half" by the polar-case initial-state
/// heuristic: April through September inclusive. Outside this window the
/// northern hemisphere is assumed to be in continuous night, inside it the
/// southern hemisphere is.
pub const POLAR_SUMMER_MONTHS: std::ops::RangeInclusive<u32> = 4..=9;

/// Largest sysfs GPIO number accepted from configuration.
pub const MAXIMUM_GPIO_PIN: u32 = 1023;

/// Exit code used when startup validation fails.
pub const EXIT_FAILURE: i32 = 1;
