//! Hardware output abstraction for the switched line.
//!
//! The scheduler only ever talks to the [`SwitchBackend`] trait: acquire the
//! line once at startup, then write a logical level on every transition.
//! The shipped implementation drives a Linux sysfs GPIO; tests substitute a
//! recording mock behind the `testing-support` feature.
//!
//! Acquisition failure is a deployment problem (wrong pin, missing
//! permissions, no GPIO controller on the host) and is deliberately
//! non-fatal: the caller degrades to an inert scheduler instead of
//! crash-looping under the init system.

use anyhow::Result;

use crate::config::Config;

pub mod sysfs;

#[cfg(any(test, feature = "testing-support"))]
pub mod mock;

/// Logical drive level of the output line.
///
/// `Asserted` means "the relay is on" regardless of wiring polarity; the
/// backend maps it to the physical high/low level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Output on: dark outside, relay energized.
    Asserted,
    /// Output off: daylight, relay released.
    Deasserted,
}

/// Trait for backends that drive the binary output line.
pub trait SwitchBackend {
    /// Drive the output to the given logical level.
    fn write(&mut self, level: Level) -> Result<()>;

    /// Human-readable name for logging.
    fn backend_name(&self) -> &'static str;

    /// Backend-specific cleanup at shutdown. Default does nothing.
    fn cleanup(self: Box<Self>, debug_enabled: bool) {
        let _ = debug_enabled;
    }
}

/// Acquire the configured output line.
///
/// Returns `Err` when the line cannot be acquired; the caller treats that
/// as degraded mode rather than a fatal error.
pub fn create_backend(config: &Config, debug_enabled: bool) -> Result<Box<dyn SwitchBackend>> {
    let backend = sysfs::SysfsGpioBackend::new(config.gpio_pin(), config.active_low())?;
    if debug_enabled {
        log_pipe!();
        log_debug!(
            "Acquired GPIO {} ({})",
            config.gpio_pin(),
            if config.active_low() { "active-low" } else { "active-high" }
        );
    }
    Ok(Box::new(backend))
}
