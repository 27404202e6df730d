//! Core scheduler state machine.
//!
//! Owns the schedule state and the main loop. The machine has two states,
//! output asserted ("dark outside") and output released ("daylight"), and
//! two independent one-shot deadlines driving the transitions:
//!
//! - the sunset deadline asserts the output and re-arms itself with
//!   tomorrow's sunset;
//! - the sunrise deadline releases the output and re-arms itself with
//!   tomorrow's sunrise.
//!
//! Each deadline re-arms only itself, so a late sunset firing never
//! desynchronizes the already-pending sunrise deadline. Deadlines are
//! stored as absolute local instants and re-derived into sleep intervals
//! on every loop pass, so no drift accumulates across days. On a polar
//! date where an event does not occur, its deadline degrades to a 24-hour
//! re-evaluation tick instead of hanging forever.
//!
//! Everything runs on one cooperative thread; the only suspension point is
//! a signal-aware sleep until the earlier of the two deadlines.

use anyhow::Result;
use chrono::{Datelike, Duration as ChronoDuration, FixedOffset, NaiveDateTime};
use std::sync::atomic::Ordering;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use crate::{
    backend::{Level, SwitchBackend},
    config::Config,
    constants::*,
    display::{Indicator, ScheduleStatus, StatusDisplay},
    signals::SignalState,
    solar::{self, SolarEvent},
    time_source,
};

/// One armed one-shot deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// Absolute local instant the deadline fires at.
    pub at: NaiveDateTime,
    /// True for a real solar event; false for the polar-case 24-hour
    /// re-evaluation tick.
    pub is_solar: bool,
}

/// Mutable schedule state, owned exclusively by [`Core`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleState {
    /// Current logical drive level of the hardware line.
    pub output_asserted: bool,
    /// Armed sunset deadline (asserts the output when it fires).
    pub next_sunset: Deadline,
    /// Armed sunrise deadline (releases the output when it fires).
    pub next_sunrise: Deadline,
    /// Wall-clock time of the most recent toggle, for display only.
    pub last_action: NaiveDateTime,
}

/// Dependencies needed to create a [`Core`].
pub struct CoreParams {
    /// Acquired output line, or `None` when acquisition failed (degraded
    /// mode: no deadlines are armed, no writes happen).
    pub backend: Option<Box<dyn SwitchBackend>>,
    /// Status renderer.
    pub display: Box<dyn StatusDisplay>,
    /// Validated deployment settings.
    pub config: Config,
    /// Shutdown flag and wakeup channel.
    pub signal_state: SignalState,
    /// Verbose logging toggle.
    pub debug_enabled: bool,
}

/// Scheduler state machine managing the day/night cycle.
pub struct Core {
    backend: Option<Box<dyn SwitchBackend>>,
    display: Box<dyn StatusDisplay>,
    config: Config,
    signal_state: SignalState,
    debug_enabled: bool,
    state: Option<ScheduleState>,
}

/// Decide the startup drive level.
///
/// Polar case (no event crosses the horizon today): "winter in the relevant
/// hemisphere" is treated as continuous night. The month window is a coarse
/// approximation kept for behavioral fidelity with the original deployment,
/// not a true polar-sunrise computation.
///
/// Normal case: the output is asserted iff the sun is currently down.
pub fn initial_output_asserted(today: &SolarEvent, now: NaiveDateTime) -> bool {
    match (today.sunrise, today.sunset) {
        (Some(sunrise), Some(sunset)) => now > sunset || now < sunrise,
        _ => {
            let summer_month = POLAR_SUMMER_MONTHS.contains(&now.date().month());
            if today.latitude > 0.0 {
                !summer_month
            } else {
                summer_month
            }
        }
    }
}

/// Resolve the effective next occurrence of one event at startup.
///
/// Today's instant is used while it is still in the future; once elapsed,
/// tomorrow's substitutes. When neither day has the event (polar case) the
/// deadline becomes a 24-hour re-evaluation tick. The result is always
/// strictly in the future relative to `now`.
pub fn effective_deadline(
    today: Option<NaiveDateTime>,
    tomorrow: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Deadline {
    match (today, tomorrow) {
        (Some(instant), _) if instant > now => Deadline {
            at: instant,
            is_solar: true,
        },
        (_, Some(instant)) if instant > now => Deadline {
            at: instant,
            is_solar: true,
        },
        _ => fallback_tick(now),
    }
}

/// Re-arm one deadline from tomorrow's event after a firing.
pub fn rearmed_deadline(tomorrow: Option<NaiveDateTime>, now: NaiveDateTime) -> Deadline {
    match tomorrow {
        Some(instant) => Deadline {
            at: instant,
            is_solar: true,
        },
        None => fallback_tick(now),
    }
}

fn fallback_tick(now: NaiveDateTime) -> Deadline {
    Deadline {
        at: now + ChronoDuration::from_std(FALLBACK_REARM_INTERVAL).unwrap_or(ChronoDuration::days(1)),
        is_solar: false,
    }
}

/// Sleep interval until `at`, clamped to a minimum positive duration so a
/// deadline armed in the past (clock skew, late process start mid-event)
/// fires almost immediately instead of stalling the loop.
pub fn sleep_interval(at: NaiveDateTime, now: NaiveDateTime) -> Duration {
    match (at - now).to_std() {
        Ok(d) if d >= MINIMUM_TIMER_INTERVAL => d,
        _ => MINIMUM_TIMER_INTERVAL,
    }
}

impl Core {
    /// Create a new scheduler from its dependencies.
    pub fn new(params: CoreParams) -> Self {
        Self {
            backend: params.backend,
            display: params.display,
            config: params.config,
            signal_state: params.signal_state,
            debug_enabled: params.debug_enabled,
            state: None,
        }
    }

    /// Current schedule state, `None` before initialization.
    pub fn state(&self) -> Option<&ScheduleState> {
        self.state.as_ref()
    }

    /// Run the scheduler until shutdown.
    pub fn execute(mut self) -> Result<()> {
        if self.backend.is_none() {
            self.degraded_wait();
        } else {
            let now = time_source::now().naive_local();
            let offset = time_source::utc_offset();
            self.initialize(now, offset)?;
            self.run_loop()?;
        }

        log_block_start!("Shutting down sunswitch...");
        if let Some(backend) = self.backend.take() {
            backend.cleanup(self.debug_enabled);
        }
        Ok(())
    }

    /// Compute today's and tomorrow's events, decide the startup state,
    /// drive the output, and arm both deadlines.
    ///
    /// The hardware line is written before any deadline is armed so it is
    /// never left indeterminate while the scheduler is live.
    pub fn initialize(&mut self, now: NaiveDateTime, utc_offset: FixedOffset) -> Result<()> {
        let latitude = self.config.latitude();
        let longitude = self.config.longitude();

        let today = solar::compute(now.date(), latitude, longitude, utc_offset);
        let tomorrow = solar::compute(
            now.date() + ChronoDuration::days(1),
            latitude,
            longitude,
            utc_offset,
        );

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Today's events: {:?} / {:?}", today.sunrise, today.sunset);
            log_debug!(
                "Tomorrow's events: {:?} / {:?}",
                tomorrow.sunrise,
                tomorrow.sunset
            );
        }

        let asserted = initial_output_asserted(&today, now);
        self.drive_output(asserted);

        let next_sunset = effective_deadline(today.sunset, tomorrow.sunset, now);
        let next_sunrise = effective_deadline(today.sunrise, tomorrow.sunrise, now);

        log_block_start!(
            "Initial state: {}",
            if asserted { "night (output asserted)" } else { "day (output released)" }
        );

        self.state = Some(ScheduleState {
            output_asserted: asserted,
            next_sunset,
            next_sunrise,
            last_action: now,
        });
        self.publish_status();
        Ok(())
    }

    /// Sunset deadline fired: night begins.
    ///
    /// Asserts the output, recomputes tomorrow's sunset, and re-arms only
    /// the sunset deadline. The pending sunrise deadline is untouched.
    pub fn handle_sunset_deadline(&mut self, now: NaiveDateTime, utc_offset: FixedOffset) {
        log_block_start!("Sunset deadline fired");
        self.drive_output(true);

        let tomorrow = solar::compute(
            now.date() + ChronoDuration::days(1),
            self.config.latitude(),
            self.config.longitude(),
            utc_offset,
        );

        if let Some(state) = self.state.as_mut() {
            state.output_asserted = true;
            state.last_action = now;
            state.next_sunset = rearmed_deadline(tomorrow.sunset, now);
        }
        self.publish_status();
    }

    /// Sunrise deadline fired: day begins.
    ///
    /// Symmetric to [`Core::handle_sunset_deadline`]: releases the output
    /// and re-arms only the sunrise deadline.
    pub fn handle_sunrise_deadline(&mut self, now: NaiveDateTime, utc_offset: FixedOffset) {
        log_block_start!("Sunrise deadline fired");
        self.drive_output(false);

        let tomorrow = solar::compute(
            now.date() + ChronoDuration::days(1),
            self.config.latitude(),
            self.config.longitude(),
            utc_offset,
        );

        if let Some(state) = self.state.as_mut() {
            state.output_asserted = false;
            state.last_action = now;
            state.next_sunrise = rearmed_deadline(tomorrow.sunrise, now);
        }
        self.publish_status();
    }

    /// Main loop: sleep until the earlier deadline, fire whichever has
    /// elapsed, repeat until a shutdown signal arrives.
    fn run_loop(&mut self) -> Result<()> {
        while self.signal_state.running.load(Ordering::SeqCst) {
            let now = time_source::now().naive_local();
            let offset = time_source::utc_offset();

            let (sunset_at, sunrise_at) = match self.state.as_ref() {
                Some(state) => (state.next_sunset.at, state.next_sunrise.at),
                None => break,
            };

            if now >= sunset_at {
                self.handle_sunset_deadline(now, offset);
                continue;
            }
            if now >= sunrise_at {
                self.handle_sunrise_deadline(now, offset);
                continue;
            }

            let next_at = sunset_at.min(sunrise_at);
            // Chunked so host clock adjustments are noticed within the
            // chunk interval even during a day-long polar wait.
            let wait = sleep_interval(next_at, now).min(SLEEP_CHUNK_INTERVAL);

            match self.signal_state.signal_receiver.recv_timeout(wait) {
                Ok(_) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        Ok(())
    }

    /// Degraded mode: the output line could not be acquired. Nothing is
    /// armed and nothing is written; the process idles until shutdown so
    /// the init system does not crash-loop it.
    fn degraded_wait(&mut self) {
        log_pipe!();
        log_error!("Output line unavailable - running in degraded mode");
        log_indented!("No deadlines armed, output state undefined");
        log_indented!("Check the GPIO configuration and permissions, then restart");

        while self.signal_state.running.load(Ordering::SeqCst) {
            match self
                .signal_state
                .signal_receiver
                .recv_timeout(SLEEP_CHUNK_INTERVAL)
            {
                Ok(_) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
    }

    fn drive_output(&mut self, asserted: bool) {
        let level = if asserted { Level::Asserted } else { Level::Deasserted };
        if let Some(backend) = self.backend.as_mut()
            && let Err(e) = backend.write(level)
        {
            // Retried naturally on the next toggle; the daily re-arm bounds
            // the staleness of a failed write.
            log_pipe!();
            log_error!("Failed to write output level: {e}");
        }
    }

    fn publish_status(&mut self) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        let status = ScheduleStatus {
            next_sunset: state.next_sunset.is_solar.then_some(state.next_sunset.at),
            next_sunrise: state.next_sunrise.is_solar.then_some(state.next_sunrise.at),
            last_action: state.last_action,
            indicator: if state.output_asserted {
                Indicator::Night
            } else {
                Indicator::Day
            },
        };
        self.display.update(&status);
    }
}
