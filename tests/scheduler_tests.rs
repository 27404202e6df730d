//! Scheduler integration tests.
//!
//! Drives `Core` with a recording backend and a capturing display, feeding
//! explicit timestamps into `initialize` and the deadline handlers so no
//! real time has to pass.

use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::sync::Arc;

use sunswitch::backend::mock::MockBackend;
use sunswitch::backend::Level;
use sunswitch::config::Config;
use sunswitch::core::{Core, CoreParams};
use sunswitch::display::{CaptureDisplay, Indicator};
use sunswitch::logger::Log;
use sunswitch::signals::{SignalMessage, SignalState};
use sunswitch::solar;
use sunswitch::time_source::{self, FixedTimeSource};

const LATITUDE: f64 = 35.1515;
const LONGITUDE: f64 = -97.2919;

fn offset_hours(h: i32) -> FixedOffset {
    FixedOffset::east_opt(h * 3600).unwrap()
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_time(NaiveTime::from_hms_opt(h, mi, 0).unwrap())
}

fn config(latitude: f64, longitude: f64) -> Config {
    Config {
        latitude: Some(latitude),
        longitude: Some(longitude),
        gpio_pin: Some(5),
        active_low: Some(true),
    }
}

struct Harness {
    core: Core,
    writes: Arc<std::sync::Mutex<Vec<Level>>>,
    updates: Arc<std::sync::Mutex<Vec<sunswitch::display::ScheduleStatus>>>,
}

fn harness(latitude: f64, longitude: f64) -> Harness {
    Log::set_enabled(false);
    let (backend, writes) = MockBackend::new();
    let (display, updates) = CaptureDisplay::new();
    let core = Core::new(CoreParams {
        backend: Some(Box::new(backend)),
        display: Box::new(display),
        config: config(latitude, longitude),
        signal_state: SignalState::new(),
        debug_enabled: false,
    });
    Harness {
        core,
        writes,
        updates,
    }
}

#[test]
fn midday_startup_releases_output_and_arms_both_deadlines() {
    let mut h = harness(LATITUDE, LONGITUDE);
    let now = at(2015, 10, 10, 12, 0);
    let offset = offset_hours(-5);
    h.core.initialize(now, offset).unwrap();

    assert_eq!(*h.writes.lock().unwrap(), vec![Level::Deasserted]);

    let today = solar::compute(now.date(), LATITUDE, LONGITUDE, offset);
    let tomorrow = solar::compute(now.date() + Duration::days(1), LATITUDE, LONGITUDE, offset);

    let state = h.core.state().unwrap();
    assert!(!state.output_asserted);
    // Today's sunset is still ahead at noon; today's sunrise is long gone,
    // so the sunrise deadline already points at tomorrow.
    assert_eq!(state.next_sunset.at, today.sunset.unwrap());
    assert_eq!(state.next_sunrise.at, tomorrow.sunrise.unwrap());
    assert!(state.next_sunset.is_solar);
    assert!(state.next_sunrise.is_solar);
    assert!(state.next_sunset.at > now);
    assert!(state.next_sunrise.at > now);
    assert_eq!(state.last_action, now);
}

#[test]
fn late_evening_startup_asserts_output_and_uses_tomorrow_for_both() {
    let mut h = harness(LATITUDE, LONGITUDE);
    let now = at(2015, 10, 10, 23, 0);
    let offset = offset_hours(-5);
    h.core.initialize(now, offset).unwrap();

    assert_eq!(*h.writes.lock().unwrap(), vec![Level::Asserted]);

    let tomorrow = solar::compute(now.date() + Duration::days(1), LATITUDE, LONGITUDE, offset);
    let state = h.core.state().unwrap();
    assert!(state.output_asserted);
    assert_eq!(state.next_sunset.at, tomorrow.sunset.unwrap());
    assert_eq!(state.next_sunrise.at, tomorrow.sunrise.unwrap());
}

#[test]
fn pre_dawn_startup_asserts_output_and_keeps_todays_events() {
    let mut h = harness(LATITUDE, LONGITUDE);
    let now = at(2015, 10, 10, 4, 30);
    let offset = offset_hours(-5);
    h.core.initialize(now, offset).unwrap();

    assert_eq!(*h.writes.lock().unwrap(), vec![Level::Asserted]);

    let today = solar::compute(now.date(), LATITUDE, LONGITUDE, offset);
    let state = h.core.state().unwrap();
    assert!(state.output_asserted);
    assert_eq!(state.next_sunset.at, today.sunset.unwrap());
    assert_eq!(state.next_sunrise.at, today.sunrise.unwrap());
}

#[test]
fn polar_summer_startup_arms_reevaluation_ticks() {
    let mut h = harness(75.0, 0.0);
    let now = at(2015, 6, 21, 12, 0);
    h.core.initialize(now, offset_hours(0)).unwrap();

    // Continuous arctic daylight: released output, no solar deadlines,
    // both slots fall back to a 24-hour re-check.
    assert_eq!(*h.writes.lock().unwrap(), vec![Level::Deasserted]);

    let state = h.core.state().unwrap();
    assert!(!state.output_asserted);
    assert!(!state.next_sunset.is_solar);
    assert!(!state.next_sunrise.is_solar);
    assert_eq!(state.next_sunset.at, now + Duration::days(1));
    assert_eq!(state.next_sunrise.at, now + Duration::days(1));

    // Display renders the fallback as "no instant", not a garbage time.
    let updates = h.updates.lock().unwrap();
    let last = updates.last().unwrap();
    assert_eq!(last.next_sunset, None);
    assert_eq!(last.next_sunrise, None);
    assert_eq!(last.indicator, Indicator::Day);
}

#[test]
fn polar_winter_startup_asserts_output() {
    let mut h = harness(75.0, 0.0);
    let now = at(2015, 12, 21, 12, 0);
    h.core.initialize(now, offset_hours(0)).unwrap();

    assert_eq!(*h.writes.lock().unwrap(), vec![Level::Asserted]);
    let updates = h.updates.lock().unwrap();
    assert_eq!(updates.last().unwrap().indicator, Indicator::Night);
}

#[test]
fn sunset_firing_rearms_only_the_sunset_deadline() {
    let mut h = harness(LATITUDE, LONGITUDE);
    let offset = offset_hours(-5);
    h.core.initialize(at(2015, 10, 10, 12, 0), offset).unwrap();

    let sunrise_before = h.core.state().unwrap().next_sunrise;
    let fired_at = h.core.state().unwrap().next_sunset.at;
    h.core.handle_sunset_deadline(fired_at, offset);

    let tomorrow = solar::compute(
        fired_at.date() + Duration::days(1),
        LATITUDE,
        LONGITUDE,
        offset,
    );

    let state = h.core.state().unwrap();
    assert!(state.output_asserted);
    assert_eq!(state.next_sunset.at, tomorrow.sunset.unwrap());
    assert_eq!(state.next_sunrise, sunrise_before);
    assert_eq!(state.last_action, fired_at);
    assert_eq!(
        *h.writes.lock().unwrap(),
        vec![Level::Deasserted, Level::Asserted]
    );

    // Every toggle publishes a fresh status snapshot.
    let updates = h.updates.lock().unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates.last().unwrap().last_action, fired_at);
}

#[test]
fn sunrise_firing_rearms_only_the_sunrise_deadline() {
    let mut h = harness(LATITUDE, LONGITUDE);
    let offset = offset_hours(-5);
    h.core.initialize(at(2015, 10, 10, 23, 0), offset).unwrap();

    let sunset_before = h.core.state().unwrap().next_sunset;
    let fired_at = h.core.state().unwrap().next_sunrise.at;
    h.core.handle_sunrise_deadline(fired_at, offset);

    let day_after = solar::compute(
        fired_at.date() + Duration::days(1),
        LATITUDE,
        LONGITUDE,
        offset,
    );

    let state = h.core.state().unwrap();
    assert!(!state.output_asserted);
    assert_eq!(state.next_sunrise.at, day_after.sunrise.unwrap());
    assert_eq!(state.next_sunset, sunset_before);
    assert_eq!(
        *h.writes.lock().unwrap(),
        vec![Level::Asserted, Level::Deasserted]
    );
}

#[test]
fn alternating_firings_stay_interleaved_across_days() {
    let mut h = harness(LATITUDE, LONGITUDE);
    let offset = offset_hours(-5);
    h.core.initialize(at(2015, 10, 10, 12, 0), offset).unwrap();

    // Walk a few simulated days, always firing whichever deadline is
    // earlier, the way the run loop would.
    for _ in 0..6 {
        let state = h.core.state().unwrap();
        let (sunset, sunrise) = (state.next_sunset.at, state.next_sunrise.at);
        if sunset < sunrise {
            h.core.handle_sunset_deadline(sunset, offset);
            assert!(h.core.state().unwrap().output_asserted);
        } else {
            h.core.handle_sunrise_deadline(sunrise, offset);
            assert!(!h.core.state().unwrap().output_asserted);
        }
    }

    let writes = h.writes.lock().unwrap();
    assert_eq!(writes.len(), 7);
    for pair in writes.windows(2) {
        assert_ne!(pair[0], pair[1], "consecutive writes must alternate");
    }
}

#[test]
fn execute_runs_until_shutdown_message() {
    Log::set_enabled(false);
    // Pin the global clock to local noon so both deadlines are armed in
    // the future and the loop parks on the wakeup channel.
    time_source::init_time_source(Arc::new(FixedTimeSource::at(at(2021, 4, 15, 12, 0))));

    let (backend, writes) = MockBackend::new();
    let (display, _updates) = CaptureDisplay::new();
    let signal_state = SignalState::new();
    signal_state
        .signal_sender
        .send(SignalMessage::Shutdown)
        .unwrap();

    let core = Core::new(CoreParams {
        backend: Some(Box::new(backend)),
        display: Box::new(display),
        config: config(LATITUDE, LONGITUDE),
        signal_state,
        debug_enabled: false,
    });
    core.execute().unwrap();

    // One write from initialization, then the queued shutdown ends the loop.
    assert_eq!(writes.lock().unwrap().len(), 1);
}

#[test]
fn degraded_mode_idles_without_writing() {
    Log::set_enabled(false);
    let (display, updates) = CaptureDisplay::new();
    let signal_state = SignalState::new();
    signal_state
        .signal_sender
        .send(SignalMessage::Shutdown)
        .unwrap();

    let core = Core::new(CoreParams {
        backend: None,
        display: Box::new(display),
        config: config(LATITUDE, LONGITUDE),
        signal_state,
        debug_enabled: false,
    });
    core.execute().unwrap();

    // No backend, no schedule: nothing is published.
    assert!(updates.lock().unwrap().is_empty());
}
