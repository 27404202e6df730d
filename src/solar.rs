//! Solar event calculation for a fixed geographic location.
//!
//! Computes local sunrise and sunset instants for a given calendar date
//! using the standard hour-angle approach: Spencer's seasonal series for
//! solar declination and the equation of time, then the sunrise equation
//! against a 90.833° zenith (solar radius plus standard refraction).
//!
//! The computation is pure: identical inputs always produce bit-identical
//! results, and the only degenerate outcome is a date/latitude combination
//! where the sun never crosses the horizon. That polar case is a normal
//! result (`None` instants), not an error.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use std::f64::consts::PI;

/// Effective zenith angle for sunrise/sunset in radians: 90.833° accounts
/// for the solar disc's angular radius and mean atmospheric refraction.
const SUNRISE_ZENITH_RAD: f64 = 90.833 * PI / 180.0;

/// Sunrise/sunset instants for one date at one location.
///
/// Immutable once computed. `sunrise`/`sunset` are local wall-clock
/// instants truncated to whole seconds; `None` exactly when the hour angle
/// for that event is mathematically undefined (the sun stays above or below
/// the horizon all day). When both are `None` the location is in continuous
/// day or continuous night; which of the two is decided by hemisphere and
/// season, not by this type.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarEvent {
    /// Calendar date the computation is anchored to.
    pub date: NaiveDate,
    /// Latitude in decimal degrees, positive north.
    pub latitude: f64,
    /// Longitude in decimal degrees, positive east.
    pub longitude: f64,
    /// Local sunrise instant, if the sun rises on this date.
    pub sunrise: Option<NaiveDateTime>,
    /// Local sunset instant, if the sun sets on this date.
    pub sunset: Option<NaiveDateTime>,
}

impl SolarEvent {
    /// True when the sun does not cross the horizon on this date
    /// (polar day or polar night).
    pub fn is_polar(&self) -> bool {
        self.sunrise.is_none() && self.sunset.is_none()
    }
}

/// Solar declination in radians for a day of year (Spencer 1971).
fn declination(fractional_year: f64) -> f64 {
    0.006918 - 0.399912 * fractional_year.cos() + 0.070257 * fractional_year.sin()
        - 0.006758 * (2.0 * fractional_year).cos()
        + 0.000907 * (2.0 * fractional_year).sin()
        - 0.002697 * (3.0 * fractional_year).cos()
        + 0.00148 * (3.0 * fractional_year).sin()
}

/// Equation of time in minutes for a day of year (Spencer 1971).
fn equation_of_time(fractional_year: f64) -> f64 {
    229.18
        * (0.000075 + 0.001868 * fractional_year.cos()
            - 0.032077 * fractional_year.sin()
            - 0.014615 * (2.0 * fractional_year).cos()
            - 0.04089 * (2.0 * fractional_year).sin())
}

/// Compute the solar events for `date` at the given coordinates.
///
/// `utc_offset` is the local clock's offset from UTC for that date; the
/// caller's clock context supplies it, typically via
/// [`crate::time_source::utc_offset`]. All trigonometry runs in radians
/// internally; coordinates are accepted in degrees. Output instants are
/// truncated to whole seconds. Leap seconds are ignored.
pub fn compute(date: NaiveDate, latitude: f64, longitude: f64, utc_offset: FixedOffset) -> SolarEvent {
    let fractional_year = 2.0 * PI * f64::from(date.ordinal() - 1) / 365.0;
    let decl = declination(fractional_year);
    let eot_minutes = equation_of_time(fractional_year);

    let lat_rad = latitude.to_radians();
    let cos_hour_angle =
        (SUNRISE_ZENITH_RAD.cos() - lat_rad.sin() * decl.sin()) / (lat_rad.cos() * decl.cos());

    // |cos H| > 1 means the sunrise equation has no solution on this date:
    // the sun stays up or stays down. The NaN guard covers latitude ±90
    // where the denominator vanishes.
    if cos_hour_angle.is_nan() || cos_hour_angle.abs() > 1.0 {
        return SolarEvent {
            date,
            latitude,
            longitude,
            sunrise: None,
            sunset: None,
        };
    }

    let half_day_hours = cos_hour_angle.acos().to_degrees() / 15.0;

    // Local clock solar noon: 12h shifted by the UTC offset, the
    // longitude-based time correction and the equation of time.
    let offset_hours = f64::from(utc_offset.local_minus_utc()) / 3600.0;
    let solar_noon_hours = 12.0 + offset_hours - longitude / 15.0 - eot_minutes / 60.0;

    SolarEvent {
        date,
        latitude,
        longitude,
        sunrise: Some(instant_at(date, solar_noon_hours - half_day_hours)),
        sunset: Some(instant_at(date, solar_noon_hours + half_day_hours)),
    }
}

/// Turn fractional hours from local midnight of `date` into an instant,
/// truncated to whole seconds. Values outside 0..24 are allowed; near the
/// date line the clock time of an event can spill into the adjacent date.
fn instant_at(date: NaiveDate, hours: f64) -> NaiveDateTime {
    let seconds = (hours * 3600.0).floor() as i64;
    date.and_time(chrono::NaiveTime::MIN) + Duration::seconds(seconds)
}
