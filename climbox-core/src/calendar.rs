//! Calendar-agnostic dates for model time axes.
//!
//! Model output stores time as a numeric offset from an epoch under one of
//! several calendars (real-world, 365-day, 366-day, 360-day). Native
//! calendar objects from different models are not guaranteed to be
//! comparable, so the time axis is decoded once into [`CalendarDate`] — a
//! plain (year, month, day, hour, minute, second) record with a total
//! ordering — before any index lookup happens.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{ClimboxError, ClimboxResult};
use crate::FloatValue;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Model calendar, as named by the CF `calendar` attribute.
#[pyo3::pyclass]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Calendar {
    /// Real-world (proleptic Gregorian) calendar.
    Standard,
    /// Fixed 365-day years, no leap days.
    NoLeap,
    /// Fixed 366-day years.
    AllLeap,
    /// Twelve 30-day months.
    Day360,
}

impl Calendar {
    /// Parse a CF calendar attribute value.
    pub fn parse(name: &str) -> ClimboxResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => Ok(Calendar::Standard),
            "noleap" | "365_day" => Ok(Calendar::NoLeap),
            "all_leap" | "366_day" => Ok(Calendar::AllLeap),
            "360_day" => Ok(Calendar::Day360),
            other => Err(ClimboxError::Calendar(format!(
                "unsupported calendar {other:?}"
            ))),
        }
    }
}

/// A decoded date, comparable across calendars.
///
/// Ordering is lexicographic over (year, month, day, hour, minute, second),
/// which matches chronological order in every supported calendar.
#[pyo3::pyclass]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CalendarDate {
    #[pyo3(get)]
    pub year: i32,
    #[pyo3(get)]
    pub month: u8,
    #[pyo3(get)]
    pub day: u8,
    #[pyo3(get)]
    pub hour: u8,
    #[pyo3(get)]
    pub minute: u8,
    #[pyo3(get)]
    pub second: u8,
}

impl CalendarDate {
    /// Build a date, validating field ranges (month 1-12, day 1-31,
    /// hour/minute/second within the day).
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> ClimboxResult<Self> {
        if !(1..=12).contains(&month)
            || !(1..=31).contains(&day)
            || hour >= 24
            || minute >= 60
            || second >= 60
        {
            return Err(ClimboxError::Calendar(format!(
                "invalid date fields {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
            )));
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Midnight on the given day.
    pub fn ymd(year: i32, month: u8, day: u8) -> ClimboxResult<Self> {
        Self::new(year, month, day, 0, 0, 0)
    }

    fn seconds_of_day(&self) -> f64 {
        f64::from(self.hour) * 3600.0 + f64::from(self.minute) * 60.0 + f64::from(self.second)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// The unit part of a CF time axis (`"<unit> since <date>"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn parse(token: &str) -> ClimboxResult<Self> {
        match token.to_ascii_lowercase().as_str() {
            "second" | "seconds" | "sec" | "secs" => Ok(TimeUnit::Seconds),
            "minute" | "minutes" | "min" | "mins" => Ok(TimeUnit::Minutes),
            "hour" | "hours" | "hr" | "hrs" => Ok(TimeUnit::Hours),
            "day" | "days" => Ok(TimeUnit::Days),
            other => Err(ClimboxError::Calendar(format!(
                "unsupported time unit {other:?}"
            ))),
        }
    }

    /// Length of one unit in seconds.
    pub fn seconds(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
            TimeUnit::Days => SECONDS_PER_DAY,
        }
    }
}

/// Parsed CF time units: a step unit and the epoch it counts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub epoch: CalendarDate,
}

impl TimeUnits {
    /// Parse a units string such as `"days since 1850-01-01"` or
    /// `"hours since 2000-01-01 12:00:00"`. Trailing tokens (time zone
    /// annotations) are ignored.
    pub fn parse(text: &str) -> ClimboxResult<Self> {
        let mut parts = text.split_whitespace();
        let unit = TimeUnit::parse(parts.next().ok_or_else(|| {
            ClimboxError::Calendar(format!("empty time units string {text:?}"))
        })?)?;
        match parts.next() {
            Some(word) if word.eq_ignore_ascii_case("since") => {}
            _ => {
                return Err(ClimboxError::Calendar(format!(
                    "expected \"<unit> since <date>\", got {text:?}"
                )))
            }
        }
        let stamp = parts.next().ok_or_else(|| {
            ClimboxError::Calendar(format!("missing epoch date in {text:?}"))
        })?;
        let (date_part, mut time_part) = match stamp.split_once('T') {
            Some((d, t)) => (d, Some(t)),
            None => (stamp, None),
        };
        if time_part.is_none() {
            time_part = parts.next().filter(|t| t.contains(':'));
        }
        let epoch = parse_epoch(date_part, time_part, text)?;
        Ok(Self { unit, epoch })
    }
}

fn parse_epoch(
    date_part: &str,
    time_part: Option<&str>,
    text: &str,
) -> ClimboxResult<CalendarDate> {
    let bad = || ClimboxError::Calendar(format!("cannot parse epoch date in {text:?}"));
    let mut fields = date_part.split('-');
    let year: i32 = fields.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let month: u8 = fields.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let day: u8 = fields.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
    let (mut hour, mut minute, mut second) = (0u8, 0u8, 0u8);
    if let Some(time) = time_part {
        let mut fields = time.split(':');
        hour = fields.next().and_then(|s| s.parse().ok()).ok_or_else(bad)?;
        minute = fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        // Seconds may carry a fractional part; truncate it.
        second = fields
            .next()
            .and_then(|s| s.parse::<f64>().ok())
            .map(|s| s as u8)
            .unwrap_or(0);
    }
    CalendarDate::new(year, month, day, hour, minute, second)
}

// Day-number arithmetic. Each calendar maps a date to a continuous day
// count; decoding adds the numeric offset and maps back. The standard
// calendar uses Julian day numbers (Fliegel-Van Flandern); the fixed-length
// calendars count from year 0 with per-calendar month tables.

const CUM_DAYS_NOLEAP: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
const CUM_DAYS_ALLLEAP: [i64; 12] = [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335];

fn julian_day_number(year: i64, month: i64, day: i64) -> i64 {
    day - 32075
        + 1461 * (year + 4800 + (month - 14) / 12) / 4
        + 367 * (month - 2 - (month - 14) / 12 * 12) / 12
        - 3 * ((year + 4900 + (month - 14) / 12) / 100) / 4
}

fn gregorian_from_jdn(jd: i64) -> (i64, i64, i64) {
    let l = jd + 68569;
    let n = 4 * l / 146097;
    let l = l - (146097 * n + 3) / 4;
    let i = 4000 * (l + 1) / 1461001;
    let l = l - 1461 * i / 4 + 31;
    let j = 80 * l / 2447;
    let k = l - 2447 * j / 80;
    let l = j / 11;
    let j = j + 2 - 12 * l;
    let i = 100 * (n - 49) + i + l;
    (i, j, k)
}

fn fixed_day_number(cum: &[i64; 12], year_len: i64, date: &CalendarDate) -> i64 {
    i64::from(date.year) * year_len + cum[usize::from(date.month) - 1] + i64::from(date.day) - 1
}

fn fixed_from_day_number(cum: &[i64; 12], year_len: i64, n: i64) -> (i32, u8, u8) {
    let year = n.div_euclid(year_len);
    let mut rem = n.rem_euclid(year_len);
    let mut month = 12;
    for (m, &c) in cum.iter().enumerate().skip(1) {
        if rem < c {
            month = m;
            break;
        }
    }
    rem -= cum[month - 1];
    (year as i32, month as u8, (rem + 1) as u8)
}

fn day_number(calendar: Calendar, date: &CalendarDate) -> i64 {
    match calendar {
        Calendar::Standard => julian_day_number(
            i64::from(date.year),
            i64::from(date.month),
            i64::from(date.day),
        ),
        Calendar::NoLeap => fixed_day_number(&CUM_DAYS_NOLEAP, 365, date),
        Calendar::AllLeap => fixed_day_number(&CUM_DAYS_ALLLEAP, 366, date),
        Calendar::Day360 => {
            i64::from(date.year) * 360
                + (i64::from(date.month) - 1) * 30
                + i64::from(date.day)
                - 1
        }
    }
}

fn date_from_day_number(calendar: Calendar, n: i64) -> (i32, u8, u8) {
    match calendar {
        Calendar::Standard => {
            let (y, m, d) = gregorian_from_jdn(n);
            (y as i32, m as u8, d as u8)
        }
        Calendar::NoLeap => fixed_from_day_number(&CUM_DAYS_NOLEAP, 365, n),
        Calendar::AllLeap => fixed_from_day_number(&CUM_DAYS_ALLLEAP, 366, n),
        Calendar::Day360 => {
            let year = n.div_euclid(360);
            let rem = n.rem_euclid(360);
            (year as i32, (rem / 30 + 1) as u8, (rem % 30 + 1) as u8)
        }
    }
}

/// Decode a numeric time coordinate into comparable dates.
///
/// # Examples
///
/// ```rust
/// use climbox_core::calendar::{decode_times, Calendar, TimeUnits};
///
/// let units = TimeUnits::parse("days since 2000-01-01").unwrap();
/// let dates = decode_times(&[0.0, 31.0], &units, Calendar::Standard).unwrap();
/// assert_eq!(dates[1].month, 2);
/// ```
pub fn decode_times(
    values: &[FloatValue],
    units: &TimeUnits,
    calendar: Calendar,
) -> ClimboxResult<Vec<CalendarDate>> {
    let epoch_days =
        day_number(calendar, &units.epoch) as f64 + units.epoch.seconds_of_day() / SECONDS_PER_DAY;
    values
        .iter()
        .map(|&v| {
            let total = epoch_days + v * units.unit.seconds() / SECONDS_PER_DAY;
            let mut day = total.floor() as i64;
            let mut secs = ((total - total.floor()) * SECONDS_PER_DAY).round() as i64;
            if secs >= SECONDS_PER_DAY as i64 {
                day += 1;
                secs -= SECONDS_PER_DAY as i64;
            }
            let (year, month, day) = date_from_day_number(calendar, day);
            CalendarDate::new(
                year,
                month,
                day,
                (secs / 3600) as u8,
                ((secs % 3600) / 60) as u8,
                (secs % 60) as u8,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_calendar_names() {
        assert_eq!(Calendar::parse("standard").unwrap(), Calendar::Standard);
        assert_eq!(Calendar::parse("Gregorian").unwrap(), Calendar::Standard);
        assert_eq!(Calendar::parse("noleap").unwrap(), Calendar::NoLeap);
        assert_eq!(Calendar::parse("365_day").unwrap(), Calendar::NoLeap);
        assert_eq!(Calendar::parse("360_day").unwrap(), Calendar::Day360);
        assert!(Calendar::parse("julian").is_err());
    }

    #[test]
    fn parse_units_variants() {
        let u = TimeUnits::parse("days since 1850-01-01").unwrap();
        assert_eq!(u.unit, TimeUnit::Days);
        assert_eq!(u.epoch, CalendarDate::ymd(1850, 1, 1).unwrap());

        let u = TimeUnits::parse("hours since 2000-01-01 12:00:00").unwrap();
        assert_eq!(u.unit, TimeUnit::Hours);
        assert_eq!(u.epoch.hour, 12);

        let u = TimeUnits::parse("seconds since 2000-01-01T06:30:00").unwrap();
        assert_eq!(u.unit, TimeUnit::Seconds);
        assert_eq!((u.epoch.hour, u.epoch.minute), (6, 30));

        assert!(TimeUnits::parse("fortnights since 2000-01-01").is_err());
        assert!(TimeUnits::parse("days until 2000-01-01").is_err());
    }

    #[test]
    fn decode_standard_calendar() {
        let units = TimeUnits::parse("days since 2000-01-01").unwrap();
        let dates = decode_times(&[0.0, 31.0, 366.0], &units, Calendar::Standard).unwrap();
        assert_eq!(dates[0], CalendarDate::ymd(2000, 1, 1).unwrap());
        assert_eq!(dates[1], CalendarDate::ymd(2000, 2, 1).unwrap());
        // 2000 is a leap year, so 366 days lands on the next new year.
        assert_eq!(dates[2], CalendarDate::ymd(2001, 1, 1).unwrap());
    }

    #[test]
    fn decode_fractional_days_and_hours() {
        let units = TimeUnits::parse("days since 2000-01-01").unwrap();
        let dates = decode_times(&[0.5], &units, Calendar::Standard).unwrap();
        assert_eq!(dates[0].hour, 12);

        let units = TimeUnits::parse("hours since 2000-01-01").unwrap();
        let dates = decode_times(&[36.0], &units, Calendar::Standard).unwrap();
        assert_eq!(dates[0], CalendarDate::new(2000, 1, 2, 12, 0, 0).unwrap());
    }

    #[test]
    fn decode_noleap_calendar() {
        let units = TimeUnits::parse("days since 2000-01-01").unwrap();
        let dates = decode_times(&[0.0, 59.0, 365.0], &units, Calendar::NoLeap).unwrap();
        assert_eq!(dates[0], CalendarDate::ymd(2000, 1, 1).unwrap());
        // No Feb 29 in this calendar: day 59 is already March 1.
        assert_eq!(dates[1], CalendarDate::ymd(2000, 3, 1).unwrap());
        assert_eq!(dates[2], CalendarDate::ymd(2001, 1, 1).unwrap());
    }

    #[test]
    fn decode_360_day_calendar() {
        let units = TimeUnits::parse("days since 2000-01-01").unwrap();
        let dates = decode_times(&[30.0, 360.0], &units, Calendar::Day360).unwrap();
        assert_eq!(dates[0], CalendarDate::ymd(2000, 2, 1).unwrap());
        assert_eq!(dates[1], CalendarDate::ymd(2001, 1, 1).unwrap());
    }

    #[test]
    fn decoded_dates_are_ordered() {
        let units = TimeUnits::parse("days since 1999-12-30").unwrap();
        for calendar in [
            Calendar::Standard,
            Calendar::NoLeap,
            Calendar::AllLeap,
            Calendar::Day360,
        ] {
            let values: Vec<f64> = (0..48).map(|i| i as f64 * 30.4).collect();
            let dates = decode_times(&values, &units, calendar).unwrap();
            assert!(dates.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn date_ordering_is_chronological() {
        let a = CalendarDate::ymd(1999, 12, 31).unwrap();
        let b = CalendarDate::ymd(2000, 1, 1).unwrap();
        let c = CalendarDate::new(2000, 1, 1, 0, 0, 1).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn date_display() {
        let d = CalendarDate::new(1976, 5, 1, 6, 0, 0).unwrap();
        assert_eq!(d.to_string(), "1976-05-01 06:00:00");
    }

    #[test]
    fn invalid_date_fields_error() {
        assert!(CalendarDate::ymd(2000, 13, 1).is_err());
        assert!(CalendarDate::ymd(2000, 0, 1).is_err());
        assert!(CalendarDate::new(2000, 1, 1, 24, 0, 0).is_err());
    }
}
