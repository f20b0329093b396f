//! Calendar week boundaries.
//!
//! Weeks start on Sunday at local midnight. A list is "current" when its
//! `shop_date` is on or after the start of the week containing "now".

use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Longest DST gap we walk through when local midnight does not exist.
const MAX_GAP_MINUTES: i64 = 180;

/// Start of the calendar week containing `at`: the most recent Sunday at
/// 00:00:00.000 in `at`'s time zone that is not after `at`.
///
/// Applying it to its own output returns the same instant.
#[must_use]
pub fn start_of_week<Tz: TimeZone>(at: &DateTime<Tz>) -> DateTime<Tz> {
    let date = at.date_naive();
    let days_back = u64::from(date.weekday().num_days_from_sunday());
    let sunday = date - Days::new(days_back);
    local_midnight(&at.timezone(), sunday)
}

/// First instant of `date` in `tz`.
///
/// Ambiguous midnights resolve to the earlier instant. When midnight falls in
/// a DST gap the first valid minute after it is used.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
        return start;
    }

    (1..=MAX_GAP_MINUTES)
        .find_map(|minutes| {
            tz.from_local_datetime(&(midnight + Duration::minutes(minutes)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// The zone in which calendar weeks are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekZone {
    /// The host's local time zone, including its DST rules.
    #[default]
    Local,
    /// A fixed UTC offset.
    Fixed(FixedOffset),
}

impl WeekZone {
    /// Start of the week containing `now`, as a UTC instant suitable for
    /// comparing against stored `shop_date` values.
    #[must_use]
    pub fn week_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Local => start_of_week(&now.with_timezone(&Local)).with_timezone(&Utc),
            Self::Fixed(offset) => start_of_week(&now.with_timezone(offset)).with_timezone(&Utc),
        }
    }

    /// `at` as a wall-clock time in this zone, for display.
    #[must_use]
    pub fn to_local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Self::Local => at.with_timezone(&Local).fixed_offset(),
            Self::Fixed(offset) => at.with_timezone(offset),
        }
    }
}
