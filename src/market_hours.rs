//! US equity regular-session clock.
//!
//! Eastern time is derived from UTC with the US daylight-saving rule (second Sunday
//! of March to first Sunday of November, switching at 02:00 local). Exchange
//! holidays are not modelled.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};

const EST_OFFSET_HOURS: i64 = -5;
const EDT_OFFSET_HOURS: i64 = -4;

fn nth_sunday(year: i32, month: u32, n: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let to_sunday = (7 - first.weekday().num_days_from_sunday()) % 7;
    first.checked_add_signed(Duration::days(i64::from(to_sunday + 7 * (n - 1))))
}

/// Whether US Eastern daylight time is in effect at `now`
pub fn is_eastern_dst(now: DateTime<Utc>) -> bool {
    let year = now.year();
    let (Some(start), Some(end)) = (nth_sunday(year, 3, 2), nth_sunday(year, 11, 1)) else {
        return false;
    };
    // 02:00 EST == 07:00 UTC, 02:00 EDT == 06:00 UTC
    let start = Utc.from_utc_datetime(&start.and_hms_opt(7, 0, 0).unwrap_or_default());
    let end = Utc.from_utc_datetime(&end.and_hms_opt(6, 0, 0).unwrap_or_default());
    now >= start && now < end
}

/// Whether `now` falls in the 09:30–16:00 Eastern weekday session
pub fn is_regular_trading_time(now: DateTime<Utc>) -> bool {
    let offset = if is_eastern_dst(now) {
        EDT_OFFSET_HOURS
    } else {
        EST_OFFSET_HOURS
    };
    let local = now.naive_utc() + Duration::hours(offset);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }

    let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default();
    let close = NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default();
    let time = local.time().with_nanosecond(0).unwrap_or_else(|| local.time());
    time >= open && time < close
}
