//! Time helpers in the business UTC offset
//!
//! Stored timestamps are Unix millis (UTC). Calendar questions (which year,
//! which month, what day is "today") are answered in the configured offset.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use super::{AppError, AppResult, ErrorCode};

/// Pickup time used when the client sends none
pub const DEFAULT_PICKUP_TIME: &str = "12:00";

/// `25 July 2024 at 12:00:00 UTC+00:00`
const ORDER_TIME_FORMAT: &str = "%d %B %Y at %H:%M:%S UTC%:z";

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parse a `+HH:MM` / `-HH:MM` offset
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    let (sign, rest) = match value.as_bytes().first().copied()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let (h, m) = rest.split_once(':')?;
    let hours: i32 = h.parse().ok()?;
    let minutes: i32 = m.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse the pickup time (`HH:MM`), defaulting to 12:00
pub fn parse_pickup_time(value: Option<&str>) -> AppResult<NaiveTime> {
    let raw = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => DEFAULT_PICKUP_TIME,
    };
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| {
        AppError::new(ErrorCode::PickupTimeInvalid).with_detail("pickupTime", raw)
    })
}

/// Order time string: the pickup time on `date`, in `offset`
pub fn format_order_time(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> String {
    match offset.from_local_datetime(&date.and_time(time)).single() {
        Some(dt) => dt.format(ORDER_TIME_FORMAT).to_string(),
        None => date
            .and_time(time)
            .and_utc()
            .fixed_offset()
            .format(ORDER_TIME_FORMAT)
            .to_string(),
    }
}

/// Order time string for today in the business offset
pub fn order_time_today(time: NaiveTime, offset: FixedOffset) -> String {
    let today = Utc::now().with_timezone(&offset).date_naive();
    format_order_time(today, time, offset)
}

/// Millis → datetime in the business offset
pub fn millis_to_local(ms: i64, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    DateTime::<Utc>::from_timestamp_millis(ms).map(|dt| dt.with_timezone(&offset))
}

/// Calendar year of a timestamp in the business offset
pub fn year_of(ms: i64, offset: FixedOffset) -> Option<i32> {
    millis_to_local(ms, offset).map(|dt| dt.year())
}

/// Zero-based month index of a timestamp in the business offset
pub fn month_index_of(ms: i64, offset: FixedOffset) -> Option<usize> {
    millis_to_local(ms, offset).map(|dt| dt.month0() as usize)
}

/// Current calendar year in the business offset
pub fn current_year(offset: FixedOffset) -> i32 {
    Utc::now().with_timezone(&offset).year()
}
