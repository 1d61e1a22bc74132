//! Service-day time handling.
//!
//! All times inside the router are plain `i32` seconds since the start of
//! the service day. They may go negative (a search starting just after
//! midnight looks back into the previous day) or past 24h (trips running
//! after midnight belong to the previous service day). This module parses
//! and formats those values and converts to and from `chrono` types at the
//! API boundary.

use chrono::{Duration, NaiveTime, Timelike};

/// Sentinel for "not reached" in a forward (depart-after) search.
pub const UNREACHED_FORWARD: i32 = i32::MAX;

/// Sentinel for "not reached" in a reverse (arrive-by) search.
pub const UNREACHED_REVERSE: i32 = i32::MIN;

/// Seconds in one service day.
pub const SECONDS_PER_DAY: i32 = 24 * 3600;

/// Error returned when parsing an invalid time or duration string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a service-day time from "H:MM" or "H:MM:SS".
///
/// Hours are not limited to 23, since trips after midnight are expressed
/// as 24:10, 25:30 and so on.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::time::parse_time;
///
/// assert_eq!(parse_time("0:02").unwrap(), 120);
/// assert_eq!(parse_time("10:00:15").unwrap(), 36_015);
/// assert_eq!(parse_time("25:30").unwrap(), 91_800);
/// assert!(parse_time("14:3").is_err());
/// assert!(parse_time("14:60").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<i32, TimeError> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let mut parts = body.split(':');
    let hour = parts
        .next()
        .filter(|h| !h.is_empty() && h.len() <= 3)
        .and_then(parse_digits)
        .ok_or_else(|| TimeError::new("invalid hour digits"))?;
    let minute = parts
        .next()
        .ok_or_else(|| TimeError::new("expected H:MM format"))
        .and_then(|m| parse_two_digits(m).ok_or_else(|| TimeError::new("invalid minute digits")))?;
    let second = match parts.next() {
        Some(sec) => {
            parse_two_digits(sec).ok_or_else(|| TimeError::new("invalid second digits"))?
        }
        None => 0,
    };
    if parts.next().is_some() {
        return Err(TimeError::new("too many components"));
    }
    if minute > 59 {
        return Err(TimeError::new("minute must be 0-59"));
    }
    if second > 59 {
        return Err(TimeError::new("second must be 0-59"));
    }

    let total = hour * 3600 + minute * 60 + second;
    Ok(if negative { -total } else { total })
}

/// Format a service-day time as "H:MM", or "H:MM:SS" when seconds are set.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::time::format_time;
///
/// assert_eq!(format_time(120), "0:02");
/// assert_eq!(format_time(36_015), "10:00:15");
/// assert_eq!(format_time(-60), "-0:01");
/// ```
pub fn format_time(time: i32) -> String {
    if time == UNREACHED_FORWARD || time == UNREACHED_REVERSE {
        return "-".to_string();
    }
    let sign = if time < 0 { "-" } else { "" };
    let abs = time.unsigned_abs();
    let (h, m, s) = (abs / 3600, (abs / 60) % 60, abs % 60);
    if s == 0 {
        format!("{sign}{h}:{m:02}")
    } else {
        format!("{sign}{h}:{m:02}:{s:02}")
    }
}

/// Format a duration in seconds as "1h2m3s", leaving out zero parts.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::time::format_duration;
///
/// assert_eq!(format_duration(0), "0s");
/// assert_eq!(format_duration(30), "30s");
/// assert_eq!(format_duration(2_340), "39m");
/// assert_eq!(format_duration(3_725), "1h2m5s");
/// ```
pub fn format_duration(seconds: i32) -> String {
    if seconds == 0 {
        return "0s".to_string();
    }
    let mut out = String::new();
    if seconds < 0 {
        out.push('-');
    }
    let abs = seconds.unsigned_abs();
    let (h, m, s) = (abs / 3600, (abs / 60) % 60, abs % 60);
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if m > 0 {
        out.push_str(&format!("{m}m"));
    }
    if s > 0 {
        out.push_str(&format!("{s}s"));
    }
    out
}

/// Parse a duration written as "1h2m3s" (any non-empty subset, in order).
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::time::parse_duration;
///
/// assert_eq!(parse_duration("45s").unwrap(), 45);
/// assert_eq!(parse_duration("1h30m").unwrap(), 5_400);
/// assert!(parse_duration("").is_err());
/// assert!(parse_duration("3x").is_err());
/// ```
pub fn parse_duration(s: &str) -> Result<i32, TimeError> {
    if s.is_empty() {
        return Err(TimeError::new("empty duration"));
    }
    if s == "0s" {
        return Ok(0);
    }

    let mut total = 0;
    let mut digits = String::new();
    let mut last_unit = 0;
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let (rank, factor) = match c {
            'h' => (1, 3600),
            'm' => (2, 60),
            's' => (3, 1),
            _ => return Err(TimeError::new("unknown duration unit")),
        };
        if rank <= last_unit {
            return Err(TimeError::new("duration units out of order"));
        }
        let value = parse_digits(&digits).ok_or_else(|| TimeError::new("missing digits"))?;
        total += value * factor;
        digits.clear();
        last_unit = rank;
    }
    if !digits.is_empty() {
        return Err(TimeError::new("trailing digits without unit"));
    }
    Ok(total)
}

/// Convert a wall-clock time to seconds since the start of the service day.
pub fn from_naive_time(time: NaiveTime) -> i32 {
    time.num_seconds_from_midnight() as i32
}

/// Convert seconds since the start of the service day to a wall-clock time.
///
/// Returns `None` for times outside `0..24h`.
pub fn to_naive_time(time: i32) -> Option<NaiveTime> {
    if !(0..SECONDS_PER_DAY).contains(&time) {
        return None;
    }
    NaiveTime::from_num_seconds_from_midnight_opt(time as u32, 0)
}

/// Whole seconds of a `chrono::Duration`, saturated to the `i32` range.
pub fn duration_secs(duration: Duration) -> i32 {
    duration
        .num_seconds()
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn parse_two_digits(s: &str) -> Option<i32> {
    if s.len() != 2 {
        return None;
    }
    parse_digits(s)
}

fn parse_digits(s: &str) -> Option<i32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn format_parse_roundtrip(t in -SECONDS_PER_DAY..3 * SECONDS_PER_DAY) {
            let text = format_time(t);
            prop_assert_eq!(parse_time(&text).unwrap(), t);
        }

        #[test]
        fn duration_roundtrip(d in 0i32..200_000) {
            let text = format_duration(d);
            prop_assert_eq!(parse_duration(&text).unwrap(), d);
        }

        #[test]
        fn formatted_time_orders_like_seconds(a in 0i32..SECONDS_PER_DAY, b in 0i32..SECONDS_PER_DAY) {
            let (pa, pb) = (
                parse_time(&format_time(a)).unwrap(),
                parse_time(&format_time(b)).unwrap(),
            );
            prop_assert_eq!(a.cmp(&b), pa.cmp(&pb));
        }

        #[test]
        fn invalid_minute_rejected(hour in 0i32..48, minute in 60i32..100) {
            let text = format!("{hour}:{minute}");
            prop_assert!(parse_time(&text).is_err());
        }
    }
}
