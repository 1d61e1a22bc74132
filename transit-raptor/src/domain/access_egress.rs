//! Access and egress paths.
//!
//! An `AccessEgress` connects the virtual origin to a stop (access) or a
//! stop to the virtual destination (egress). Street routing produces them
//! outside the router; here they are plain values with a duration, a cost,
//! a ride count for flexible services, an optional time penalty and
//! optional opening hours.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cost::{DEFAULT_WALK_RELUCTANCE, cost_from_secs_f64};
use super::time::{SECONDS_PER_DAY, format_duration, format_time};
use super::StopIndex;

/// When an access or egress path can be used, applied to its departure time.
///
/// A `Daily` window repeats every service day; `close` is inclusive and may
/// be past midnight (e.g. 23:00 to 25:00).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OpeningHours {
    #[default]
    Always,
    Closed,
    Daily {
        open: i32,
        close: i32,
    },
}

impl OpeningHours {
    /// Earliest open departure at or after `time`.
    pub fn earliest_departure(&self, time: i32) -> Option<i32> {
        match *self {
            OpeningHours::Always => Some(time),
            OpeningHours::Closed => None,
            OpeningHours::Daily { open, close } => {
                let day = time.div_euclid(SECONDS_PER_DAY);
                (day - 1..=day + 1).find_map(|d| {
                    let (o, c) = (open + d * SECONDS_PER_DAY, close + d * SECONDS_PER_DAY);
                    (time <= c).then(|| time.max(o))
                })
            }
        }
    }

    /// Latest open departure at or before `time`.
    pub fn latest_departure(&self, time: i32) -> Option<i32> {
        match *self {
            OpeningHours::Always => Some(time),
            OpeningHours::Closed => None,
            OpeningHours::Daily { open, close } => {
                let day = time.div_euclid(SECONDS_PER_DAY);
                (day - 1..=day + 1).rev().find_map(|d| {
                    let (o, c) = (open + d * SECONDS_PER_DAY, close + d * SECONDS_PER_DAY);
                    (time >= o).then(|| time.min(c))
                })
            }
        }
    }
}

/// A street or flexible connection between the virtual origin/destination
/// and a stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessEgress {
    /// The stop end of the path
    pub stop: StopIndex,
    /// Travel time in seconds, without any penalty
    pub duration: i32,
    /// Generalized cost in centi-seconds
    pub c1: i32,
    /// Number of flexible rides contained in the path
    pub rides: u32,
    /// Whether the stop end of the path is a ride (rather than a walk)
    pub stop_reached_on_board: bool,
    /// Extra seconds counted against the path when ranking, never for limits
    pub time_penalty: i32,
    /// When the path can be used
    pub opening_hours: OpeningHours,
}

impl AccessEgress {
    /// A walk to or from `stop`, costed with the default walk reluctance.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_raptor::domain::AccessEgress;
    ///
    /// let walk = AccessEgress::walk(3, 30);
    /// assert_eq!(walk.c1, 6_000);
    /// assert!(!walk.has_rides());
    /// ```
    pub fn walk(stop: StopIndex, duration: i32) -> Self {
        Self {
            stop,
            duration,
            c1: cost_from_secs_f64(f64::from(duration) * DEFAULT_WALK_RELUCTANCE),
            rides: 0,
            stop_reached_on_board: false,
            time_penalty: 0,
            opening_hours: OpeningHours::Always,
        }
    }

    /// A flexible ride whose stop end is on board the flexible vehicle.
    pub fn flex(stop: StopIndex, duration: i32, rides: u32) -> Self {
        Self {
            rides,
            stop_reached_on_board: true,
            ..Self::walk(stop, duration)
        }
    }

    /// A flexible ride followed (access) or preceded (egress) by a walk.
    pub fn flex_and_walk(stop: StopIndex, duration: i32, rides: u32) -> Self {
        Self {
            rides,
            stop_reached_on_board: false,
            ..Self::walk(stop, duration)
        }
    }

    /// Override the generalized cost, given in seconds.
    pub fn with_cost(mut self, c1_secs: i32) -> Self {
        self.c1 = c1_secs * 100;
        self
    }

    pub fn with_time_penalty(mut self, seconds: i32) -> Self {
        self.time_penalty = seconds;
        self
    }

    /// Restrict departures to a daily window, both ends inclusive.
    pub fn with_opening_hours(mut self, open: i32, close: i32) -> Self {
        self.opening_hours = OpeningHours::Daily { open, close };
        self
    }

    /// Mark the path as never open.
    pub fn closed(mut self) -> Self {
        self.opening_hours = OpeningHours::Closed;
        self
    }

    pub fn has_rides(&self) -> bool {
        self.rides > 0
    }

    pub fn has_opening_hours(&self) -> bool {
        self.opening_hours != OpeningHours::Always
    }

    /// Duration as seen by the search, penalty included.
    pub fn duration_with_penalty(&self) -> i32 {
        self.duration + self.time_penalty
    }

    /// Earliest departure at or after `time` when the path is open.
    pub fn earliest_departure_time(&self, time: i32) -> Option<i32> {
        self.opening_hours.earliest_departure(time)
    }

    /// Latest arrival at or before `time` whose departure falls in the
    /// opening hours.
    pub fn latest_arrival_time(&self, time: i32) -> Option<i32> {
        self.opening_hours
            .latest_departure(time - self.duration)
            .map(|dep| dep + self.duration)
    }
}

impl fmt::Display for AccessEgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_rides() {
            write!(f, "Flex {} {}x", format_duration(self.duration), self.rides)?;
        } else {
            write!(f, "Walk {}", format_duration(self.duration))?;
        }
        match self.opening_hours {
            OpeningHours::Always => {}
            OpeningHours::Closed => f.write_str(" Closed")?,
            OpeningHours::Daily { open, close } => {
                write!(f, " Open({} {})", format_time(open), format_time(close))?
            }
        }
        if self.time_penalty != 0 {
            write!(f, " w/penalty({})", format_duration(self.time_penalty))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::parse_time;

    fn t(s: &str) -> i32 {
        parse_time(s).unwrap()
    }

    #[test]
    fn always_open_passes_time_through() {
        let walk = AccessEgress::walk(1, 60);
        assert_eq!(walk.earliest_departure_time(t("8:00")), Some(t("8:00")));
        assert_eq!(walk.latest_arrival_time(t("8:00")), Some(t("8:00")));
    }

    #[test]
    fn closed_never_departs() {
        let walk = AccessEgress::walk(1, 60).closed();
        assert_eq!(walk.earliest_departure_time(t("8:00")), None);
        assert_eq!(walk.latest_arrival_time(t("8:00")), None);
    }

    #[test]
    fn earliest_departure_waits_for_opening() {
        let flex = AccessEgress::flex(1, 600, 1).with_opening_hours(t("9:00"), t("9:50"));
        assert_eq!(flex.earliest_departure_time(t("8:30")), Some(t("9:00")));
        assert_eq!(flex.earliest_departure_time(t("9:20")), Some(t("9:20")));
        assert_eq!(flex.earliest_departure_time(t("9:50")), Some(t("9:50")));
        // Closed for the rest of the day: next day's window
        assert_eq!(flex.earliest_departure_time(t("9:51")), Some(t("33:00")));
    }

    #[test]
    fn latest_arrival_uses_departure_window() {
        let flex = AccessEgress::flex(1, 600, 1).with_opening_hours(t("9:00"), t("9:50"));
        // Departing 9:50 at the latest means arriving 10:00 at the latest
        assert_eq!(flex.latest_arrival_time(t("10:30")), Some(t("10:00")));
        assert_eq!(flex.latest_arrival_time(t("9:30")), Some(t("9:30")));
        // Before opening: previous day's window
        assert_eq!(flex.latest_arrival_time(t("9:05")), Some(t("-14:00")));
    }

    #[test]
    fn window_past_midnight() {
        let hours = OpeningHours::Daily {
            open: t("23:00"),
            close: t("25:00"),
        };
        assert_eq!(hours.earliest_departure(t("0:30")), Some(t("0:30")));
        assert_eq!(hours.earliest_departure(t("1:30")), Some(t("23:00")));
        assert_eq!(hours.latest_departure(t("22:00")), Some(t("1:00")));
    }

    #[test]
    fn display_forms() {
        assert_eq!(AccessEgress::walk(1, 30).to_string(), "Walk 30s");
        assert_eq!(
            AccessEgress::flex(1, 315, 1).to_string(),
            "Flex 5m15s 1x"
        );
        assert_eq!(
            AccessEgress::flex(1, 600, 2)
                .with_opening_hours(t("9:00"), t("9:50"))
                .to_string(),
            "Flex 10m 2x Open(9:00 9:50)"
        );
        assert_eq!(
            AccessEgress::walk(1, 120).with_time_penalty(60).to_string(),
            "Walk 2m w/penalty(1m)"
        );
    }
}
