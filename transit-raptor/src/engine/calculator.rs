//! Direction-parameterised time arithmetic.
//!
//! The workers are written once, in terms of "search time": a forward search
//! moves forward in time, boards at departures and alights at arrivals; a
//! reverse search moves backwards, boards at arrivals and alights at
//! departures, walks transfers backwards, and swaps board and alight slack.
//! `TransitCalculator` hides every one of those differences.

use crate::domain::time::{UNREACHED_FORWARD, UNREACHED_REVERSE};
use crate::domain::{
    Pattern, SlackProvider, StopIndex, Transfer, TransferConstraint, TripRef, TripSchedule,
};
use crate::request::SearchDirection;
use crate::transit::TransitDataProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TransitCalculator {
    forward: bool,
}

impl TransitCalculator {
    pub fn new(direction: SearchDirection) -> Self {
        Self {
            forward: direction.is_forward(),
        }
    }

    pub fn forward(&self) -> bool {
        self.forward
    }

    /// +1 forward, -1 reverse.
    pub fn sign(&self) -> i32 {
        if self.forward { 1 } else { -1 }
    }

    pub fn plus(&self, time: i32, delta: i32) -> i32 {
        if self.forward { time + delta } else { time - delta }
    }

    pub fn minus(&self, time: i32, delta: i32) -> i32 {
        if self.forward { time - delta } else { time + delta }
    }

    /// Elapsed search time from `start` to `end`.
    pub fn duration(&self, start: i32, end: i32) -> i32 {
        if self.forward { end - start } else { start - end }
    }

    pub fn is_before(&self, a: i32, b: i32) -> bool {
        if self.forward { a < b } else { a > b }
    }

    pub fn is_before_or_equal(&self, a: i32, b: i32) -> bool {
        a == b || self.is_before(a, b)
    }

    pub fn unreached(&self) -> i32 {
        if self.forward {
            UNREACHED_FORWARD
        } else {
            UNREACHED_REVERSE
        }
    }

    /// Whether `time` is past the hard limit in search direction.
    pub fn exceeds_limit(&self, time: i32, limit: i32) -> bool {
        self.is_before(limit, time)
    }

    /// Stop positions of a pattern in search order.
    pub fn positions(&self, len: usize) -> Box<dyn Iterator<Item = usize>> {
        if self.forward {
            Box::new(0..len)
        } else {
            Box::new((0..len).rev())
        }
    }

    pub fn board_time(&self, trip: &TripSchedule, pos: usize) -> i32 {
        if self.forward {
            trip.departure(pos)
        } else {
            trip.arrival(pos)
        }
    }

    pub fn alight_time(&self, trip: &TripSchedule, pos: usize) -> i32 {
        if self.forward {
            trip.arrival(pos)
        } else {
            trip.departure(pos)
        }
    }

    pub fn boarding_possible(&self, pattern: &Pattern, pos: usize) -> bool {
        if self.forward {
            pattern.board_allowed(pos)
        } else {
            pattern.alight_allowed(pos)
        }
    }

    pub fn alighting_possible(&self, pattern: &Pattern, pos: usize) -> bool {
        if self.forward {
            pattern.alight_allowed(pos)
        } else {
            pattern.board_allowed(pos)
        }
    }

    pub fn board_slack(&self, slack: &dyn SlackProvider, pattern: &Pattern) -> i32 {
        if self.forward {
            slack.board_slack(pattern.slack_index())
        } else {
            slack.alight_slack(pattern.slack_index())
        }
    }

    pub fn alight_slack(&self, slack: &dyn SlackProvider, pattern: &Pattern) -> i32 {
        if self.forward {
            slack.alight_slack(pattern.slack_index())
        } else {
            slack.board_slack(pattern.slack_index())
        }
    }

    pub fn transfers<'d>(&self, data: &'d dyn TransitDataProvider, stop: StopIndex) -> &'d [Transfer] {
        if self.forward {
            data.transfers_from(stop)
        } else {
            data.transfers_to(stop)
        }
    }

    /// Constraint between the previously ridden trip (alighted at
    /// `prev_stop`) and the trip about to be boarded, in search order.
    pub fn constraint(
        &self,
        data: &dyn TransitDataProvider,
        prev: TripRef,
        prev_stop: StopIndex,
        next: TripRef,
        next_stop: StopIndex,
    ) -> Option<TransferConstraint> {
        if self.forward {
            data.transfer_constraint(prev, prev_stop, next, next_stop)
        } else {
            data.transfer_constraint(next, next_stop, prev, prev_stop)
        }
    }

    /// Whether trip `a` comes before trip `b` in search order.
    pub fn trip_better(&self, a: usize, b: usize) -> bool {
        if self.forward { a < b } else { a > b }
    }

    /// First trip in search order boardable at `pos` no earlier (in search
    /// time) than `earliest`.
    ///
    /// `bound` is the trip already ridden: only trips strictly better than
    /// it are considered. Relies on trips never overtaking each other.
    pub fn find_trip(
        &self,
        trips: &[TripSchedule],
        pos: usize,
        earliest: i32,
        bound: Option<usize>,
    ) -> Option<usize> {
        if self.forward {
            let end = bound.unwrap_or(trips.len());
            let candidates = &trips[..end];
            let i = candidates.partition_point(|t| t.departure(pos) < earliest);
            (i < end).then_some(i)
        } else {
            let i = trips.partition_point(|t| t.arrival(pos) <= earliest);
            let found = i.checked_sub(1)?;
            match bound {
                Some(b) if found <= b => None,
                _ => Some(found),
            }
        }
    }

    /// Trips of a pattern in search order, starting at `from`.
    pub fn trips_from(&self, count: usize, from: usize) -> Box<dyn Iterator<Item = usize>> {
        if self.forward {
            Box::new(from..count)
        } else {
            Box::new((0..(from + 1).min(count)).rev())
        }
    }
}
