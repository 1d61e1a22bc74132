//! Destination heuristics.
//!
//! One min-travel-duration iteration runs from the destination towards the
//! origin, without slack, penalties, opening hours or constraints. What it
//! finds at each stop is a lower bound on the remaining travel time and
//! rides of any journey through that stop, which the main search uses to
//! drop hopeless labels and to size its window.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::StopIndex;
use crate::error::RaptorError;
use crate::request::RaptorRequest;
use crate::transit::TransitDataProvider;

use super::standard::StdState;
use super::worker::{RoutingStrategy, Worker};
use super::{ArrivalArena, CancelToken, SearchContext};

/// Value of a heuristic entry for a stop the heuristic search never reached.
pub const HEURISTIC_UNREACHED: i32 = i32::MAX;

/// Lower bounds from each stop to the destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heuristics {
    min_travel_duration: Vec<i32>,
    min_rides: Vec<i32>,
    origin_min_travel_duration: Option<i32>,
    origin_min_rides: Option<i32>,
}

impl Heuristics {
    /// Shortest remaining travel time from `stop`, egress included.
    pub fn min_travel_duration(&self, stop: StopIndex) -> Option<i32> {
        reached(self.min_travel_duration[stop])
    }

    /// Fewest remaining rides from `stop`, egress rides included.
    pub fn min_rides(&self, stop: StopIndex) -> Option<usize> {
        reached(self.min_rides[stop]).map(|r| r as usize)
    }

    /// The raw per-stop durations; unreached stops hold
    /// [`HEURISTIC_UNREACHED`].
    pub fn min_travel_durations(&self) -> &[i32] {
        &self.min_travel_duration
    }

    pub fn min_rides_per_stop(&self) -> &[i32] {
        &self.min_rides
    }

    /// Whether any access path connects to the destination at all.
    pub fn is_origin_reached(&self) -> bool {
        self.origin_min_travel_duration.is_some()
    }

    /// Shortest travel time from the origin, access included.
    pub fn origin_min_travel_duration(&self) -> Option<i32> {
        self.origin_min_travel_duration
    }

    /// Fewest transfers of any journey from the origin.
    pub fn origin_min_transfers(&self) -> Option<usize> {
        self.origin_min_rides.map(|r| (r as usize).saturating_sub(1))
    }
}

fn reached(value: i32) -> Option<i32> {
    (value != HEURISTIC_UNREACHED).then_some(value)
}

/// Run the heuristic search anchored at `anchor`, the main search's latest
/// arrival (forward) or earliest departure (reverse).
///
/// Returns the arena for reuse by the main search.
///
/// # Errors
///
/// `RaptorError::Aborted` if cancelled.
pub(crate) fn compute_heuristics(
    data: &dyn TransitDataProvider,
    request: &RaptorRequest,
    anchor: i32,
    max_rounds: usize,
    cancel: &CancelToken,
) -> Result<(Heuristics, ArrivalArena), RaptorError> {
    let ctx = SearchContext::heuristic(data, request, anchor, max_rounds, cancel);
    let calc = ctx.calc;
    let state = StdState::new(&ctx, ArrivalArena::new(), true);
    let (state, stats) = Worker::new(&ctx, state).run(&ctx.iteration_times)?;

    let unreached = calc.unreached();
    let min_travel_duration: Vec<i32> = state
        .best_times()
        .iter()
        .map(|&t| {
            if t == unreached {
                HEURISTIC_UNREACHED
            } else {
                calc.duration(anchor, t)
            }
        })
        .collect();
    let min_rides: Vec<i32> = state
        .min_rounds()
        .iter()
        .map(|r| r.map_or(HEURISTIC_UNREACHED, |r| r as i32))
        .collect();

    // The heuristic egress is the main search's access
    let origin_min_travel_duration = ctx
        .egress
        .iter()
        .filter_map(|a| reached(min_travel_duration[a.stop]).map(|d| a.duration + d))
        .min();
    let origin_min_rides = ctx
        .egress
        .iter()
        .filter_map(|a| reached(min_rides[a.stop]).map(|r| a.rides as i32 + r))
        .min();

    debug!(
        anchor,
        rounds = stats.rounds,
        origin_min_travel_duration,
        origin_min_rides,
        "heuristics computed"
    );

    let heuristics = Heuristics {
        min_travel_duration,
        min_rides,
        origin_min_travel_duration,
        origin_min_rides,
    };
    Ok((heuristics, state.into_labels().arena.recycle()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristics() -> Heuristics {
        Heuristics {
            min_travel_duration: vec![600, HEURISTIC_UNREACHED, 0],
            min_rides: vec![1, HEURISTIC_UNREACHED, 0],
            origin_min_travel_duration: Some(660),
            origin_min_rides: Some(2),
        }
    }

    #[test]
    fn unreached_stops_have_no_bound() {
        let h = heuristics();
        assert_eq!(h.min_travel_duration(0), Some(600));
        assert_eq!(h.min_travel_duration(1), None);
        assert_eq!(h.min_rides(0), Some(1));
        assert_eq!(h.min_rides(1), None);
        assert!(h.is_origin_reached());
        assert_eq!(h.origin_min_transfers(), Some(1));
    }

    #[test]
    fn serializes_raw_arrays() {
        let json = serde_json::to_value(heuristics()).unwrap();
        assert_eq!(json["min_travel_duration"][1], HEURISTIC_UNREACHED);
        assert_eq!(json["origin_min_rides"], 2);
    }
}
