//! The round-based search engine.
//!
//! A search runs in three stages: the heuristics (one reverse min-duration
//! pass used for pruning and for sizing the search window), the range
//! controller (one worker iteration per departure minute of the window),
//! and path assembly at every destination arrival.
//!
//! Everything a worker needs is collected in a `SearchContext`, which is
//! immutable for the search and shared between parallel iterations.

mod access;
mod arrival;
mod calculator;
mod cancel;
mod destination;
mod heuristics;
mod multi_criteria;
pub mod pareto;
mod range;
mod standard;
mod trip_search;
mod worker;

pub use cancel::CancelToken;
pub use heuristics::{HEURISTIC_UNREACHED, Heuristics};
pub use range::SearchStats;

pub(crate) use arrival::{Arrival, ArrivalArena, ArrivalId, ArrivalKind};
pub(crate) use calculator::TransitCalculator;
pub(crate) use heuristics::compute_heuristics;
pub(crate) use range::run_range;

use crate::config::RaptorConfig;
use crate::domain::{
    AccessEgress, CostCalculator, OpeningHours, SlackProvider, StopIndex,
};
use crate::path::PathCriteria;
use crate::request::{
    GroupPriorityCalculator, Profile, RaptorRequest, SearchDirection, ViaLocation,
};
use crate::transit::TransitDataProvider;

/// Slack policy with no slack at all, used by the heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NoSlack;

impl SlackProvider for NoSlack {
    fn transfer_slack(&self) -> i32 {
        0
    }

    fn board_slack(&self, _: usize) -> i32 {
        0
    }

    fn alight_slack(&self, _: usize) -> i32 {
        0
    }
}

static NO_SLACK: NoSlack = NoSlack;

/// Real time bounds and window of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchBounds {
    pub earliest_departure_time: i32,
    pub latest_arrival_time: i32,
    pub search_window: i32,
}

/// Immutable inputs of one search, in search direction.
pub(crate) struct SearchContext<'a> {
    pub data: &'a dyn TransitDataProvider,
    pub request: &'a RaptorRequest,
    pub calc: TransitCalculator,
    pub profile: Profile,
    /// Paths at the search origin (the request's egress in reverse)
    pub access: Vec<AccessEgress>,
    /// Paths at the search destination
    pub egress: Vec<AccessEgress>,
    egress_by_stop: Vec<Vec<usize>>,
    /// Via locations in search order
    pub via: Vec<ViaLocation>,
    pub slack: &'a dyn SlackProvider,
    pub cost: &'a dyn CostCalculator,
    pub groups: Option<&'a dyn GroupPriorityCalculator>,
    /// Hard limit in search direction: latest arrival forward, earliest
    /// departure in reverse
    pub limit: i32,
    pub iteration_times: Vec<i32>,
    /// Maximum rides, access and egress rides included
    pub max_rounds: usize,
    pub use_constraints: bool,
    pub pruning: Option<&'a Heuristics>,
    /// Build paths at destination arrivals
    pub collect_paths: bool,
    /// Check path invariants and panic on violations
    pub strict_paths: bool,
    pub path_criteria: PathCriteria,
    pub chunk_size: usize,
    pub parallel: bool,
    pub cancel: &'a CancelToken,
}

impl<'a> SearchContext<'a> {
    /// Context of the main search.
    #[allow(clippy::too_many_arguments)]
    pub fn main(
        data: &'a dyn TransitDataProvider,
        request: &'a RaptorRequest,
        config: &RaptorConfig,
        bounds: SearchBounds,
        max_rounds: usize,
        heuristics: Option<&'a Heuristics>,
        cancel: &'a CancelToken,
    ) -> Self {
        let direction = request.direction();
        let calc = TransitCalculator::new(direction);
        let (access, egress) = match direction {
            SearchDirection::Forward => (request.access.clone(), request.egress.clone()),
            SearchDirection::Reverse => (request.egress.clone(), request.access.clone()),
        };
        let via: Vec<ViaLocation> = match direction {
            SearchDirection::Forward => request.via.clone(),
            SearchDirection::Reverse => request.via.iter().rev().map(|v| v.reversed()).collect(),
        };
        let limit = match direction {
            SearchDirection::Forward => bounds.latest_arrival_time,
            SearchDirection::Reverse => bounds.earliest_departure_time,
        };
        let pruning = heuristics.filter(|h| {
            request.optimizations.destination_pruning && via.is_empty() && h.is_origin_reached()
        });

        Self {
            data,
            request,
            calc,
            profile: request.profile,
            egress_by_stop: index_by_stop(data.number_of_stops(), &egress),
            access,
            egress,
            via,
            slack: data.slack_provider(),
            cost: data.cost_calculator(),
            groups: request.group_priority.as_deref(),
            limit,
            iteration_times: iteration_times(
                calc,
                bounds,
                config.iteration_step_secs,
                request.optimizations.single_iteration,
            ),
            max_rounds,
            use_constraints: request.profile != Profile::MinTravelDuration,
            pruning,
            collect_paths: true,
            strict_paths: request.profile != Profile::MinTravelDuration,
            path_criteria: PathCriteria::new(request, direction),
            chunk_size: config.iteration_chunk_size.max(1),
            parallel: request.optimizations.parallel || config.parallel_iterations,
            cancel,
        }
    }

    /// Context of the heuristic search: the opposite direction, starting at
    /// `anchor`, with no slack, penalties, opening hours or constraints.
    pub fn heuristic(
        data: &'a dyn TransitDataProvider,
        request: &'a RaptorRequest,
        anchor: i32,
        max_rounds: usize,
        cancel: &'a CancelToken,
    ) -> Self {
        let direction = match request.direction() {
            SearchDirection::Forward => SearchDirection::Reverse,
            SearchDirection::Reverse => SearchDirection::Forward,
        };
        let calc = TransitCalculator::new(direction);
        let relaxed = |paths: &[AccessEgress]| -> Vec<AccessEgress> {
            paths
                .iter()
                .filter(|p| p.opening_hours != OpeningHours::Closed)
                .map(|p| AccessEgress {
                    time_penalty: 0,
                    opening_hours: OpeningHours::Always,
                    ..p.clone()
                })
                .collect()
        };
        // The heuristic origin is the main search's destination
        let (access, egress) = match direction {
            SearchDirection::Forward => (relaxed(&request.access), relaxed(&request.egress)),
            SearchDirection::Reverse => (relaxed(&request.egress), relaxed(&request.access)),
        };

        Self {
            data,
            request,
            calc,
            profile: Profile::MinTravelDuration,
            egress_by_stop: index_by_stop(data.number_of_stops(), &egress),
            access,
            egress,
            via: Vec::new(),
            slack: &NO_SLACK,
            cost: data.cost_calculator(),
            groups: None,
            limit: calc.unreached(),
            iteration_times: vec![anchor],
            max_rounds,
            use_constraints: false,
            pruning: None,
            collect_paths: false,
            strict_paths: false,
            path_criteria: PathCriteria::new(request, direction),
            chunk_size: 1,
            parallel: false,
            cancel,
        }
    }

    pub fn forward(&self) -> bool {
        self.calc.forward()
    }

    /// Egress indexes at `stop`.
    pub fn egress_at(&self, stop: StopIndex) -> &[usize] {
        &self.egress_by_stop[stop]
    }

    /// Largest access ride count that still fits the round budget.
    pub fn max_access_rides(&self) -> usize {
        self.access
            .iter()
            .map(|a| a.rides as usize)
            .filter(|&r| r <= self.max_rounds)
            .max()
            .unwrap_or(0)
    }

    /// Whether a label with the given unpenalised time and round can be
    /// dropped.
    pub fn prune(&self, stop: StopIndex, real_time: i32, round: usize) -> bool {
        if self.calc.exceeds_limit(real_time, self.limit) {
            return true;
        }
        let Some(h) = self.pruning else {
            return false;
        };
        let (Some(duration), Some(rides)) = (h.min_travel_duration(stop), h.min_rides(stop)) else {
            return true;
        };
        self.calc
            .exceeds_limit(self.calc.plus(real_time, duration), self.limit)
            || round + rides > self.max_rounds
    }
}

fn index_by_stop(stop_count: usize, paths: &[AccessEgress]) -> Vec<Vec<usize>> {
    let mut index = vec![Vec::new(); stop_count];
    for (i, path) in paths.iter().enumerate() {
        index[path.stop].push(i);
    }
    index
}

/// Iteration start times, in the order the range controller runs them:
/// latest departure first forward, earliest arrival first in reverse.
fn iteration_times(
    calc: TransitCalculator,
    bounds: SearchBounds,
    step: i32,
    single_iteration: bool,
) -> Vec<i32> {
    let step = step.max(1);
    let n = if single_iteration {
        1
    } else {
        ((bounds.search_window + step - 1) / step).max(1)
    };
    if calc.forward() {
        let edt = bounds.earliest_departure_time;
        (0..n).rev().map(|i| edt + i * step).collect()
    } else {
        let lat = bounds.latest_arrival_time;
        (0..n).rev().map(|i| lat - i * step).collect()
    }
}
