//! Path comparison, reduction and ranking.
//!
//! The destination criteria depend on the request: arrival time (counting
//! penalties) and transfers always, departure time for the timetable view,
//! and duration plus generalized cost for multi-criteria searches. The
//! min-travel-duration profile ranks by duration instead of arrival.

use std::cmp::Reverse;

use crate::engine::pareto::ParetoSet;
use crate::request::{Profile, RaptorRequest, RelaxFunction, SearchDirection};

use super::Path;

/// Dominance test between destination paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PathCriteria {
    forward: bool,
    multi_criteria: bool,
    min_travel_duration: bool,
    timetable: bool,
    relax_c1: RelaxFunction,
    group_relax: Option<RelaxFunction>,
}

impl PathCriteria {
    pub fn new(request: &RaptorRequest, direction: SearchDirection) -> Self {
        Self {
            forward: direction.is_forward(),
            multi_criteria: request.profile.is_multi_criteria(),
            min_travel_duration: request.profile == Profile::MinTravelDuration,
            timetable: request.timetable,
            relax_c1: request.relax_c1.unwrap_or_default(),
            group_relax: request.group_priority.as_ref().map(|g| g.relax_c1()),
        }
    }

    /// Whether `l` is strictly better than `r` in at least one criterion.
    pub fn left_dominance(&self, l: &Path, r: &Path) -> bool {
        if self.min_travel_duration {
            return l.duration_with_penalty() < r.duration_with_penalty()
                || l.number_of_transfers < r.number_of_transfers;
        }
        let time = if self.forward {
            l.arrival_with_penalty() < r.arrival_with_penalty()
        } else {
            l.departure_with_penalty() > r.departure_with_penalty()
        };
        if time {
            return true;
        }
        if self.timetable {
            let other_end = if self.forward {
                l.start_time > r.start_time
            } else {
                l.end_time < r.end_time
            };
            if other_end {
                return true;
            }
        }
        if l.number_of_transfers < r.number_of_transfers {
            return true;
        }
        if !self.multi_criteria {
            return false;
        }
        if l.duration_with_penalty() < r.duration_with_penalty() {
            return true;
        }
        match self.group_relax {
            Some(relax) if l.groups != r.groups => l.c1 < relax.relax(r.c1),
            _ => l.c1 < self.relax_c1.relax(r.c1),
        }
    }

    /// Whether dominance is a strict partial order, so that equal paths
    /// can be filtered early without losing any result.
    pub fn is_transitive(&self) -> bool {
        self.relax_c1.is_normal() && self.group_relax.is_none()
    }
}

fn sort_key(path: &Path) -> (i32, Reverse<i32>, usize, i32, String) {
    (
        path.end_time,
        Reverse(path.start_time),
        path.number_of_transfers,
        path.c1,
        path.to_string(),
    )
}

/// Sort paths best first: arrival, later departure, transfers, cost, then
/// the rendered form so the order is total.
pub fn rank_paths(mut paths: Vec<Path>) -> Vec<Path> {
    paths.sort_by_cached_key(sort_key);
    paths
}

/// Reduce candidates from any number of iterations to one pareto set.
///
/// Candidates are inserted in ranking order, so the result does not depend
/// on the order they were found in. Of several paths equal in every
/// criterion only the first in ranking order is kept.
pub(crate) fn reduce_paths(candidates: Vec<Path>, criteria: &PathCriteria) -> Vec<Path> {
    let cmp = |l: &Path, r: &Path| criteria.left_dominance(l, r);
    let mut set = ParetoSet::new();
    for path in rank_paths(candidates) {
        set.add(path, &cmp);
    }
    rank_paths(set.into_vec())
}
