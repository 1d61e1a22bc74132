//! Search requests.
//!
//! A `RaptorRequest` is an immutable description of one search: the time
//! window, the access and egress paths, the profile and the optional via,
//! priority-group and relaxation settings. Build one with
//! [`RaptorRequest::builder`]; the service validates it against the network
//! before searching.

mod relax;
mod via;

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use serde::{Deserialize, Serialize};

pub use relax::{GroupPriorityCalculator, ModeGroupPriority, RelaxFunction};
pub use via::{ViaKind, ViaLocation, ViaTransfer};

use crate::domain::time::duration_secs;
use crate::domain::{AccessEgress, Pattern, StopIndex, TransitMode};
use crate::error::RequestError;

/// Which worker strategy a search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Profile {
    /// Best arrival time per stop and round
    #[default]
    Standard,
    /// Pareto bags over time, rounds, cost and the optional C2 criteria
    MultiCriteria,
    /// Shortest time in motion, ignoring waits; used by the heuristics
    MinTravelDuration,
}

impl Profile {
    pub fn is_multi_criteria(self) -> bool {
        self == Profile::MultiCriteria
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Profile::Standard => "STANDARD",
            Profile::MultiCriteria => "MULTI_CRITERIA",
            Profile::MinTravelDuration => "MIN_TRAVEL_DURATION",
        };
        f.write_str(s)
    }
}

/// Search direction in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchDirection {
    /// Depart after the earliest departure time
    Forward,
    /// Arrive before the latest arrival time
    Reverse,
}

impl SearchDirection {
    pub fn is_forward(self) -> bool {
        self == SearchDirection::Forward
    }
}

/// Optional behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Optimizations {
    /// Run one worker iteration at the window start instead of a range
    pub single_iteration: bool,
    /// Compute heuristics and prune labels that cannot reach the destination
    pub destination_pruning: bool,
    /// Run range iterations in parallel
    pub parallel: bool,
}

/// One search.
#[derive(Debug, Clone, Default)]
pub struct RaptorRequest {
    /// Earliest departure time, seconds
    pub earliest_departure_time: Option<i32>,
    /// Latest arrival time, seconds
    pub latest_arrival_time: Option<i32>,
    /// Width of the departure (or arrival) window, seconds
    pub search_window: Option<i32>,
    pub profile: Profile,
    pub access: Vec<AccessEgress>,
    pub egress: Vec<AccessEgress>,
    pub optimizations: Optimizations,
    pub via: Vec<ViaLocation>,
    pub group_priority: Option<Arc<dyn GroupPriorityCalculator>>,
    /// Relaxation of the cost criterion when comparing destination paths
    pub relax_c1: Option<RelaxFunction>,
    /// Also compare destination paths on departure time
    pub timetable: bool,
    /// Return the heuristic arrays with the response
    pub include_heuristics: bool,
    /// Overrides the configured transfer limit
    pub max_transfers: Option<usize>,
    /// Only ride these modes; all modes when `None`
    pub allowed_modes: Option<Vec<TransitMode>>,
    /// Only board and alight at wheelchair-accessible positions
    pub wheelchair_accessible: bool,
}

impl RaptorRequest {
    pub fn builder() -> RaptorRequestBuilder {
        RaptorRequestBuilder::default()
    }

    /// Forward when an earliest departure time is given, reverse otherwise.
    pub fn direction(&self) -> SearchDirection {
        if self.earliest_departure_time.is_some() {
            SearchDirection::Forward
        } else {
            SearchDirection::Reverse
        }
    }

    pub fn has_via(&self) -> bool {
        !self.via.is_empty()
    }

    /// Whether `pattern` may be ridden at all.
    pub fn allows_pattern(&self, pattern: &Pattern) -> bool {
        self.allowed_modes
            .as_ref()
            .is_none_or(|modes| modes.contains(&pattern.mode()))
    }

    /// Validate the request against a network with `stop_count` stops.
    ///
    /// # Errors
    ///
    /// Returns the first problem found; see [`RequestError`].
    pub fn validate(&self, stop_count: usize) -> Result<(), RequestError> {
        if self.earliest_departure_time.is_none() && self.latest_arrival_time.is_none() {
            return Err(RequestError::MissingTime);
        }
        if let (Some(edt), Some(lat)) = (self.earliest_departure_time, self.latest_arrival_time) {
            if lat < edt {
                return Err(RequestError::InvertedTimeWindow);
            }
        }
        if let Some(window) = self.search_window {
            if window < 0 {
                return Err(RequestError::NegativeDuration(window));
            }
        }
        if self.access.is_empty() {
            return Err(RequestError::NoAccess);
        }
        if self.egress.is_empty() {
            return Err(RequestError::NoEgress);
        }
        if !self.profile.is_multi_criteria() {
            if self.has_via() {
                return Err(RequestError::RequiresMultiCriteria("via search"));
            }
            if self.group_priority.is_some() {
                return Err(RequestError::RequiresMultiCriteria("transit priority groups"));
            }
        }

        let check_stop = |stop: StopIndex| {
            if stop >= stop_count {
                Err(RequestError::UnknownStop {
                    stop,
                    count: stop_count,
                })
            } else {
                Ok(())
            }
        };
        for path in self.access.iter().chain(&self.egress) {
            check_stop(path.stop)?;
            if path.duration < 0 {
                return Err(RequestError::NegativeDuration(path.duration));
            }
            if path.time_penalty < 0 {
                return Err(RequestError::NegativeDuration(path.time_penalty));
            }
        }
        for (i, via) in self.via.iter().enumerate() {
            if via.is_empty() {
                return Err(RequestError::EmptyVia(i));
            }
            for &stop in via.stops() {
                check_stop(stop)?;
            }
            for t in via.transfers() {
                check_stop(t.from_stop)?;
                check_stop(t.to_stop)?;
                if t.duration < 0 {
                    return Err(RequestError::NegativeDuration(t.duration));
                }
            }
            if via.minimum_wait < 0 {
                return Err(RequestError::NegativeDuration(via.minimum_wait));
            }
        }

        let relax_functions = self
            .relax_c1
            .iter()
            .copied()
            .chain(self.group_priority.as_ref().map(|g| g.relax_c1()));
        for relax in relax_functions {
            if relax.ratio < 1.0 {
                return Err(RequestError::RelaxRatio(relax.ratio));
            }
        }
        Ok(())
    }
}

/// Builder for [`RaptorRequest`].
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use transit_raptor::domain::AccessEgress;
/// use transit_raptor::request::{Profile, RaptorRequest, SearchDirection};
///
/// let request = RaptorRequest::builder()
///     .earliest_departure_time(8 * 3600)
///     .search_window(Duration::minutes(30))
///     .profile(Profile::MultiCriteria)
///     .access(AccessEgress::walk(0, 120))
///     .egress(AccessEgress::walk(3, 60))
///     .build();
///
/// assert_eq!(request.direction(), SearchDirection::Forward);
/// assert_eq!(request.search_window, Some(1_800));
/// assert!(request.validate(4).is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RaptorRequestBuilder {
    request: RaptorRequest,
}

impl RaptorRequestBuilder {
    pub fn earliest_departure_time(mut self, time: i32) -> Self {
        self.request.earliest_departure_time = Some(time);
        self
    }

    pub fn latest_arrival_time(mut self, time: i32) -> Self {
        self.request.latest_arrival_time = Some(time);
        self
    }

    pub fn search_window(mut self, window: Duration) -> Self {
        self.request.search_window = Some(duration_secs(window));
        self
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.request.profile = profile;
        self
    }

    pub fn access(mut self, path: AccessEgress) -> Self {
        self.request.access.push(path);
        self
    }

    pub fn egress(mut self, path: AccessEgress) -> Self {
        self.request.egress.push(path);
        self
    }

    pub fn single_iteration(mut self) -> Self {
        self.request.optimizations.single_iteration = true;
        self
    }

    pub fn destination_pruning(mut self) -> Self {
        self.request.optimizations.destination_pruning = true;
        self
    }

    pub fn parallel(mut self) -> Self {
        self.request.optimizations.parallel = true;
        self
    }

    /// Add the next via location; order matters.
    pub fn via(mut self, location: ViaLocation) -> Self {
        self.request.via.push(location);
        self
    }

    pub fn group_priority(mut self, calculator: impl GroupPriorityCalculator + 'static) -> Self {
        self.request.group_priority = Some(Arc::new(calculator));
        self
    }

    pub fn relax_c1(mut self, relax: RelaxFunction) -> Self {
        self.request.relax_c1 = Some(relax);
        self
    }

    pub fn timetable(mut self) -> Self {
        self.request.timetable = true;
        self
    }

    pub fn include_heuristics(mut self) -> Self {
        self.request.include_heuristics = true;
        self
    }

    pub fn max_transfers(mut self, transfers: usize) -> Self {
        self.request.max_transfers = Some(transfers);
        self
    }

    pub fn allowed_modes(mut self, modes: &[TransitMode]) -> Self {
        self.request.allowed_modes = Some(modes.to_vec());
        self
    }

    pub fn wheelchair_accessible(mut self) -> Self {
        self.request.wheelchair_accessible = true;
        self
    }

    pub fn build(self) -> RaptorRequest {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RaptorRequestBuilder {
        RaptorRequest::builder()
            .earliest_departure_time(0)
            .access(AccessEgress::walk(0, 60))
            .egress(AccessEgress::walk(2, 60))
    }

    #[test]
    fn valid_request() {
        assert_eq!(base().build().validate(3), Ok(()));
    }

    #[test]
    fn direction_follows_given_time() {
        assert_eq!(base().build().direction(), SearchDirection::Forward);
        let reverse = RaptorRequest::builder().latest_arrival_time(3600).build();
        assert_eq!(reverse.direction(), SearchDirection::Reverse);
    }

    #[test]
    fn missing_parts_rejected() {
        let no_time = RaptorRequest::builder()
            .access(AccessEgress::walk(0, 60))
            .egress(AccessEgress::walk(2, 60))
            .build();
        assert_eq!(no_time.validate(3), Err(RequestError::MissingTime));

        let no_egress = RaptorRequest::builder()
            .earliest_departure_time(0)
            .access(AccessEgress::walk(0, 60))
            .build();
        assert_eq!(no_egress.validate(3), Err(RequestError::NoEgress));

        let no_access = RaptorRequest::builder().earliest_departure_time(0).build();
        assert_eq!(no_access.validate(3), Err(RequestError::NoAccess));
    }

    #[test]
    fn via_requires_multi_criteria() {
        let request = base().via(ViaLocation::visit("B", &[1])).build();
        assert_eq!(
            request.validate(3),
            Err(RequestError::RequiresMultiCriteria("via search"))
        );
        let request = base()
            .profile(Profile::MultiCriteria)
            .via(ViaLocation::visit("B", &[1]))
            .build();
        assert_eq!(request.validate(3), Ok(()));
    }

    #[test]
    fn groups_require_multi_criteria() {
        let request = base()
            .group_priority(ModeGroupPriority::new(RelaxFunction::NORMAL))
            .build();
        assert!(matches!(
            request.validate(3),
            Err(RequestError::RequiresMultiCriteria(_))
        ));
    }

    #[test]
    fn stops_checked_against_network() {
        let request = base().egress(AccessEgress::walk(9, 10)).build();
        assert_eq!(
            request.validate(3),
            Err(RequestError::UnknownStop { stop: 9, count: 3 })
        );
    }

    #[test]
    fn empty_via_and_bad_relax_rejected() {
        let request = base()
            .profile(Profile::MultiCriteria)
            .via(ViaLocation::visit("nowhere", &[]))
            .build();
        assert_eq!(request.validate(3), Err(RequestError::EmptyVia(0)));

        let request = base().relax_c1(RelaxFunction::new(0.9, 0)).build();
        assert_eq!(request.validate(3), Err(RequestError::RelaxRatio(0.9)));
    }

    #[test]
    fn inverted_window_rejected() {
        let request = base().latest_arrival_time(-60).build();
        assert_eq!(request.validate(3), Err(RequestError::InvertedTimeWindow));
    }

    #[test]
    fn mode_filter() {
        let request = base().allowed_modes(&[TransitMode::Rail]).build();
        let rail = Pattern::with_stops("L", TransitMode::Rail, &[0, 1]).unwrap();
        let bus = Pattern::with_stops("B", TransitMode::Bus, &[0, 1]).unwrap();
        assert!(request.allows_pattern(&rail));
        assert!(!request.allows_pattern(&bus));
        assert!(base().build().allows_pattern(&bus));
    }
}
