//! Itineraries.
//!
//! A `Path` is one journey found by a search, in real (forward) time order
//! whichever direction the search ran: an access leg, then transit legs
//! separated by at most one transfer each, then an egress leg.

mod builder;
mod rank;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::cost::format_cost;
use crate::domain::time::{format_duration, format_time};
use crate::domain::{AccessEgress, StopIndex, TransferConstraint, TransitMode, TripRef};

pub(crate) use builder::PathBuilder;
pub(crate) use rank::{PathCriteria, reduce_paths};
pub use rank::rank_paths;

/// Access or egress part of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessEgressLeg {
    pub path: AccessEgress,
    pub from_time: i32,
    pub to_time: i32,
    pub c1: i32,
}

/// A ride on one trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitLeg {
    pub trip: TripRef,
    pub route: String,
    pub mode: TransitMode,
    pub board_stop: StopIndex,
    pub alight_stop: StopIndex,
    pub board_pos: usize,
    pub alight_pos: usize,
    pub from_time: i32,
    pub to_time: i32,
    pub c1: i32,
    /// Constraint used to board the next transit leg from this one
    pub constraint: Option<TransferConstraint>,
}

/// A walk between two stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferLeg {
    pub from_stop: StopIndex,
    pub to_stop: StopIndex,
    pub from_time: i32,
    pub to_time: i32,
    pub c1: i32,
}

/// One leg of a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PathLeg {
    Access(AccessEgressLeg),
    Transit(TransitLeg),
    Transfer(TransferLeg),
    Egress(AccessEgressLeg),
}

impl PathLeg {
    pub fn from_time(&self) -> i32 {
        match self {
            PathLeg::Access(leg) | PathLeg::Egress(leg) => leg.from_time,
            PathLeg::Transit(leg) => leg.from_time,
            PathLeg::Transfer(leg) => leg.from_time,
        }
    }

    pub fn to_time(&self) -> i32 {
        match self {
            PathLeg::Access(leg) | PathLeg::Egress(leg) => leg.to_time,
            PathLeg::Transit(leg) => leg.to_time,
            PathLeg::Transfer(leg) => leg.to_time,
        }
    }

    pub fn duration(&self) -> i32 {
        self.to_time() - self.from_time()
    }

    pub fn c1(&self) -> i32 {
        match self {
            PathLeg::Access(leg) | PathLeg::Egress(leg) => leg.c1,
            PathLeg::Transit(leg) => leg.c1,
            PathLeg::Transfer(leg) => leg.c1,
        }
    }

    /// The stop this leg ends at; `None` for the egress.
    pub fn to_stop(&self) -> Option<StopIndex> {
        match self {
            PathLeg::Access(leg) => Some(leg.path.stop),
            PathLeg::Transit(leg) => Some(leg.alight_stop),
            PathLeg::Transfer(leg) => Some(leg.to_stop),
            PathLeg::Egress(_) => None,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, PathLeg::Transit(_))
    }

    pub fn as_transit(&self) -> Option<&TransitLeg> {
        match self {
            PathLeg::Transit(leg) => Some(leg),
            _ => None,
        }
    }

    fn render(&self) -> String {
        match self {
            PathLeg::Access(leg) | PathLeg::Egress(leg) => leg.path.to_string(),
            PathLeg::Transit(leg) => format!(
                "{} {} {} {}",
                leg.mode,
                leg.route,
                format_time(leg.from_time),
                format_time(leg.to_time)
            ),
            PathLeg::Transfer(leg) => format!("Walk {}", format_duration(leg.to_time - leg.from_time)),
        }
    }
}

/// A journey from origin to destination.
///
/// # Invariants
///
/// - The first leg is an access, the last an egress
/// - Leg times never decrease
/// - `c1` is the sum of the leg costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// Start time of the range iteration that found the path
    pub iteration_departure_time: i32,
    pub start_time: i32,
    pub end_time: i32,
    pub legs: Vec<PathLeg>,
    pub c1: i32,
    pub number_of_transfers: usize,
    /// Access plus egress time penalty
    pub time_penalty: i32,
    /// Merged priority-group code of the transit legs, 0 without groups
    pub groups: u32,
}

impl Path {
    pub fn duration(&self) -> i32 {
        self.end_time - self.start_time
    }

    /// Arrival time counting the time penalty, used for ranking.
    pub fn arrival_with_penalty(&self) -> i32 {
        self.end_time + self.time_penalty
    }

    /// Departure time counting the time penalty, used for ranking
    /// arrive-by searches.
    pub fn departure_with_penalty(&self) -> i32 {
        self.start_time - self.time_penalty
    }

    pub fn duration_with_penalty(&self) -> i32 {
        self.duration() + self.time_penalty
    }

    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitLeg> {
        self.legs.iter().filter_map(PathLeg::as_transit)
    }

    pub fn access(&self) -> Option<&AccessEgressLeg> {
        match self.legs.first() {
            Some(PathLeg::Access(leg)) => Some(leg),
            _ => None,
        }
    }

    pub fn egress(&self) -> Option<&AccessEgressLeg> {
        match self.legs.last() {
            Some(PathLeg::Egress(leg)) => Some(leg),
            _ => None,
        }
    }

    /// Render the path with stop names from `stop_name`.
    ///
    /// ```text
    /// Walk 30s ~ A ~ BUS R1 0:02 0:20 ~ C ~ Walk 30s [0:01:30 0:20:30 19m Tₓ0 C₁2_220]
    /// ```
    pub fn to_string_with<F>(&self, stop_name: F) -> String
    where
        F: Fn(StopIndex) -> String,
    {
        let mut out = String::new();
        for leg in &self.legs {
            out.push_str(&leg.render());
            if let Some(stop) = leg.to_stop() {
                out.push_str(" ~ ");
                out.push_str(&stop_name(stop));
                out.push_str(" ~ ");
            }
        }
        out.push_str(&format!(
            " [{} {} {} Tₓ{} C₁{}",
            format_time(self.start_time),
            format_time(self.end_time),
            format_duration(self.duration()),
            self.number_of_transfers,
            format_cost(self.c1)
        ));
        if self.groups != 0 {
            out.push_str(&format!(" C₂{}", self.groups));
        }
        out.push(']');
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with(|stop| stop.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_bus_walk() -> Path {
        let access = AccessEgress::walk(0, 30);
        let egress = AccessEgress::walk(2, 30);
        Path {
            iteration_departure_time: 60,
            start_time: 90,
            end_time: 1230,
            legs: vec![
                PathLeg::Access(AccessEgressLeg {
                    c1: access.c1,
                    path: access,
                    from_time: 90,
                    to_time: 120,
                }),
                PathLeg::Transit(TransitLeg {
                    trip: TripRef::new(0, 0),
                    route: "R1".to_string(),
                    mode: TransitMode::Bus,
                    board_stop: 0,
                    alight_stop: 1,
                    board_pos: 0,
                    alight_pos: 1,
                    from_time: 120,
                    to_time: 600,
                    c1: 108_000,
                    constraint: None,
                }),
                PathLeg::Transfer(TransferLeg {
                    from_stop: 1,
                    to_stop: 2,
                    from_time: 600,
                    to_time: 1200,
                    c1: 120_000,
                }),
                PathLeg::Egress(AccessEgressLeg {
                    c1: egress.c1,
                    path: egress,
                    from_time: 1200,
                    to_time: 1230,
                }),
            ],
            c1: 240_000,
            number_of_transfers: 0,
            time_penalty: 0,
            groups: 0,
        }
    }

    #[test]
    fn render_with_names() {
        let path = walk_bus_walk();
        let names = ["A", "B", "C"];
        assert_eq!(
            path.to_string_with(|s| names[s].to_string()),
            "Walk 30s ~ A ~ BUS R1 0:02 0:10 ~ B ~ Walk 10m ~ C ~ Walk 30s \
             [0:01:30 0:20:30 19m Tₓ0 C₁2_400]"
        );
    }

    #[test]
    fn render_falls_back_to_index() {
        let mut path = walk_bus_walk();
        path.groups = 6;
        let rendered = path.to_string();
        assert!(rendered.starts_with("Walk 30s ~ 0 ~ BUS R1"), "{rendered}");
        assert!(rendered.ends_with("C₁2_400 C₂6]"), "{rendered}");
    }

    #[test]
    fn leg_accessors() {
        let path = walk_bus_walk();
        assert_eq!(path.duration(), 1140);
        assert_eq!(path.transit_legs().count(), 1);
        assert_eq!(path.access().map(|a| a.path.stop), Some(0));
        assert_eq!(path.egress().map(|e| e.path.stop), Some(2));
        assert_eq!(path.legs[2].duration(), 600);
        assert_eq!(path.legs[3].to_stop(), None);
        assert_eq!(path.legs.iter().map(PathLeg::c1).sum::<i32>(), path.c1);
    }

    #[test]
    fn penalty_counts_for_ranking_only() {
        let mut path = walk_bus_walk();
        path.time_penalty = 120;
        assert_eq!(path.arrival_with_penalty(), 1350);
        assert_eq!(path.departure_with_penalty(), -30);
        assert_eq!(path.duration_with_penalty(), 1260);
        assert_eq!(path.duration(), 1140);
    }

    #[test]
    fn serializes_to_json() {
        let json = serde_json::to_string(&walk_bus_walk()).unwrap();
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, walk_bus_walk());
    }
}
