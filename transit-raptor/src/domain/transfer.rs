//! Transfers between stops and constraints between trips.
//!
//! A `Transfer` is a street connection (usually a walk) between two stops.
//! A `ConstrainedTransfer` overrides the normal connection rules between two
//! specific trips at two specific stops.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::cost::{DEFAULT_WALK_RELUCTANCE, cost_from_secs_f64};
use super::{StopIndex, TripRef};

/// A street connection to another stop.
///
/// In the forward transfer lists `stop` is the destination of the walk;
/// in the reverse lists it is the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// The stop at the other end of the transfer
    pub stop: StopIndex,
    /// Walking time in seconds
    pub duration: i32,
    /// Generalized cost in centi-seconds
    pub c1: i32,
}

impl Transfer {
    /// A walk costed with the default walk reluctance.
    pub fn walk(stop: StopIndex, duration: i32) -> Self {
        Self {
            stop,
            duration,
            c1: cost_from_secs_f64(f64::from(duration) * DEFAULT_WALK_RELUCTANCE),
        }
    }

    /// A transfer with an explicit cost, in seconds.
    pub fn with_cost(stop: StopIndex, duration: i32, c1_secs: i32) -> Self {
        Self {
            stop,
            duration,
            c1: c1_secs * 100,
        }
    }
}

/// A rule overriding the regular connection between two trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferConstraint {
    /// Boarding the target trip from the source trip is forbidden
    NotAllowed,
    /// The vehicle continues as the target trip; no slack, no real change
    StaySeated,
    /// The target trip waits for the source trip; slack is waived
    Guaranteed,
    /// Replaces the slack with an explicit minimum wait, in seconds
    MinTransferTime(i32),
}

impl TransferConstraint {
    /// Whether a boarding under this constraint is possible at all.
    pub fn allows_boarding(self) -> bool {
        !matches!(self, TransferConstraint::NotAllowed)
    }

    /// Whether board, alight and transfer slack are ignored.
    pub fn ignores_slack(self) -> bool {
        matches!(
            self,
            TransferConstraint::StaySeated
                | TransferConstraint::Guaranteed
                | TransferConstraint::MinTransferTime(_)
        )
    }

    pub fn is_stay_seated(self) -> bool {
        matches!(self, TransferConstraint::StaySeated)
    }
}

impl fmt::Display for TransferConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferConstraint::NotAllowed => f.write_str("not-allowed"),
            TransferConstraint::StaySeated => f.write_str("stay-seated"),
            TransferConstraint::Guaranteed => f.write_str("guaranteed"),
            TransferConstraint::MinTransferTime(secs) => {
                write!(f, "min-transfer-time({})", super::time::format_duration(*secs))
            }
        }
    }
}

/// A constraint between `from_trip` at `from_stop` and `to_trip` at `to_stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstrainedTransfer {
    pub from_trip: TripRef,
    pub from_stop: StopIndex,
    pub to_trip: TripRef,
    pub to_stop: StopIndex,
    pub constraint: TransferConstraint,
}

impl ConstrainedTransfer {
    /// Constraint between two trips at the same stop.
    pub fn at_stop(
        from_trip: TripRef,
        to_trip: TripRef,
        stop: StopIndex,
        constraint: TransferConstraint,
    ) -> Self {
        Self {
            from_trip,
            from_stop: stop,
            to_trip,
            to_stop: stop,
            constraint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_cost_uses_default_reluctance() {
        let t = Transfer::walk(4, 90);
        assert_eq!(t.stop, 4);
        assert_eq!(t.c1, 18_000);
        assert_eq!(Transfer::with_cost(1, 60, 10).c1, 1000);
    }

    #[test]
    fn constraint_flags() {
        assert!(!TransferConstraint::NotAllowed.allows_boarding());
        assert!(TransferConstraint::Guaranteed.allows_boarding());
        assert!(TransferConstraint::StaySeated.ignores_slack());
        assert!(TransferConstraint::MinTransferTime(90).ignores_slack());
        assert!(!TransferConstraint::NotAllowed.ignores_slack());
        assert!(TransferConstraint::StaySeated.is_stay_seated());
    }

    #[test]
    fn constraint_display() {
        assert_eq!(TransferConstraint::StaySeated.to_string(), "stay-seated");
        assert_eq!(
            TransferConstraint::MinTransferTime(150).to_string(),
            "min-transfer-time(2m30s)"
        );
    }
}
