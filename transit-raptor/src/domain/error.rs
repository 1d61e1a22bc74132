//! Transit data errors.
//!
//! These errors are raised while loading a network into memory. A network
//! that loads successfully is guaranteed to satisfy the ordering and
//! reference invariants the router relies on, so none of these conditions
//! can surface in the middle of a search.

use super::TripRef;

/// Errors for malformed transit data, detected at load time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// A pattern must visit at least two stops
    #[error("pattern {0} must have at least two stops")]
    PatternTooShort(String),

    /// A stop index is outside the network
    #[error("stop {stop} is outside the network ({count} stops)")]
    UnknownStop { stop: usize, count: usize },

    /// A trip has a different number of stop times than its pattern has stops
    #[error("trip {trip} of pattern {pattern} has {found} stop times, expected {expected}")]
    TripLength {
        pattern: String,
        trip: usize,
        found: usize,
        expected: usize,
    },

    /// A trip's times go backwards along the pattern
    #[error("trip {trip} of pattern {pattern}: times decrease at position {position}")]
    TripTimesDecrease {
        pattern: String,
        trip: usize,
        position: usize,
    },

    /// Trips are not sorted, or overtake each other further down the pattern
    #[error("trips {trip} and {next} of pattern {pattern} are out of order at position {position}")]
    TripsOutOfOrder {
        pattern: String,
        trip: usize,
        next: usize,
        position: usize,
    },

    /// A duration was negative
    #[error("negative duration: {0}s")]
    NegativeDuration(i32),

    /// A constrained transfer references a trip that is not loaded
    #[error("constrained transfer references unknown trip {0}")]
    UnknownTrip(TripRef),

    /// A constrained transfer references a stop its trip does not serve
    #[error("constrained transfer: stop {stop} is not served by trip {trip}")]
    StopNotOnTrip { trip: TripRef, stop: usize },

    /// Two constraints were given for the same trip/stop tuple
    #[error("duplicate constraint from {from} at stop {from_stop} to {to} at stop {to_stop}")]
    DuplicateConstraint {
        from: TripRef,
        from_stop: usize,
        to: TripRef,
        to_stop: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DataError::PatternTooShort("R1".into());
        assert_eq!(err.to_string(), "pattern R1 must have at least two stops");

        let err = DataError::UnknownStop { stop: 9, count: 4 };
        assert_eq!(err.to_string(), "stop 9 is outside the network (4 stops)");

        let err = DataError::UnknownTrip(TripRef::new(2, 7));
        assert_eq!(
            err.to_string(),
            "constrained transfer references unknown trip pattern 2 trip 7"
        );

        let err = DataError::NegativeDuration(-5);
        assert_eq!(err.to_string(), "negative duration: -5s");
    }
}
