//! Trip schedules.
//!
//! A `TripSchedule` is one vehicle run over a pattern: an arrival and a
//! departure time for every stop position. `TripRef` names a trip by its
//! pattern and its position in that pattern's sorted trip list.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DataError, PatternIndex};

/// Reference to a trip: pattern index plus index into the pattern's trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TripRef {
    pub pattern: PatternIndex,
    pub trip: usize,
}

impl TripRef {
    pub fn new(pattern: PatternIndex, trip: usize) -> Self {
        Self { pattern, trip }
    }
}

impl fmt::Display for TripRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pattern {} trip {}", self.pattern, self.trip)
    }
}

/// Scheduled times of one trip, one entry per stop position.
///
/// # Invariants
///
/// - `arrivals.len() == departures.len()`
/// - `departure(i) >= arrival(i)`
/// - `arrival(i + 1) >= departure(i)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripSchedule {
    arrivals: Vec<i32>,
    departures: Vec<i32>,
}

impl TripSchedule {
    /// Create a trip from per-position arrival and departure times.
    ///
    /// The pattern name and trip number are only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns `DataError::TripLength` when the two lists differ in length,
    /// and `DataError::TripTimesDecrease` when time runs backwards.
    pub fn new(arrivals: Vec<i32>, departures: Vec<i32>) -> Result<Self, DataError> {
        if arrivals.len() != departures.len() {
            return Err(DataError::TripLength {
                pattern: String::new(),
                trip: 0,
                found: departures.len(),
                expected: arrivals.len(),
            });
        }
        for pos in 0..arrivals.len() {
            let dwell_ok = departures[pos] >= arrivals[pos];
            let run_ok = pos == 0 || arrivals[pos] >= departures[pos - 1];
            if !dwell_ok || !run_ok {
                return Err(DataError::TripTimesDecrease {
                    pattern: String::new(),
                    trip: 0,
                    position: pos,
                });
            }
        }
        Ok(Self {
            arrivals,
            departures,
        })
    }

    /// Create a trip with no dwell: arrival equals departure at every stop.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_raptor::domain::TripSchedule;
    ///
    /// let trip = TripSchedule::from_times(vec![120, 600, 1200]).unwrap();
    /// assert_eq!(trip.departure(0), 120);
    /// assert_eq!(trip.arrival(2), 1200);
    /// assert!(TripSchedule::from_times(vec![600, 120]).is_err());
    /// ```
    pub fn from_times(times: Vec<i32>) -> Result<Self, DataError> {
        Self::new(times.clone(), times)
    }

    /// Number of stop positions.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn arrival(&self, pos: usize) -> i32 {
        self.arrivals[pos]
    }

    pub fn departure(&self, pos: usize) -> i32 {
        self.departures[pos]
    }

    /// Departure from the first stop, which defines the trip order.
    pub fn first_departure(&self) -> i32 {
        self.departures[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dwell_times_kept() {
        let trip = TripSchedule::new(vec![100, 200, 300], vec![100, 230, 300]).unwrap();
        assert_eq!(trip.arrival(1), 200);
        assert_eq!(trip.departure(1), 230);
        assert_eq!(trip.len(), 3);
        assert_eq!(trip.first_departure(), 100);
    }

    #[test]
    fn departure_before_arrival_rejected() {
        let err = TripSchedule::new(vec![100, 200], vec![100, 150]).unwrap_err();
        assert!(matches!(err, DataError::TripTimesDecrease { position: 1, .. }));
    }

    #[test]
    fn arrival_before_previous_departure_rejected() {
        let err = TripSchedule::new(vec![100, 140], vec![150, 160]).unwrap_err();
        assert!(matches!(err, DataError::TripTimesDecrease { position: 1, .. }));
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = TripSchedule::new(vec![100, 140], vec![100]).unwrap_err();
        assert!(matches!(err, DataError::TripLength { .. }));
    }

    #[test]
    fn trip_ref_display() {
        assert_eq!(TripRef::new(3, 1).to_string(), "pattern 3 trip 1");
    }
}
