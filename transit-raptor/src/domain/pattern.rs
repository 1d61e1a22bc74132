//! Route patterns.
//!
//! A `Pattern` is the ordered stop sequence shared by a group of trips.
//! Each position carries its own boarding, alighting and accessibility
//! flags, because the same stop can allow boarding on one pattern and be
//! drop-off only on another.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::DataError;

/// Index of a stop in the network.
pub type StopIndex = usize;

/// Index of a pattern in the network.
pub type PatternIndex = usize;

/// Transit mode of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitMode {
    Bus,
    Coach,
    Tram,
    Rail,
    Subway,
    Ferry,
}

impl fmt::Display for TransitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransitMode::Bus => "BUS",
            TransitMode::Coach => "COACH",
            TransitMode::Tram => "TRAM",
            TransitMode::Rail => "RAIL",
            TransitMode::Subway => "SUBWAY",
            TransitMode::Ferry => "FERRY",
        };
        f.write_str(s)
    }
}

/// One stop position within a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPosition {
    /// The stop served at this position
    pub stop: StopIndex,
    /// Passengers may board here
    pub board_allowed: bool,
    /// Passengers may alight here
    pub alight_allowed: bool,
    /// Boarding and alighting here is step-free
    pub wheelchair_accessible: bool,
}

impl StopPosition {
    /// A regular stop: boarding and alighting allowed, accessible.
    pub fn regular(stop: StopIndex) -> Self {
        Self {
            stop,
            board_allowed: true,
            alight_allowed: true,
            wheelchair_accessible: true,
        }
    }

    /// A pick-up only stop.
    pub fn board_only(stop: StopIndex) -> Self {
        Self {
            alight_allowed: false,
            ..Self::regular(stop)
        }
    }

    /// A drop-off only stop.
    pub fn alight_only(stop: StopIndex) -> Self {
        Self {
            board_allowed: false,
            ..Self::regular(stop)
        }
    }
}

/// An ordered stop sequence served by a set of trips.
///
/// # Invariants
///
/// - At least two stop positions
/// - Positions never change after construction
#[derive(Debug, Clone)]
pub struct Pattern {
    name: String,
    mode: TransitMode,
    positions: Vec<StopPosition>,
    slack_index: usize,
    reluctance_index: usize,
}

impl Pattern {
    /// Create a pattern from its stop positions.
    ///
    /// # Errors
    ///
    /// Returns `DataError::PatternTooShort` for fewer than two positions.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_raptor::domain::{Pattern, StopPosition, TransitMode};
    ///
    /// let pattern = Pattern::new(
    ///     "R1",
    ///     TransitMode::Bus,
    ///     vec![StopPosition::regular(0), StopPosition::regular(3)],
    /// )
    /// .unwrap();
    /// assert_eq!(pattern.len(), 2);
    /// assert_eq!(pattern.stop(1), 3);
    ///
    /// assert!(Pattern::new("X", TransitMode::Bus, vec![StopPosition::regular(0)]).is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        mode: TransitMode,
        positions: Vec<StopPosition>,
    ) -> Result<Self, DataError> {
        let name = name.into();
        if positions.len() < 2 {
            return Err(DataError::PatternTooShort(name));
        }
        Ok(Self {
            name,
            mode,
            positions,
            slack_index: 0,
            reluctance_index: 0,
        })
    }

    /// Create a pattern where every stop allows boarding and alighting.
    pub fn with_stops(
        name: impl Into<String>,
        mode: TransitMode,
        stops: &[StopIndex],
    ) -> Result<Self, DataError> {
        Self::new(
            name,
            mode,
            stops.iter().copied().map(StopPosition::regular).collect(),
        )
    }

    /// Set the index used to look up board and alight slack.
    pub fn with_slack_index(mut self, slack_index: usize) -> Self {
        self.slack_index = slack_index;
        self
    }

    /// Set the index used to look up the transit reluctance.
    pub fn with_reluctance_index(mut self, reluctance_index: usize) -> Self {
        self.reluctance_index = reluctance_index;
        self
    }

    /// Route name, used when rendering itineraries.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> TransitMode {
        self.mode
    }

    /// Number of stop positions (always at least two).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Stop served at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    pub fn stop(&self, pos: usize) -> StopIndex {
        self.positions[pos].stop
    }

    pub fn position(&self, pos: usize) -> &StopPosition {
        &self.positions[pos]
    }

    pub fn positions(&self) -> &[StopPosition] {
        &self.positions
    }

    pub fn board_allowed(&self, pos: usize) -> bool {
        self.positions[pos].board_allowed
    }

    pub fn alight_allowed(&self, pos: usize) -> bool {
        self.positions[pos].alight_allowed
    }

    pub fn slack_index(&self) -> usize {
        self.slack_index
    }

    pub fn reluctance_index(&self) -> usize {
        self.reluctance_index
    }

    /// First position at or after `from` serving `stop`.
    pub fn find_stop(&self, stop: StopIndex, from: usize) -> Option<usize> {
        self.positions
            .iter()
            .skip(from)
            .position(|p| p.stop == stop)
            .map(|i| i + from)
    }

    /// Whether any position serves `stop`.
    pub fn serves(&self, stop: StopIndex) -> bool {
        self.positions.iter().any(|p| p.stop == stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> Pattern {
        Pattern::new(
            "R1",
            TransitMode::Rail,
            vec![
                StopPosition::board_only(4),
                StopPosition::regular(5),
                StopPosition::alight_only(6),
                StopPosition::regular(5),
            ],
        )
        .unwrap()
    }

    #[test]
    fn flags_per_position() {
        let p = pattern();
        assert!(p.board_allowed(0));
        assert!(!p.alight_allowed(0));
        assert!(p.alight_allowed(2));
        assert!(!p.board_allowed(2));
        assert!(p.position(1).wheelchair_accessible);
    }

    #[test]
    fn find_stop_respects_start() {
        let p = pattern();
        assert_eq!(p.find_stop(5, 0), Some(1));
        assert_eq!(p.find_stop(5, 2), Some(3));
        assert_eq!(p.find_stop(9, 0), None);
        assert!(p.serves(6));
        assert!(!p.serves(7));
    }

    #[test]
    fn too_short_rejected() {
        let err = Pattern::with_stops("R9", TransitMode::Bus, &[1]).unwrap_err();
        assert_eq!(err, DataError::PatternTooShort("R9".into()));
    }

    #[test]
    fn mode_display() {
        assert_eq!(TransitMode::Bus.to_string(), "BUS");
        assert_eq!(TransitMode::Subway.to_string(), "SUBWAY");
    }
}
