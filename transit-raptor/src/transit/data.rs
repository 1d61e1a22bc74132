//! In-memory transit network.
//!
//! `TransitDataBuilder` validates everything the router relies on while the
//! network is loaded, so a built `TransitData` can be searched without any
//! further checks.

use std::collections::{HashMap, HashSet};

use crate::domain::{
    ConstrainedTransfer, CostCalculator, DataError, DefaultCostCalculator,
    DefaultSlackProvider, Pattern, PatternIndex, SlackProvider, StopIndex, Transfer,
    TransferConstraint, TripRef, TripSchedule,
};

use super::TransitDataProvider;

type ConstraintKey = (TripRef, StopIndex, TripRef, StopIndex);

/// A transit network held in memory.
pub struct TransitData {
    stop_names: Vec<Option<String>>,
    patterns: Vec<Pattern>,
    trips: Vec<Vec<TripSchedule>>,
    patterns_by_stop: Vec<Vec<PatternIndex>>,
    transfers_from: Vec<Vec<Transfer>>,
    transfers_to: Vec<Vec<Transfer>>,
    constraints: HashMap<ConstraintKey, TransferConstraint>,
    /// (pattern, stop) pairs boarded by a constraint target
    constrained_targets: HashSet<(PatternIndex, StopIndex)>,
    /// (pattern, stop) pairs alighted by a constraint source
    constrained_sources: HashSet<(PatternIndex, StopIndex)>,
    slack: Box<dyn SlackProvider>,
    cost: Box<dyn CostCalculator>,
}

impl TransitData {
    /// Start building a network with `stop_count` stops.
    pub fn builder(stop_count: usize) -> TransitDataBuilder {
        TransitDataBuilder::new(stop_count)
    }

    pub fn number_of_patterns(&self) -> usize {
        self.patterns.len()
    }

    pub fn number_of_constraints(&self) -> usize {
        self.constraints.len()
    }
}

impl std::fmt::Debug for TransitData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitData")
            .field("stops", &self.stop_names.len())
            .field("patterns", &self.patterns.len())
            .field("constraints", &self.constraints.len())
            .finish_non_exhaustive()
    }
}

impl TransitDataProvider for TransitData {
    fn number_of_stops(&self) -> usize {
        self.stop_names.len()
    }

    fn patterns_for_stop(&self, stop: StopIndex) -> &[PatternIndex] {
        &self.patterns_by_stop[stop]
    }

    fn pattern(&self, pattern: PatternIndex) -> &Pattern {
        &self.patterns[pattern]
    }

    fn trips(&self, pattern: PatternIndex) -> &[TripSchedule] {
        &self.trips[pattern]
    }

    fn transfers_from(&self, stop: StopIndex) -> &[Transfer] {
        &self.transfers_from[stop]
    }

    fn transfers_to(&self, stop: StopIndex) -> &[Transfer] {
        &self.transfers_to[stop]
    }

    fn transfer_constraint(
        &self,
        from: TripRef,
        from_stop: StopIndex,
        to: TripRef,
        to_stop: StopIndex,
    ) -> Option<TransferConstraint> {
        self.constraints
            .get(&(from, from_stop, to, to_stop))
            .copied()
    }

    fn has_constrained_transfers(
        &self,
        pattern: PatternIndex,
        stop: StopIndex,
        forward: bool,
    ) -> bool {
        if forward {
            self.constrained_targets.contains(&(pattern, stop))
        } else {
            self.constrained_sources.contains(&(pattern, stop))
        }
    }

    fn slack_provider(&self) -> &dyn SlackProvider {
        self.slack.as_ref()
    }

    fn cost_calculator(&self) -> &dyn CostCalculator {
        self.cost.as_ref()
    }

    fn stop_name(&self, stop: StopIndex) -> Option<&str> {
        self.stop_names.get(stop).and_then(|n| n.as_deref())
    }
}

/// Builder for `TransitData`.
///
/// Every `add_*` method validates its input against what has been added so
/// far, so patterns must be added before the constraints that reference
/// their trips.
pub struct TransitDataBuilder {
    data: TransitData,
}

impl TransitDataBuilder {
    /// Create a builder for `stop_count` stops, with default slack and cost.
    pub fn new(stop_count: usize) -> Self {
        Self {
            data: TransitData {
                stop_names: vec![None; stop_count],
                patterns: Vec::new(),
                trips: Vec::new(),
                patterns_by_stop: vec![Vec::new(); stop_count],
                transfers_from: vec![Vec::new(); stop_count],
                transfers_to: vec![Vec::new(); stop_count],
                constraints: HashMap::new(),
                constrained_targets: HashSet::new(),
                constrained_sources: HashSet::new(),
                slack: Box::new(DefaultSlackProvider::default()),
                cost: Box::new(DefaultCostCalculator::default()),
            },
        }
    }

    fn stop_count(&self) -> usize {
        self.data.stop_names.len()
    }

    fn check_stop(&self, stop: StopIndex) -> Result<(), DataError> {
        if stop >= self.stop_count() {
            return Err(DataError::UnknownStop {
                stop,
                count: self.stop_count(),
            });
        }
        Ok(())
    }

    /// Name a stop for rendering.
    pub fn stop_name(mut self, stop: StopIndex, name: impl Into<String>) -> Result<Self, DataError> {
        self.check_stop(stop)?;
        self.data.stop_names[stop] = Some(name.into());
        Ok(self)
    }

    pub fn with_slack(mut self, slack: impl SlackProvider + 'static) -> Self {
        self.data.slack = Box::new(slack);
        self
    }

    pub fn with_cost_calculator(mut self, cost: impl CostCalculator + 'static) -> Self {
        self.data.cost = Box::new(cost);
        self
    }

    /// Add a pattern and its trips.
    ///
    /// Trips are stably sorted by first departure; `TripRef::trip` indexes
    /// into that sorted order.
    ///
    /// # Errors
    ///
    /// - `UnknownStop` if the pattern visits a stop outside the network.
    /// - `TripLength` if a trip does not have one time per stop position.
    /// - `TripsOutOfOrder` if one trip overtakes another at any position.
    pub fn add_pattern(
        &mut self,
        pattern: Pattern,
        mut trips: Vec<TripSchedule>,
    ) -> Result<PatternIndex, DataError> {
        for position in pattern.positions() {
            self.check_stop(position.stop)?;
        }
        for (i, trip) in trips.iter().enumerate() {
            if trip.len() != pattern.len() {
                return Err(DataError::TripLength {
                    pattern: pattern.name().to_string(),
                    trip: i,
                    found: trip.len(),
                    expected: pattern.len(),
                });
            }
        }

        trips.sort_by_key(TripSchedule::first_departure);
        for (i, pair) in trips.windows(2).enumerate() {
            let (a, b) = (&pair[0], &pair[1]);
            let overtaken = (0..pattern.len())
                .find(|&pos| a.departure(pos) > b.departure(pos) || a.arrival(pos) > b.arrival(pos));
            if let Some(position) = overtaken {
                return Err(DataError::TripsOutOfOrder {
                    pattern: pattern.name().to_string(),
                    trip: i,
                    next: i + 1,
                    position,
                });
            }
        }

        let index = self.data.patterns.len();
        for position in pattern.positions() {
            let serving = &mut self.data.patterns_by_stop[position.stop];
            if serving.last() != Some(&index) {
                serving.push(index);
            }
        }
        self.data.patterns.push(pattern);
        self.data.trips.push(trips);
        Ok(index)
    }

    /// Add a one-way transfer from `from` to `transfer.stop`.
    ///
    /// # Errors
    ///
    /// `UnknownStop` for either end, `NegativeDuration` for a negative walk.
    pub fn add_transfer(&mut self, from: StopIndex, transfer: Transfer) -> Result<(), DataError> {
        self.check_stop(from)?;
        self.check_stop(transfer.stop)?;
        if transfer.duration < 0 {
            return Err(DataError::NegativeDuration(transfer.duration));
        }
        self.data.transfers_from[from].push(transfer);
        self.data.transfers_to[transfer.stop].push(Transfer {
            stop: from,
            ..transfer
        });
        Ok(())
    }

    /// Add a walk in both directions.
    pub fn add_walk(&mut self, a: StopIndex, b: StopIndex, duration: i32) -> Result<(), DataError> {
        self.add_transfer(a, Transfer::walk(b, duration))?;
        self.add_transfer(b, Transfer::walk(a, duration))
    }

    /// Add a constraint between two trips.
    ///
    /// # Errors
    ///
    /// - `UnknownTrip` if either trip does not exist.
    /// - `StopNotOnTrip` if a stop is not served by its trip's pattern.
    /// - `DuplicateConstraint` if the same tuple is already constrained.
    /// - `NegativeDuration` for a negative minimum transfer time.
    pub fn add_constrained_transfer(&mut self, c: ConstrainedTransfer) -> Result<(), DataError> {
        self.check_trip_stop(c.from_trip, c.from_stop)?;
        self.check_trip_stop(c.to_trip, c.to_stop)?;
        if let TransferConstraint::MinTransferTime(secs) = c.constraint {
            if secs < 0 {
                return Err(DataError::NegativeDuration(secs));
            }
        }

        let key = (c.from_trip, c.from_stop, c.to_trip, c.to_stop);
        if self.data.constraints.contains_key(&key) {
            return Err(DataError::DuplicateConstraint {
                from: c.from_trip,
                from_stop: c.from_stop,
                to: c.to_trip,
                to_stop: c.to_stop,
            });
        }
        self.data.constraints.insert(key, c.constraint);
        self.data
            .constrained_targets
            .insert((c.to_trip.pattern, c.to_stop));
        self.data
            .constrained_sources
            .insert((c.from_trip.pattern, c.from_stop));
        Ok(())
    }

    fn check_trip_stop(&self, trip: TripRef, stop: StopIndex) -> Result<(), DataError> {
        let exists = self
            .data
            .trips
            .get(trip.pattern)
            .is_some_and(|trips| trip.trip < trips.len());
        if !exists {
            return Err(DataError::UnknownTrip(trip));
        }
        if !self.data.patterns[trip.pattern].serves(stop) {
            return Err(DataError::StopNotOnTrip { trip, stop });
        }
        Ok(())
    }

    pub fn build(self) -> TransitData {
        tracing::debug!(
            stops = self.data.stop_names.len(),
            patterns = self.data.patterns.len(),
            constraints = self.data.constraints.len(),
            "transit data loaded"
        );
        self.data
    }
}
