//! Transit data provider.
//!
//! The router never owns the network. It reads stops, patterns, trips,
//! transfers and constraints through `TransitDataProvider`, which must stay
//! unchanged for the duration of a search. `TransitData` is the in-memory
//! implementation used by tests and small deployments.

mod data;

pub use data::{TransitData, TransitDataBuilder};

use crate::domain::{
    CostCalculator, Pattern, PatternIndex, SlackProvider, StopIndex, Transfer,
    TransferConstraint, TripRef, TripSchedule,
};

/// Read-only view of a transit network.
///
/// This abstraction allows the router to be tested with small hand-built
/// networks. Implementations must be cheap to query: every method is called
/// from inside the round loop.
///
/// # Invariants
///
/// - Trips of a pattern are sorted by departure and never overtake each
///   other at any stop position.
/// - Every stop index returned is `< number_of_stops()`.
/// - Answers are stable for the lifetime of the provider.
pub trait TransitDataProvider: Send + Sync {
    /// Number of stops; valid stop indexes are `0..number_of_stops()`.
    fn number_of_stops(&self) -> usize;

    /// Patterns visiting `stop`, in ascending pattern order.
    fn patterns_for_stop(&self, stop: StopIndex) -> &[PatternIndex];

    fn pattern(&self, pattern: PatternIndex) -> &Pattern;

    /// Trips of `pattern`, sorted by departure.
    fn trips(&self, pattern: PatternIndex) -> &[TripSchedule];

    /// Transfers leaving `stop`; `Transfer::stop` is the target.
    fn transfers_from(&self, stop: StopIndex) -> &[Transfer];

    /// Transfers arriving at `stop`; `Transfer::stop` is the source.
    fn transfers_to(&self, stop: StopIndex) -> &[Transfer];

    /// The constraint between alighting `from` at `from_stop` and boarding
    /// `to` at `to_stop`, if one exists.
    fn transfer_constraint(
        &self,
        from: TripRef,
        from_stop: StopIndex,
        to: TripRef,
        to_stop: StopIndex,
    ) -> Option<TransferConstraint>;

    /// Whether any constraint targets `pattern` at `stop` in the given
    /// search direction.
    ///
    /// Forward searches board the constraint's target trip, reverse searches
    /// board its source trip. Returning `true` too often only costs time.
    fn has_constrained_transfers(&self, pattern: PatternIndex, stop: StopIndex, forward: bool)
    -> bool;

    fn slack_provider(&self) -> &dyn SlackProvider;

    fn cost_calculator(&self) -> &dyn CostCalculator;

    /// Human-readable stop name, used when rendering paths.
    fn stop_name(&self, _stop: StopIndex) -> Option<&str> {
        None
    }
}
