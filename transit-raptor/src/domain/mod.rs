//! Transit network model.
//!
//! This module contains the read-only types a search runs over: stops,
//! patterns, trips, transfers, access/egress paths, and the slack and cost
//! policies. Everything here is immutable for the duration of a search.

mod access_egress;
pub mod cost;
mod error;
mod pattern;
mod slack;
pub mod time;
mod transfer;
mod trip;

pub use access_egress::{AccessEgress, OpeningHours};
pub use cost::{CostCalculator, DefaultCostCalculator};
pub use error::DataError;
pub use pattern::{Pattern, PatternIndex, StopIndex, StopPosition, TransitMode};
pub use slack::{DefaultSlackProvider, SlackProvider};
pub use time::TimeError;
pub use transfer::{ConstrainedTransfer, Transfer, TransferConstraint};
pub use trip::{TripRef, TripSchedule};
