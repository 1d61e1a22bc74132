//! Search errors.
//!
//! `RequestError` describes a request that cannot be searched at all;
//! `RaptorError` is what the service returns. An unreachable destination is
//! not an error: it is an `Ok` response without paths.

use crate::domain::StopIndex;

/// Reasons a request is rejected before any search work starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    #[error("either an earliest departure time or a latest arrival time is required")]
    MissingTime,

    #[error("at least one access path is required")]
    NoAccess,

    #[error("at least one egress path is required")]
    NoEgress,

    #[error("{0} requires the multi-criteria profile")]
    RequiresMultiCriteria(&'static str),

    #[error("via location {0} has no stops and no transfers")]
    EmptyVia(usize),

    #[error("relax ratio must be at least 1.0, got {0}")]
    RelaxRatio(f64),

    #[error("stop {stop} is outside the network ({count} stops)")]
    UnknownStop { stop: StopIndex, count: usize },

    #[error("negative duration: {0}s")]
    NegativeDuration(i32),

    #[error("latest arrival time is before earliest departure time")]
    InvertedTimeWindow,
}

/// Error returned by a search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RaptorError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// The search was cancelled or timed out; no partial result is returned
    #[error("search aborted")]
    Aborted,

    #[error("configuration error: {0}")]
    Config(String),
}
