//! Range-RAPTOR transit router.
//!
//! Answers "what are the best ways to get from these access stops to these
//! egress stops in this time window?" over any network exposed through
//! [`transit::TransitDataProvider`]. Searches run forward (depart after)
//! or in reverse (arrive by), with a single-criterion or a multi-criteria
//! (McRAPTOR) strategy.
//!
//! ```
//! use transit_raptor::domain::{AccessEgress, Pattern, TransitMode, TripSchedule};
//! use transit_raptor::request::RaptorRequest;
//! use transit_raptor::transit::TransitData;
//! use transit_raptor::{RaptorConfig, RaptorService};
//!
//! let mut builder = TransitData::builder(2);
//! let pattern = Pattern::with_stops("R1", TransitMode::Bus, &[0, 1]).unwrap();
//! let trip = TripSchedule::from_times(vec![600, 1200]).unwrap();
//! builder.add_pattern(pattern, vec![trip]).unwrap();
//! let data = builder.build();
//!
//! let request = RaptorRequest::builder()
//!     .earliest_departure_time(0)
//!     .access(AccessEgress::walk(0, 60))
//!     .egress(AccessEgress::walk(1, 60))
//!     .build();
//! let service = RaptorService::new(RaptorConfig::default()).unwrap();
//! let response = service.route(&request, &data).unwrap();
//! assert_eq!(response.paths.len(), 1);
//! assert_eq!(response.paths[0].end_time, 1260);
//! ```

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod path;
pub mod request;
pub mod response;
pub mod service;
pub mod transit;

pub use config::RaptorConfig;
pub use engine::{CancelToken, Heuristics, SearchStats};
pub use error::{RaptorError, RequestError};
pub use path::Path;
pub use request::{Profile, RaptorRequest};
pub use response::RaptorResponse;
pub use service::RaptorService;

#[cfg(test)]
mod test_support;
