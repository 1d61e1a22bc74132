//! Hand-built networks for the scenario tests.
//!
//! Stops are named by letter, `A` being stop 0. Routes are given as a stop
//! string and one schedule string per trip, e.g. `"A B C"` with
//! `"0:10 0:20 0:30"`; trips have no dwell time.

use crate::domain::time::parse_time;
use crate::domain::{
    ConstrainedTransfer, DefaultCostCalculator, DefaultSlackProvider, Pattern, PatternIndex,
    StopIndex, TransferConstraint, TransitMode, TripRef, TripSchedule,
};
use crate::request::RaptorRequest;
use crate::response::RaptorResponse;
use crate::transit::{TransitData, TransitDataBuilder};
use crate::{RaptorConfig, RaptorService};

pub(crate) fn t(s: &str) -> i32 {
    parse_time(s).unwrap()
}

pub(crate) fn stop(name: &str) -> StopIndex {
    let [letter] = name.as_bytes() else {
        panic!("stop names are single letters: {name:?}");
    };
    usize::from(letter - b'A')
}

/// Log to the test output; filter with `RUST_LOG`.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) struct Network {
    builder: TransitDataBuilder,
    patterns: usize,
}

impl Network {
    pub fn new(stop_count: usize) -> Self {
        let builder = (0..stop_count).fold(TransitData::builder(stop_count), |b, i| {
            let name = char::from(b'A' + i as u8).to_string();
            b.stop_name(i, name).unwrap()
        });
        Self {
            builder,
            patterns: 0,
        }
    }

    pub fn slack(mut self, transfer: i32, board: i32, alight: i32) -> Self {
        self.builder = self
            .builder
            .with_slack(DefaultSlackProvider::new(transfer, board, alight));
        self
    }

    pub fn cost(mut self, cost: DefaultCostCalculator) -> Self {
        self.builder = self.builder.with_cost_calculator(cost);
        self
    }

    pub fn bus(self, name: &str, stops: &str, trips: &[&str]) -> Self {
        self.route(name, TransitMode::Bus, stops, trips)
    }

    pub fn route(mut self, name: &str, mode: TransitMode, stops: &str, trips: &[&str]) -> Self {
        let stops: Vec<StopIndex> = stops.split_whitespace().map(stop).collect();
        let pattern = Pattern::with_stops(name, mode, &stops).unwrap();
        let trips = trips
            .iter()
            .map(|times| TripSchedule::from_times(times.split_whitespace().map(t).collect()).unwrap())
            .collect();
        let index = self.builder.add_pattern(pattern, trips).unwrap();
        assert_eq!(index, self.patterns);
        self.patterns += 1;
        self
    }

    pub fn walk(mut self, a: &str, b: &str, seconds: i32) -> Self {
        self.builder.add_walk(stop(a), stop(b), seconds).unwrap();
        self
    }

    /// Constrain the connection from `from` (pattern, trip) alighting at
    /// `at` to `to` boarding at the same stop.
    pub fn constraint(
        mut self,
        from: (PatternIndex, usize),
        to: (PatternIndex, usize),
        at: &str,
        constraint: TransferConstraint,
    ) -> Self {
        self.builder
            .add_constrained_transfer(ConstrainedTransfer::at_stop(
                TripRef::new(from.0, from.1),
                TripRef::new(to.0, to.1),
                stop(at),
                constraint,
            ))
            .unwrap();
        self
    }

    pub fn build(self) -> TransitData {
        self.builder.build()
    }
}

pub(crate) fn route(request: &RaptorRequest, data: &TransitData) -> RaptorResponse {
    route_with(RaptorConfig::default(), request, data)
}

pub(crate) fn route_with(
    config: RaptorConfig,
    request: &RaptorRequest,
    data: &TransitData,
) -> RaptorResponse {
    init_tracing();
    RaptorService::new(config)
        .unwrap()
        .route(request, data)
        .unwrap()
}

/// The routes ridden by each path, joined by `-`.
pub(crate) fn routes(response: &RaptorResponse) -> Vec<String> {
    response
        .paths
        .iter()
        .map(|p| {
            p.transit_legs()
                .map(|leg| leg.route.as_str())
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect()
}
