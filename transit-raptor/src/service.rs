//! The routing service.
//!
//! `RaptorService` is the front door: it validates a request, runs the
//! heuristics when they are needed, derives the time bounds, window and
//! round budget, and hands the range search to the engine.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::RaptorConfig;
use crate::engine::{
    ArrivalArena, CancelToken, Heuristics, SearchBounds, SearchContext, compute_heuristics,
    run_range,
};
use crate::error::RaptorError;
use crate::request::{RaptorRequest, SearchDirection};
use crate::response::RaptorResponse;
use crate::transit::TransitDataProvider;

/// Journey router over any transit data provider.
#[derive(Debug, Clone)]
pub struct RaptorService {
    config: RaptorConfig,
}

impl RaptorService {
    /// Create a service.
    ///
    /// # Errors
    ///
    /// `RaptorError::Config` if the configuration is invalid.
    pub fn new(config: RaptorConfig) -> Result<Self, RaptorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RaptorConfig {
        &self.config
    }

    /// Search `data` for the paths matching `request`.
    ///
    /// An unreachable destination is an `Ok` response without paths.
    ///
    /// # Errors
    ///
    /// `RaptorError::InvalidRequest` if the request fails validation.
    pub fn route(
        &self,
        request: &RaptorRequest,
        data: &dyn TransitDataProvider,
    ) -> Result<RaptorResponse, RaptorError> {
        self.route_with_cancel(request, data, &CancelToken::new())
    }

    /// Like [`route`](Self::route), checking `cancel` between rounds.
    ///
    /// # Errors
    ///
    /// `RaptorError::Aborted` once `cancel` is set, in addition to the
    /// errors of [`route`](Self::route).
    pub fn route_with_cancel(
        &self,
        request: &RaptorRequest,
        data: &dyn TransitDataProvider,
        cancel: &CancelToken,
    ) -> Result<RaptorResponse, RaptorError> {
        request.validate(data.number_of_stops())?;
        let result = self.search(request, data, cancel);
        if let Err(RaptorError::Aborted) = result {
            warn!(profile = %request.profile, "search aborted");
        }
        result
    }

    /// Run the search on the tokio blocking pool, giving up after
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// `RaptorError::Aborted` when the timeout elapses; the search is
    /// cancelled at its next round boundary.
    pub async fn route_with_timeout<D>(
        self: Arc<Self>,
        request: RaptorRequest,
        data: Arc<D>,
        timeout: std::time::Duration,
    ) -> Result<RaptorResponse, RaptorError>
    where
        D: TransitDataProvider + 'static,
    {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let task = tokio::task::spawn_blocking(move || {
            self.route_with_cancel(&request, data.as_ref(), &token)
        });

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
            Ok(Err(_)) => Err(RaptorError::Aborted),
            Err(_) => {
                cancel.cancel();
                warn!(timeout_ms = timeout.as_millis() as u64, "search timed out");
                Err(RaptorError::Aborted)
            }
        }
    }

    fn search(
        &self,
        request: &RaptorRequest,
        data: &dyn TransitDataProvider,
        cancel: &CancelToken,
    ) -> Result<RaptorResponse, RaptorError> {
        let config = &self.config;
        let direction = request.direction();
        let max_transfers = request
            .max_transfers
            .unwrap_or(config.max_number_of_transfers);
        let max_journey = (config.max_journey_duration_mins * 60) as i32;
        let max_window = (config.dynamic_search_window.max_window_mins * 60) as i32;

        let (heuristics, arena) = if needs_heuristics(request) {
            let anchor = heuristic_anchor(request, max_window, max_journey);
            let (h, arena) = compute_heuristics(data, request, anchor, max_transfers + 1, cancel)?;
            (Some(h), arena)
        } else {
            (None, ArrivalArena::new())
        };

        let window = request.search_window.unwrap_or_else(|| {
            config
                .dynamic_search_window
                .window_secs(heuristics.as_ref().and_then(Heuristics::origin_min_travel_duration))
        });
        let bounds = search_bounds(request, window, max_journey);
        let max_rounds = round_budget(request, config, max_transfers, heuristics.as_ref());

        let ctx = SearchContext::main(
            data,
            request,
            config,
            bounds,
            max_rounds,
            heuristics.as_ref(),
            cancel,
        );
        let outcome = run_range(&ctx, arena)?;

        debug!(
            profile = %request.profile,
            ?direction,
            window,
            max_rounds,
            iterations = outcome.stats.iterations,
            rounds = outcome.stats.rounds,
            labels = outcome.stats.labels,
            paths = outcome.paths.len(),
            "search complete"
        );

        Ok(RaptorResponse {
            paths: outcome.paths,
            heuristics: heuristics.filter(|_| request.include_heuristics),
            stats: outcome.stats,
        })
    }
}

/// Heuristics bound the search unless a via location makes them unsound.
fn needs_heuristics(request: &RaptorRequest) -> bool {
    !request.has_via()
        && (request.optimizations.destination_pruning
            || request.include_heuristics
            || request.search_window.is_none())
}

/// Where the heuristic search starts: the latest possible arrival of a
/// forward search, the earliest possible departure of a reverse one.
fn heuristic_anchor(request: &RaptorRequest, max_window: i32, max_journey: i32) -> i32 {
    let window = request.search_window.unwrap_or(max_window);
    match (request.earliest_departure_time, request.latest_arrival_time) {
        (Some(_), Some(lat)) => lat,
        (Some(edt), None) => edt + window + max_journey,
        (None, Some(lat)) => lat - window - max_journey,
        (None, None) => unreachable!("validated requests carry a time"),
    }
}

fn search_bounds(request: &RaptorRequest, window: i32, max_journey: i32) -> SearchBounds {
    match (request.direction(), request.earliest_departure_time, request.latest_arrival_time) {
        (SearchDirection::Forward, Some(edt), lat) => SearchBounds {
            earliest_departure_time: edt,
            latest_arrival_time: lat.unwrap_or(edt + window + max_journey),
            search_window: window,
        },
        (_, _, Some(lat)) => SearchBounds {
            earliest_departure_time: lat - window - max_journey,
            latest_arrival_time: lat,
            search_window: window,
        },
        _ => unreachable!("validated requests carry a time"),
    }
}

/// Maximum rides: the transfer limit plus one, tightened by the heuristic
/// minimum when pruning.
fn round_budget(
    request: &RaptorRequest,
    config: &RaptorConfig,
    max_transfers: usize,
    heuristics: Option<&Heuristics>,
) -> usize {
    let min_transfers = heuristics
        .filter(|_| request.optimizations.destination_pruning)
        .and_then(Heuristics::origin_min_transfers);
    match min_transfers {
        Some(min) => max_transfers.min(min + config.number_of_additional_transfers) + 1,
        None => max_transfers + 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AccessEgress;

    fn request() -> RaptorRequest {
        RaptorRequest::builder()
            .earliest_departure_time(3600)
            .access(AccessEgress::walk(0, 60))
            .egress(AccessEgress::walk(1, 60))
            .build()
    }

    #[test]
    fn forward_bounds_derive_latest_arrival() {
        let bounds = search_bounds(&request(), 1800, 7200);
        assert_eq!(bounds.earliest_departure_time, 3600);
        assert_eq!(bounds.latest_arrival_time, 3600 + 1800 + 7200);
        assert_eq!(bounds.search_window, 1800);
    }

    #[test]
    fn reverse_bounds_derive_earliest_departure() {
        let mut req = request();
        req.earliest_departure_time = None;
        req.latest_arrival_time = Some(20_000);
        let bounds = search_bounds(&req, 1800, 7200);
        assert_eq!(bounds.earliest_departure_time, 20_000 - 1800 - 7200);
        assert_eq!(bounds.latest_arrival_time, 20_000);
        assert_eq!(heuristic_anchor(&req, 3600, 7200), 20_000 - 3600 - 7200);
    }

    #[test]
    fn heuristics_skipped_with_via_or_fixed_window() {
        let mut req = request();
        assert!(needs_heuristics(&req));
        req.search_window = Some(600);
        assert!(!needs_heuristics(&req));
        req.optimizations.destination_pruning = true;
        assert!(needs_heuristics(&req));
        req.via.push(crate::request::ViaLocation::visit("X", &[0]));
        assert!(!needs_heuristics(&req));
    }

    #[test]
    fn round_budget_uses_heuristic_minimum_only_when_pruning() {
        let config = RaptorConfig::default();
        let mut req = request();
        assert_eq!(round_budget(&req, &config, 12, None), 13);

        let h: Heuristics = serde_json::from_value(serde_json::json!({
            "min_travel_duration": [600, 0],
            "min_rides": [2, 0],
            "origin_min_travel_duration": 660,
            "origin_min_rides": 2
        }))
        .unwrap();
        assert_eq!(round_budget(&req, &config, 12, Some(&h)), 13);
        req.optimizations.destination_pruning = true;
        // One transfer at least, plus five more
        assert_eq!(round_budget(&req, &config, 12, Some(&h)), 7);
        assert_eq!(round_budget(&req, &config, 3, Some(&h)), 4);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = RaptorConfig {
            iteration_chunk_size: 0,
            ..RaptorConfig::default()
        };
        assert!(matches!(RaptorService::new(config), Err(RaptorError::Config(_))));
    }
}
