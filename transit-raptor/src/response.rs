//! Search response.

use serde::{Deserialize, Serialize};

use crate::engine::{Heuristics, SearchStats};
use crate::path::Path;
use crate::transit::TransitDataProvider;

/// Result of one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaptorResponse {
    /// Pareto-optimal paths, ranked best first.
    pub paths: Vec<Path>,

    /// Heuristic bounds, when the request asked for them.
    pub heuristics: Option<Heuristics>,

    pub stats: SearchStats,
}

impl RaptorResponse {
    /// Whether no path was found.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Render every path, naming stops through `data`.
    pub fn describe(&self, data: &dyn TransitDataProvider) -> Vec<String> {
        self.paths
            .iter()
            .map(|p| {
                p.to_string_with(|stop| {
                    data.stop_name(stop)
                        .map_or_else(|| stop.to_string(), str::to_string)
                })
            })
            .collect()
    }
}
