//! Range controller.
//!
//! The iteration times are split into chunks. A chunk runs its iterations
//! in order on one label state, so later iterations only keep labels that
//! beat what the previous ones found; each chunk starts from empty state.
//! Chunks run one after the other, recycling the arena, or on the rayon
//! pool. Either way the candidates of all chunks are reduced by the same
//! ranked insertion, so both modes return the same paths.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::RaptorError;
use crate::path::{Path, reduce_paths};
use crate::request::Profile;

use super::multi_criteria::McState;
use super::standard::StdState;
use super::worker::{RoutingStrategy, Worker, WorkerStats};
use super::{ArrivalArena, SearchContext};

/// Counters describing how a search went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Range iterations run
    pub iterations: usize,
    /// Most rounds run by any iteration
    pub rounds: usize,
    /// Some iteration still had improving stops when the round budget ran
    /// out
    pub round_limit_reached: bool,
    /// Some label reached an egress within the time limit
    pub destination_reached: bool,
    /// Labels created
    pub labels: usize,
}

impl SearchStats {
    fn merge(self, other: SearchStats) -> SearchStats {
        SearchStats {
            iterations: self.iterations + other.iterations,
            rounds: self.rounds.max(other.rounds),
            round_limit_reached: self.round_limit_reached || other.round_limit_reached,
            destination_reached: self.destination_reached || other.destination_reached,
            labels: self.labels + other.labels,
        }
    }
}

/// Paths and counters of a range search.
#[derive(Debug, Clone)]
pub(crate) struct SearchOutcome {
    pub paths: Vec<Path>,
    pub stats: SearchStats,
}

struct ChunkResult {
    paths: Vec<Path>,
    stats: SearchStats,
}

/// Run every iteration of `ctx` and reduce the destination paths.
///
/// # Errors
///
/// `RaptorError::Aborted` if any chunk was cancelled.
pub(crate) fn run_range(
    ctx: &SearchContext<'_>,
    arena: ArrivalArena,
) -> Result<SearchOutcome, RaptorError> {
    let chunks: Vec<&[i32]> = ctx.iteration_times.chunks(ctx.chunk_size).collect();

    let results: Vec<ChunkResult> = if ctx.parallel && chunks.len() > 1 {
        chunks
            .par_iter()
            .map(|times| run_chunk(ctx, times, ArrivalArena::new()).map(|(result, _)| result))
            .collect::<Result<_, _>>()?
    } else {
        let mut results = Vec::with_capacity(chunks.len());
        let mut arena = arena;
        for times in chunks {
            let (result, used) = run_chunk(ctx, times, arena)?;
            results.push(result);
            arena = used.recycle();
        }
        results
    };

    let mut stats = SearchStats::default();
    let mut candidates = Vec::new();
    for result in results {
        stats = stats.merge(result.stats);
        candidates.extend(result.paths);
    }
    let paths = reduce_paths(candidates, &ctx.path_criteria);
    Ok(SearchOutcome { paths, stats })
}

fn run_chunk(
    ctx: &SearchContext<'_>,
    times: &[i32],
    arena: ArrivalArena,
) -> Result<(ChunkResult, ArrivalArena), RaptorError> {
    trace!(
        first = times.first().copied(),
        iterations = times.len(),
        "running range chunk"
    );
    let finished = match ctx.profile {
        Profile::MultiCriteria => finish(Worker::new(ctx, McState::new(ctx, arena)).run(times)?),
        Profile::Standard => {
            finish(Worker::new(ctx, StdState::new(ctx, arena, false)).run(times)?)
        }
        Profile::MinTravelDuration => {
            finish(Worker::new(ctx, StdState::new(ctx, arena, true)).run(times)?)
        }
    };
    Ok(finished)
}

fn finish<S: RoutingStrategy>((strategy, worker): (S, WorkerStats)) -> (ChunkResult, ArrivalArena) {
    let mut labels = strategy.into_labels();
    let stats = SearchStats {
        iterations: worker.iterations,
        rounds: worker.rounds,
        round_limit_reached: worker.round_limit_reached,
        destination_reached: labels.destination.reached(),
        labels: labels.arena.len(),
    };
    let paths = labels.destination.take_paths();
    (ChunkResult { paths, stats }, labels.arena)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_merge_sums_and_ors() {
        let a = SearchStats {
            iterations: 2,
            rounds: 3,
            round_limit_reached: false,
            destination_reached: true,
            labels: 10,
        };
        let b = SearchStats {
            iterations: 1,
            rounds: 5,
            round_limit_reached: true,
            destination_reached: false,
            labels: 4,
        };
        assert_eq!(
            a.merge(b),
            SearchStats {
                iterations: 3,
                rounds: 5,
                round_limit_reached: true,
                destination_reached: true,
                labels: 14,
            }
        );
        assert_eq!(a.merge(b), b.merge(a));
    }
}
