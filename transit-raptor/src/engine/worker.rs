//! The round loop shared by every routing strategy.
//!
//! One iteration seeds the access paths, then runs rounds until no stop
//! improves or the round budget is spent. Each round has four phases:
//!
//! 1. scan the patterns serving a stop improved in the previous round
//! 2. add access paths arriving on board with this many rides
//! 3. relax transfers from stops reached on board in this round
//! 4. add access paths ending with a walk with this many rides
//!
//! Round 0 has no scan. What a label is and when it is kept is up to the
//! `RoutingStrategy`; the worker only drives the phases.

use std::collections::BTreeSet;

use tracing::trace;

use crate::domain::{PatternIndex, StopIndex};
use crate::error::RaptorError;

use super::access::access_times;
use super::destination::DestinationArrivals;
use super::{Arrival, ArrivalArena, ArrivalId, ArrivalKind, SearchContext};

/// Stops marked in one phase, in insertion order.
#[derive(Debug, Clone)]
pub(crate) struct StopSet {
    flags: Vec<bool>,
    stops: Vec<StopIndex>,
}

impl StopSet {
    pub fn new(stop_count: usize) -> Self {
        Self {
            flags: vec![false; stop_count],
            stops: Vec::new(),
        }
    }

    pub fn insert(&mut self, stop: StopIndex) {
        if !self.flags[stop] {
            self.flags[stop] = true;
            self.stops.push(stop);
        }
    }

    pub fn contains(&self, stop: StopIndex) -> bool {
        self.flags[stop]
    }

    pub fn stops(&self) -> &[StopIndex] {
        &self.stops
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn clear(&mut self) {
        for &stop in &self.stops {
            self.flags[stop] = false;
        }
        self.stops.clear();
    }
}

/// Label storage every strategy shares: the arena and the destination.
pub(crate) struct Labels {
    pub arena: ArrivalArena,
    pub destination: DestinationArrivals,
    pub iteration_time: i32,
}

impl Labels {
    pub fn new(ctx: &SearchContext<'_>, arena: ArrivalArena) -> Self {
        Self {
            arena,
            destination: DestinationArrivals::new(ctx),
            iteration_time: 0,
        }
    }

    /// Store an accepted label and try it against the egress paths.
    pub fn push(&mut self, ctx: &SearchContext<'_>, arrival: Arrival) -> ArrivalId {
        let id = self.arena.push(arrival);
        self.destination
            .arrive(ctx, &self.arena, id, self.iteration_time);
        id
    }
}

/// Label policy plugged into the round loop.
pub(crate) trait RoutingStrategy {
    fn labels(&self) -> &Labels;

    fn into_labels(self) -> Labels;

    /// Reset per-iteration state; label state may carry over.
    fn setup_iteration(&mut self, ctx: &SearchContext<'_>, iteration_time: i32);

    /// Offer a label built outside the pattern scan.
    fn add_arrival(&mut self, ctx: &SearchContext<'_>, arrival: Arrival);

    /// Stops improved in the last completed round.
    fn touched_last_round(&self) -> &[StopIndex];

    fn prepare_pattern(&mut self, ctx: &SearchContext<'_>, pattern: PatternIndex);

    /// The riders pass the stop at `stop`, whether or not they alight.
    fn pass_through(&mut self, _ctx: &SearchContext<'_>, _stop: StopIndex) {}

    fn alight(&mut self, ctx: &SearchContext<'_>, pattern: PatternIndex, pos: usize, round: usize);

    /// Board from the labels of round `round - 1`, if the stop was improved
    /// in that round.
    fn board(&mut self, ctx: &SearchContext<'_>, pattern: PatternIndex, pos: usize, round: usize);

    fn relax_transfers(&mut self, ctx: &SearchContext<'_>, round: usize);

    fn round_complete(&mut self);
}

/// Counters of one worker run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WorkerStats {
    pub iterations: usize,
    pub rounds: usize,
    pub round_limit_reached: bool,
}

pub(crate) struct Worker<'c, 'a, S> {
    ctx: &'c SearchContext<'a>,
    strategy: S,
    stats: WorkerStats,
}

impl<'c, 'a, S: RoutingStrategy> Worker<'c, 'a, S> {
    pub fn new(ctx: &'c SearchContext<'a>, strategy: S) -> Self {
        Self {
            ctx,
            strategy,
            stats: WorkerStats::default(),
        }
    }

    /// Run one iteration per time, in order, on the same label state.
    ///
    /// # Errors
    ///
    /// `RaptorError::Aborted` when the search is cancelled; the labels
    /// computed so far are dropped.
    pub fn run(mut self, times: &[i32]) -> Result<(S, WorkerStats), RaptorError> {
        for &time in times {
            self.run_iteration(time)?;
        }
        Ok((self.strategy, self.stats))
    }

    fn run_iteration(&mut self, iteration_time: i32) -> Result<(), RaptorError> {
        let ctx = self.ctx;
        self.stats.iterations += 1;
        self.strategy.setup_iteration(ctx, iteration_time);

        let max_access_rides = ctx.max_access_rides();
        let mut round = 0;
        self.add_accesses(iteration_time, round, true);
        self.strategy.relax_transfers(ctx, round);
        self.add_accesses(iteration_time, round, false);
        self.strategy.round_complete();

        loop {
            if ctx.cancel.is_cancelled() {
                return Err(RaptorError::Aborted);
            }
            let touched = self.strategy.touched_last_round().len();
            let labels = self.strategy.labels().arena.len();
            trace!(iteration_time, round, touched, labels, "round complete");
            if !has_more_rounds(round, touched, max_access_rides, ctx.max_rounds) {
                if touched > 0 && round >= ctx.max_rounds {
                    self.stats.round_limit_reached = true;
                }
                break;
            }
            round += 1;
            self.scan_patterns(round);
            self.add_accesses(iteration_time, round, true);
            self.strategy.relax_transfers(ctx, round);
            self.add_accesses(iteration_time, round, false);
            self.strategy.round_complete();
        }

        self.stats.rounds = self.stats.rounds.max(round);
        Ok(())
    }

    fn add_accesses(&mut self, iteration_time: i32, round: usize, on_board: bool) {
        let ctx = self.ctx;
        for (index, access) in ctx.access.iter().enumerate() {
            if access.rides as usize != round || access.stop_reached_on_board != on_board {
                continue;
            }
            // Closed at this iteration
            let Some((departure_time, time)) = access_times(ctx.calc, access, iteration_time)
            else {
                continue;
            };
            let arrival = Arrival {
                stop: access.stop,
                round,
                time,
                time_penalty: access.time_penalty,
                c1: access.c1,
                via: 0,
                groups: 0,
                on_board,
                kind: ArrivalKind::Access {
                    index,
                    departure_time,
                },
                previous: None,
            };
            self.strategy.add_arrival(ctx, arrival);
        }
    }

    fn scan_patterns(&mut self, round: usize) {
        let ctx = self.ctx;
        let patterns: BTreeSet<PatternIndex> = self
            .strategy
            .touched_last_round()
            .iter()
            .flat_map(|&stop| ctx.data.patterns_for_stop(stop).iter().copied())
            .collect();

        for pattern_index in patterns {
            let pattern = ctx.data.pattern(pattern_index);
            if !ctx.request.allows_pattern(pattern) {
                continue;
            }
            self.strategy.prepare_pattern(ctx, pattern_index);
            for pos in ctx.calc.positions(pattern.len()) {
                self.strategy.pass_through(ctx, pattern.stop(pos));
                if ctx.request.wheelchair_accessible && !pattern.position(pos).wheelchair_accessible {
                    continue;
                }
                // Alight first: a rider never gets off where they got on
                if ctx.calc.alighting_possible(pattern, pos) {
                    self.strategy.alight(ctx, pattern_index, pos, round);
                }
                if ctx.calc.boarding_possible(pattern, pos) {
                    self.strategy.board(ctx, pattern_index, pos, round);
                }
            }
        }
    }
}

/// Whether another round follows the completed round `round`.
fn has_more_rounds(round: usize, touched: usize, max_access_rides: usize, max_rounds: usize) -> bool {
    round < max_access_rides || (touched > 0 && round < max_rounds)
}
