//! Destination arrivals.
//!
//! Every label inserted into a stop is checked against the egress paths at
//! that stop. An egress that can follow the label and reaches the
//! destination within the hard limit produces a path right away, while the
//! arena still holds the whole chain.

use crate::path::{Path, PathBuilder};

use super::access::egress_times;
use super::pareto::ParetoSet;
use super::{ArrivalArena, ArrivalId, SearchContext};

pub(crate) struct DestinationArrivals {
    paths: ParetoSet<Path>,
    /// Filter candidates as they arrive; only safe with a transitive
    /// comparator, otherwise every candidate is kept for the final merge
    filter: bool,
    reached: bool,
}

impl DestinationArrivals {
    pub fn new(ctx: &SearchContext<'_>) -> Self {
        Self {
            paths: ParetoSet::new(),
            filter: ctx.path_criteria.is_transitive(),
            reached: false,
        }
    }

    /// Whether any label reached the destination so far.
    pub fn reached(&self) -> bool {
        self.reached
    }

    pub fn take_paths(&mut self) -> Vec<Path> {
        std::mem::take(&mut self.paths).into_vec()
    }

    /// Try every egress at the stop of label `id`.
    pub fn arrive(
        &mut self,
        ctx: &SearchContext<'_>,
        arena: &ArrivalArena,
        id: ArrivalId,
        iteration_time: i32,
    ) {
        let arrival = arena.get(id);
        if usize::from(arrival.via) != ctx.via.len() {
            return;
        }
        for &index in ctx.egress_at(arrival.stop) {
            let egress = &ctx.egress[index];
            if !(egress.stop_reached_on_board || arrival.on_board) {
                continue;
            }
            if arrival.round + egress.rides as usize > ctx.max_rounds {
                continue;
            }
            let mut ready = arrival.real_time(ctx.forward());
            if egress.has_rides() {
                ready = ctx.calc.plus(ready, ctx.slack.transfer_slack());
            }
            let Some((_, end)) = egress_times(ctx.calc, egress, ready) else {
                continue;
            };
            if ctx.calc.exceeds_limit(end, ctx.limit) {
                continue;
            }
            self.reached = true;
            if ctx.collect_paths {
                let path = PathBuilder::new(ctx, arena).build(id, index, iteration_time);
                self.add(ctx, path);
            }
        }
    }

    fn add(&mut self, ctx: &SearchContext<'_>, path: Path) {
        if self.filter {
            let criteria = ctx.path_criteria;
            self.paths
                .add_keeping_equal(path, &|l: &Path, r: &Path| criteria.left_dominance(l, r));
        } else {
            self.paths.add_keeping_equal(path, &|_: &Path, _: &Path| true);
        }
    }
}
