//! Multi-criteria strategy (McRAPTOR).
//!
//! Each stop keeps a bag of mutually non-dominated labels over all rounds.
//! A scan rides a pareto set of riders along the pattern: every label of
//! the previous round boards its own trip, and riders are only dropped
//! when another rider on an earlier-or-equal trip is at least as good in
//! every other criterion.
//!
//! Via locations are tracked per label as the index of the next unmet
//! location (C2a). Priority groups are merged per boarding into one code
//! (C2b); labels with different codes compare their cost with the group
//! relax function.

use crate::domain::{PatternIndex, StopIndex, TransferConstraint, TripRef};
use crate::request::RelaxFunction;

use super::access::access_wait;
use super::pareto::ParetoSet;
use super::trip_search::find_boarding;
use super::worker::{Labels, RoutingStrategy, StopSet};
use super::{Arrival, ArrivalArena, ArrivalId, ArrivalKind, SearchContext, TransitCalculator};

/// The criteria of a label at a stop.
#[derive(Debug, Clone, Copy)]
struct BagEntry {
    id: ArrivalId,
    time: i32,
    /// `2 * round`, plus one when the stop was reached by walking
    pareto_round: usize,
    c1: i32,
    via: u8,
    groups: u32,
    round: usize,
    iteration: u32,
    on_board: bool,
}

#[derive(Debug, Clone, Copy)]
struct StopDominance {
    calc: TransitCalculator,
    group_relax: Option<RelaxFunction>,
}

impl StopDominance {
    fn left_dominance(&self, l: &BagEntry, r: &BagEntry) -> bool {
        if self.calc.is_before(l.time, r.time) || l.pareto_round < r.pareto_round || l.via > r.via {
            return true;
        }
        match self.group_relax {
            Some(relax) if l.groups != r.groups => l.c1 < relax.relax(r.c1),
            _ => l.c1 < r.c1,
        }
    }
}

/// A rider on the pattern being scanned.
#[derive(Debug, Clone, Copy)]
struct McRide {
    trip: usize,
    board_pos: usize,
    board_time: i32,
    previous: ArrivalId,
    constraint: Option<TransferConstraint>,
    board_c1: i32,
    /// Board cost minus the in-vehicle cost up to the board time, so
    /// riders boarding the same trip at different stops compare fairly
    relative_c1: i64,
    via: u8,
    groups: u32,
}

pub(crate) struct McState {
    labels: Labels,
    bags: Vec<ParetoSet<BagEntry>>,
    dominance: StopDominance,
    rides: ParetoSet<McRide>,
    iteration: u32,
    touched_prev: StopSet,
    touched: StopSet,
    touched_transit: StopSet,
}

impl McState {
    pub fn new(ctx: &SearchContext<'_>, arena: ArrivalArena) -> Self {
        let stops = ctx.data.number_of_stops();
        Self {
            labels: Labels::new(ctx, arena),
            bags: (0..stops).map(|_| ParetoSet::new()).collect(),
            dominance: StopDominance {
                calc: ctx.calc,
                group_relax: ctx.groups.map(|g| g.relax_c1()),
            },
            rides: ParetoSet::new(),
            iteration: 0,
            touched_prev: StopSet::new(stops),
            touched: StopSet::new(stops),
            touched_transit: StopSet::new(stops),
        }
    }

    fn accept(&mut self, ctx: &SearchContext<'_>, arrival: Arrival) {
        let stop = arrival.stop;
        if arrival.round > ctx.max_rounds
            || ctx.prune(stop, arrival.real_time(ctx.forward()), arrival.round)
        {
            return;
        }
        let entry = BagEntry {
            id: self.labels.arena.next_id(),
            time: arrival.time,
            pareto_round: 2 * arrival.round + usize::from(!arrival.on_board),
            c1: arrival.c1,
            via: arrival.via,
            groups: arrival.groups,
            round: arrival.round,
            iteration: self.iteration,
            on_board: arrival.on_board,
        };
        let dominance = self.dominance;
        let cmp = |l: &BagEntry, r: &BagEntry| dominance.left_dominance(l, r);
        if !self.bags[stop].add(entry, &cmp) {
            return;
        }
        let on_board = arrival.on_board;
        let id = self.labels.push(ctx, arrival);
        self.touched.insert(stop);
        if on_board {
            self.touched_transit.insert(stop);
        }
        self.advance_via(ctx, id);
    }

    /// Satisfy the next via location with the label `id`, if it can.
    fn advance_via(&mut self, ctx: &SearchContext<'_>, id: ArrivalId) {
        let label = self.labels.arena.get(id).clone();
        let Some(via) = ctx.via.get(usize::from(label.via)) else {
            return;
        };
        let calc = ctx.calc;
        let wait = via.minimum_wait;
        let waited = |arrival: &Arrival, previous: ArrivalId| Arrival {
            time: calc.plus(arrival.time, wait),
            c1: arrival.c1 + ctx.cost.wait_cost(wait),
            via: arrival.via + 1,
            kind: ArrivalKind::ViaWait { wait },
            previous: Some(previous),
            ..arrival.clone()
        };

        if via.contains_stop(label.stop) {
            self.accept(ctx, waited(&label, id));
        }
        if !label.on_board {
            return;
        }
        for transfer in via.transfers().iter().filter(|t| t.from_stop == label.stop) {
            let walked = Arrival {
                stop: transfer.to_stop,
                time: calc.plus(label.time, transfer.duration),
                c1: label.c1 + transfer.c1,
                on_board: false,
                kind: ArrivalKind::Transfer {
                    from_stop: label.stop,
                    duration: transfer.duration,
                    c1: transfer.c1,
                    via_transfer: true,
                },
                previous: Some(id),
                ..label.clone()
            };
            if wait > 0 {
                // The walk itself is never a bag member; only the wait
                // after it completes the visit
                let walk_id = self.labels.arena.push(walked.clone());
                self.accept(ctx, waited(&walked, walk_id));
            } else {
                self.accept(
                    ctx,
                    Arrival {
                        via: label.via + 1,
                        ..walked
                    },
                );
            }
        }
    }

    /// Labels of `round` at `stop` created in this iteration.
    fn current_labels(&self, stop: StopIndex, round: usize, on_board_only: bool) -> Vec<ArrivalId> {
        self.bags[stop]
            .iter()
            .filter(|e| {
                e.round == round && e.iteration == self.iteration && (e.on_board || !on_board_only)
            })
            .map(|e| e.id)
            .collect()
    }
}

fn ride_dominance(calc: TransitCalculator) -> impl Fn(&McRide, &McRide) -> bool {
    move |l, r| {
        calc.trip_better(l.trip, r.trip)
            || l.relative_c1 < r.relative_c1
            || l.via > r.via
            || l.groups != r.groups
    }
}

impl RoutingStrategy for McState {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn into_labels(self) -> Labels {
        self.labels
    }

    fn setup_iteration(&mut self, _ctx: &SearchContext<'_>, iteration_time: i32) {
        self.labels.iteration_time = iteration_time;
        self.iteration += 1;
        self.touched_prev.clear();
        self.touched.clear();
        self.touched_transit.clear();
        self.rides.clear();
    }

    fn add_arrival(&mut self, ctx: &SearchContext<'_>, arrival: Arrival) {
        self.accept(ctx, arrival);
    }

    fn touched_last_round(&self) -> &[StopIndex] {
        self.touched_prev.stops()
    }

    fn prepare_pattern(&mut self, _ctx: &SearchContext<'_>, _pattern: PatternIndex) {
        self.rides.clear();
    }

    fn pass_through(&mut self, ctx: &SearchContext<'_>, stop: StopIndex) {
        for ride in self.rides.iter_mut() {
            while let Some(via) = ctx.via.get(usize::from(ride.via)) {
                if !(via.is_pass_through() && via.contains_stop(stop)) {
                    break;
                }
                ride.via += 1;
            }
        }
    }

    fn alight(&mut self, ctx: &SearchContext<'_>, pattern: PatternIndex, pos: usize, round: usize) {
        if self.rides.is_empty() {
            return;
        }
        let calc = ctx.calc;
        let p = ctx.data.pattern(pattern);
        let trips = ctx.data.trips(pattern);
        let stop = p.stop(pos);
        let alight_slack = calc.alight_slack(ctx.slack, p);

        let arrivals: Vec<Arrival> = self
            .rides
            .iter()
            .map(|ride| {
                let alight_time = calc.alight_time(&trips[ride.trip], pos);
                let c1 = ctx.cost.transit_arrival_cost(
                    ride.board_c1,
                    alight_slack,
                    calc.duration(ride.board_time, alight_time),
                    p,
                    stop,
                );
                Arrival {
                    stop,
                    round,
                    time: calc.plus(alight_time, alight_slack),
                    time_penalty: 0,
                    c1,
                    via: ride.via,
                    groups: ride.groups,
                    on_board: true,
                    kind: ArrivalKind::Transit {
                        trip: TripRef::new(pattern, ride.trip),
                        board_pos: ride.board_pos,
                        alight_pos: pos,
                        board_time: ride.board_time,
                        alight_time,
                        constraint: ride.constraint,
                    },
                    previous: Some(ride.previous),
                }
            })
            .collect();
        for arrival in arrivals {
            self.accept(ctx, arrival);
        }
    }

    fn board(&mut self, ctx: &SearchContext<'_>, pattern: PatternIndex, pos: usize, round: usize) {
        let p = ctx.data.pattern(pattern);
        let stop = p.stop(pos);
        if !self.touched_prev.contains(stop) {
            return;
        }
        let calc = ctx.calc;
        let mut slack = calc.board_slack(ctx.slack, p);
        if round > 1 {
            slack += ctx.slack.transfer_slack();
        }
        let reluctance = ctx.cost.transit_reluctance(p);
        let cmp = ride_dominance(calc);

        for previous in self.current_labels(stop, round - 1, false) {
            let prev = self.labels.arena.get(previous);
            let earliest = calc.plus(prev.time, slack);
            let Some(boarding) =
                find_boarding(ctx, &self.labels.arena, pattern, pos, previous, earliest, None)
            else {
                continue;
            };
            let wait = match prev.kind {
                ArrivalKind::Access { index, .. } => access_wait(
                    calc,
                    &ctx.access[index],
                    prev.real_time(calc.forward()),
                    boarding.time,
                    slack,
                ),
                _ => calc.duration(boarding.connected_at.unwrap_or(prev.time), boarding.time),
            };
            let board_c1 = prev.c1
                + ctx
                    .cost
                    .boarding_cost(round == 1, wait, stop, p, boarding.constraint);
            let groups = ctx
                .groups
                .map_or(0, |g| g.merge(prev.groups, g.group(p)));
            let in_vehicle = (reluctance * f64::from(boarding.time) * 100.0).round() as i64;
            let ride = McRide {
                trip: boarding.trip,
                board_pos: pos,
                board_time: boarding.time,
                previous,
                constraint: boarding.constraint,
                board_c1,
                relative_c1: i64::from(board_c1) - i64::from(calc.sign()) * in_vehicle,
                via: prev.via,
                groups,
            };
            self.rides.add(ride, &cmp);
        }
    }

    fn relax_transfers(&mut self, ctx: &SearchContext<'_>, round: usize) {
        let calc = ctx.calc;
        let stops = self.touched_transit.stops().to_vec();
        for stop in stops {
            for id in self.current_labels(stop, round, true) {
                let source = self.labels.arena.get(id).clone();
                for transfer in calc.transfers(ctx.data, stop) {
                    let arrival = Arrival {
                        stop: transfer.stop,
                        time: calc.plus(source.time, transfer.duration),
                        c1: source.c1 + transfer.c1,
                        on_board: false,
                        kind: ArrivalKind::Transfer {
                            from_stop: stop,
                            duration: transfer.duration,
                            c1: transfer.c1,
                            via_transfer: false,
                        },
                        previous: Some(id),
                        ..source.clone()
                    };
                    self.accept(ctx, arrival);
                }
            }
        }
    }

    fn round_complete(&mut self) {
        std::mem::swap(&mut self.touched_prev, &mut self.touched);
        self.touched.clear();
        self.touched_transit.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::SearchDirection;

    fn entry(time: i32, round: usize, c1: i32) -> BagEntry {
        BagEntry {
            id: ArrivalArena::new().next_id(),
            time,
            pareto_round: 2 * round,
            c1,
            via: 0,
            groups: 0,
            round,
            iteration: 1,
            on_board: true,
        }
    }

    fn dominance(group_relax: Option<RelaxFunction>) -> StopDominance {
        StopDominance {
            calc: TransitCalculator::new(SearchDirection::Forward),
            group_relax,
        }
    }

    #[test]
    fn bag_keeps_time_cost_trade_offs() {
        let d = dominance(None);
        let cmp = |l: &BagEntry, r: &BagEntry| d.left_dominance(l, r);
        let mut bag = ParetoSet::new();
        assert!(bag.add(entry(100, 1, 500), &cmp));
        assert!(bag.add(entry(90, 1, 700), &cmp));
        assert!(!bag.add(entry(100, 1, 600), &cmp));
        // Fewer rides is an advantage on its own
        assert!(bag.add(entry(120, 0, 900), &cmp));
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn walking_arrival_ranks_after_on_board() {
        let d = dominance(None);
        let ride = entry(100, 1, 500);
        let walk = BagEntry {
            pareto_round: 3,
            on_board: false,
            ..ride
        };
        assert!(d.left_dominance(&ride, &walk));
        assert!(!d.left_dominance(&walk, &ride));
    }

    #[test]
    fn via_progress_is_an_advantage() {
        let d = dominance(None);
        let slow = entry(200, 2, 900);
        let fast = entry(100, 1, 100);
        let advanced = BagEntry { via: 1, ..slow };
        assert!(d.left_dominance(&advanced, &fast));
        assert!(!d.left_dominance(&slow, &fast));
    }

    #[test]
    fn groups_relax_cost() {
        let d = dominance(Some(RelaxFunction::new(1.5, 0)));
        let cheap = entry(100, 1, 1000);
        let dear = BagEntry {
            c1: 1400,
            groups: 2,
            ..cheap
        };
        assert!(d.left_dominance(&dear, &cheap));
        let same_group = BagEntry { groups: 0, ..dear };
        assert!(!d.left_dominance(&same_group, &cheap));
    }

    #[test]
    fn riders_on_later_trips_need_lower_relative_cost() {
        let cmp = ride_dominance(TransitCalculator::new(SearchDirection::Forward));
        let previous = ArrivalArena::new().next_id();
        let early = McRide {
            trip: 0,
            board_pos: 0,
            board_time: 100,
            previous,
            constraint: None,
            board_c1: 500,
            relative_c1: 400,
            via: 0,
            groups: 0,
        };
        let late_dear = McRide {
            trip: 1,
            relative_c1: 450,
            ..early
        };
        let late_cheap = McRide {
            trip: 1,
            relative_c1: 300,
            ..early
        };
        let mut rides = ParetoSet::new();
        rides.add(early, &cmp);
        assert!(!rides.add(late_dear, &cmp));
        assert!(rides.add(late_cheap, &cmp));
        assert_eq!(rides.len(), 2);
    }
}
