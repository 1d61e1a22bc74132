//! Single-criterion strategy.
//!
//! Each stop keeps one label per round: the earliest arrival, plus the
//! earliest arrival on board when that is a different label, since only
//! an on-board arrival may continue with a walk. A label is kept when it
//! beats every label of the same or a lower round at its stop.
//!
//! The same state serves the min-travel-duration profile, where waiting is
//! free: a ride is timed as if its trip left the moment the rider was
//! ready, and is replaced further down the pattern whenever a trip can be
//! reached earlier in that virtual time.

use crate::domain::{PatternIndex, StopIndex, TransferConstraint, TripRef};

use super::trip_search::find_boarding;
use super::worker::{Labels, RoutingStrategy, StopSet};
use super::{Arrival, ArrivalArena, ArrivalId, ArrivalKind, SearchContext};

/// The trip currently ridden along the pattern being scanned.
#[derive(Debug, Clone, Copy)]
struct Ride {
    trip: usize,
    board_pos: usize,
    board_time: i32,
    previous: ArrivalId,
    constraint: Option<TransferConstraint>,
    /// Wait ignored by the min-travel-duration profile
    offset: i32,
}

pub(crate) struct StdState {
    labels: Labels,
    min_travel_duration: bool,
    /// Best label per round and stop
    arrivals: Vec<Vec<Option<ArrivalId>>>,
    /// Best on-board label per round and stop
    transit_arrivals: Vec<Vec<Option<ArrivalId>>>,
    /// Best time at the stop with at most `r` rides
    best: Vec<Vec<i32>>,
    best_on_board: Vec<Vec<i32>>,
    min_round: Vec<Option<usize>>,
    touched_prev: StopSet,
    touched: StopSet,
    touched_transit: StopSet,
    ride: Option<Ride>,
}

impl StdState {
    pub fn new(ctx: &SearchContext<'_>, arena: ArrivalArena, min_travel_duration: bool) -> Self {
        let stops = ctx.data.number_of_stops();
        let rounds = ctx.max_rounds + 1;
        let unreached = ctx.calc.unreached();
        Self {
            labels: Labels::new(ctx, arena),
            min_travel_duration,
            arrivals: vec![vec![None; stops]; rounds],
            transit_arrivals: vec![vec![None; stops]; rounds],
            best: vec![vec![unreached; stops]; rounds],
            best_on_board: vec![vec![unreached; stops]; rounds],
            min_round: vec![None; stops],
            touched_prev: StopSet::new(stops),
            touched: StopSet::new(stops),
            touched_transit: StopSet::new(stops),
            ride: None,
        }
    }

    /// Best time at every stop over all rounds.
    pub fn best_times(&self) -> &[i32] {
        &self.best[self.best.len() - 1]
    }

    /// First round each stop was reached in.
    pub fn min_rounds(&self) -> &[Option<usize>] {
        &self.min_round
    }

    fn accept(&mut self, ctx: &SearchContext<'_>, arrival: Arrival) {
        let calc = ctx.calc;
        let (stop, round, time) = (arrival.stop, arrival.round, arrival.time);
        if round > ctx.max_rounds || ctx.prune(stop, arrival.real_time(calc.forward()), round) {
            return;
        }
        let improves = calc.is_before(time, self.best[round][stop]);
        let improves_on_board =
            arrival.on_board && calc.is_before(time, self.best_on_board[round][stop]);
        if !improves && !improves_on_board {
            return;
        }

        let id = self.labels.push(ctx, arrival);
        if improves {
            for best in &mut self.best[round..] {
                if calc.is_before(time, best[stop]) {
                    best[stop] = time;
                }
            }
            self.arrivals[round][stop] = Some(id);
            self.touched.insert(stop);
        }
        if improves_on_board {
            for best in &mut self.best_on_board[round..] {
                if calc.is_before(time, best[stop]) {
                    best[stop] = time;
                }
            }
            self.transit_arrivals[round][stop] = Some(id);
            self.touched_transit.insert(stop);
        }
        if self.min_round[stop].is_none_or(|r| round < r) {
            self.min_round[stop] = Some(round);
        }
    }

    fn board_min_travel_duration(
        &mut self,
        ctx: &SearchContext<'_>,
        pattern: PatternIndex,
        pos: usize,
        previous: ArrivalId,
        earliest: i32,
    ) {
        let calc = ctx.calc;
        let trips = ctx.data.trips(pattern);
        if let Some(ride) = self.ride {
            let virtual_time = calc.minus(calc.board_time(&trips[ride.trip], pos), ride.offset);
            if !calc.is_before(earliest, virtual_time) {
                return;
            }
        }
        let Some(trip) = calc.find_trip(trips, pos, earliest, None) else {
            return;
        };
        let board_time = calc.board_time(&trips[trip], pos);
        self.ride = Some(Ride {
            trip,
            board_pos: pos,
            board_time,
            previous,
            constraint: None,
            offset: calc.duration(earliest, board_time),
        });
    }
}

impl RoutingStrategy for StdState {
    fn labels(&self) -> &Labels {
        &self.labels
    }

    fn into_labels(self) -> Labels {
        self.labels
    }

    fn setup_iteration(&mut self, _ctx: &SearchContext<'_>, iteration_time: i32) {
        self.labels.iteration_time = iteration_time;
        self.touched_prev.clear();
        self.touched.clear();
        self.touched_transit.clear();
        self.ride = None;
    }

    fn add_arrival(&mut self, ctx: &SearchContext<'_>, arrival: Arrival) {
        self.accept(ctx, arrival);
    }

    fn touched_last_round(&self) -> &[StopIndex] {
        self.touched_prev.stops()
    }

    fn prepare_pattern(&mut self, _ctx: &SearchContext<'_>, _pattern: PatternIndex) {
        self.ride = None;
    }

    fn alight(&mut self, ctx: &SearchContext<'_>, pattern: PatternIndex, pos: usize, round: usize) {
        let Some(ride) = self.ride else {
            return;
        };
        let calc = ctx.calc;
        let p = ctx.data.pattern(pattern);
        let alight_time = calc.alight_time(&ctx.data.trips(pattern)[ride.trip], pos);
        let arrival = Arrival {
            stop: p.stop(pos),
            round,
            time: calc.plus(
                calc.minus(alight_time, ride.offset),
                calc.alight_slack(ctx.slack, p),
            ),
            time_penalty: 0,
            c1: 0,
            via: 0,
            groups: 0,
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
        };
        self.accept(ctx, arrival);
    }

    fn board(&mut self, ctx: &SearchContext<'_>, pattern: PatternIndex, pos: usize, round: usize) {
        let p = ctx.data.pattern(pattern);
        let stop = p.stop(pos);
        if !self.touched_prev.contains(stop) {
            return;
        }
        let Some(previous) = self.arrivals[round - 1][stop] else {
            return;
        };
        let calc = ctx.calc;
        let mut slack = calc.board_slack(ctx.slack, p);
        if round > 1 {
            slack += ctx.slack.transfer_slack();
        }
        let earliest = calc.plus(self.labels.arena.get(previous).time, slack);

        if self.min_travel_duration {
            self.board_min_travel_duration(ctx, pattern, pos, previous, earliest);
            return;
        }
        let bound = self.ride.map(|r| r.trip);
        if let Some(boarding) =
            find_boarding(ctx, &self.labels.arena, pattern, pos, previous, earliest, bound)
        {
            self.ride = Some(Ride {
                trip: boarding.trip,
                board_pos: pos,
                board_time: boarding.time,
                previous,
                constraint: boarding.constraint,
                offset: 0,
            });
        }
    }

    fn relax_transfers(&mut self, ctx: &SearchContext<'_>, round: usize) {
        let calc = ctx.calc;
        let stops = self.touched_transit.stops().to_vec();
        for stop in stops {
            let Some(id) = self.transit_arrivals[round][stop] else {
                continue;
            };
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

    fn round_complete(&mut self) {
        std::mem::swap(&mut self.touched_prev, &mut self.touched);
        self.touched.clear();
        self.touched_transit.clear();
    }
}
