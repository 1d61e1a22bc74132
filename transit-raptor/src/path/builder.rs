//! Path assembly.
//!
//! A destination arrival is turned into a `Path` by walking its label chain
//! back through the arena. The chain is first flattened into steps in real
//! time order (a reverse search stores its chain the other way round), then
//! the steps are timed and costed from scratch:
//!
//! - the access is moved as late as possible before the first ride
//! - a transfer starts when the rider has alighted, alight slack included
//! - the egress leaves as soon as the rider is ready
//!
//! Costs are recomputed from the final leg times, so the path cost is the
//! sum of its leg costs whichever direction the search ran.

use crate::domain::{AccessEgress, StopIndex, TransferConstraint, TripRef};
use crate::engine::{Arrival, ArrivalArena, ArrivalId, ArrivalKind, SearchContext};

use super::{AccessEgressLeg, Path, PathLeg, TransferLeg, TransitLeg};

/// A path element in real time order, before timing.
#[derive(Debug, Clone, Copy)]
enum Step<'s> {
    Access(&'s AccessEgress),
    Transit {
        trip: TripRef,
        board_pos: usize,
        alight_pos: usize,
        /// Constraint used to board this trip
        boarded_with: Option<TransferConstraint>,
        /// Constraint used to board the next trip from this one
        to_next: Option<TransferConstraint>,
    },
    Transfer {
        from: StopIndex,
        to: StopIndex,
        duration: i32,
        c1: i32,
    },
    Wait(i32),
    Egress(&'s AccessEgress),
}

pub(crate) struct PathBuilder<'c, 'a> {
    ctx: &'c SearchContext<'a>,
    arena: &'c ArrivalArena,
}

impl<'c, 'a> PathBuilder<'c, 'a> {
    pub fn new(ctx: &'c SearchContext<'a>, arena: &'c ArrivalArena) -> Self {
        Self { ctx, arena }
    }

    /// Build the path ending with label `last` and egress `egress`.
    ///
    /// # Panics
    ///
    /// Panics when the chain does not start at an access, and, unless the
    /// search runs the min-travel-duration profile, when the timed path
    /// has a negative leg, decreasing times or two consecutive legs that
    /// cannot follow each other.
    pub fn build(&self, last: ArrivalId, egress: usize, iteration_time: i32) -> Path {
        let chain = self.arena.chain(last);
        let steps = if self.ctx.forward() {
            self.forward_steps(&chain, egress)
        } else {
            self.reverse_steps(&chain, egress)
        };
        let path = self.assemble(&steps, iteration_time);
        if self.ctx.strict_paths {
            validate(&path);
        }
        path
    }

    fn forward_steps(&self, chain: &[&Arrival], egress: usize) -> Vec<Step<'c>> {
        let mut steps: Vec<Step<'c>> = Vec::with_capacity(chain.len() + 1);
        for arrival in chain.iter().rev() {
            let step = match arrival.kind {
                ArrivalKind::Access { index, .. } => Step::Access(&self.ctx.access[index]),
                ArrivalKind::Transit {
                    trip,
                    board_pos,
                    alight_pos,
                    constraint,
                    ..
                } => {
                    if constraint.is_some() {
                        let previous = steps.iter_mut().rev().find_map(|s| match s {
                            Step::Transit { to_next, .. } => Some(to_next),
                            _ => None,
                        });
                        if let Some(to_next) = previous {
                            *to_next = constraint;
                        }
                    }
                    Step::Transit {
                        trip,
                        board_pos,
                        alight_pos,
                        boarded_with: constraint,
                        to_next: None,
                    }
                }
                ArrivalKind::Transfer {
                    from_stop,
                    duration,
                    c1,
                    ..
                } => Step::Transfer {
                    from: from_stop,
                    to: arrival.stop,
                    duration,
                    c1,
                },
                ArrivalKind::ViaWait { wait } => Step::Wait(wait),
            };
            steps.push(step);
        }
        steps.push(Step::Egress(&self.ctx.egress[egress]));
        steps
    }

    /// A reverse chain, last label first, is already in real order. The
    /// search access is the real egress and the search egress the real
    /// access; rides and walks run the other way.
    fn reverse_steps(&self, chain: &[&Arrival], egress: usize) -> Vec<Step<'c>> {
        let mut steps: Vec<Step<'c>> = Vec::with_capacity(chain.len() + 1);
        steps.push(Step::Access(&self.ctx.egress[egress]));
        let mut pending = None;
        for arrival in chain {
            let step = match arrival.kind {
                ArrivalKind::Access { index, .. } => Step::Egress(&self.ctx.access[index]),
                ArrivalKind::Transit {
                    trip,
                    board_pos,
                    alight_pos,
                    constraint,
                    ..
                } => {
                    let boarded_with = std::mem::replace(&mut pending, constraint);
                    Step::Transit {
                        trip,
                        board_pos: alight_pos,
                        alight_pos: board_pos,
                        boarded_with,
                        to_next: constraint,
                    }
                }
                ArrivalKind::Transfer {
                    from_stop,
                    duration,
                    c1,
                    ..
                } => Step::Transfer {
                    from: arrival.stop,
                    to: from_stop,
                    duration,
                    c1,
                },
                ArrivalKind::ViaWait { wait } => Step::Wait(wait),
            };
            steps.push(step);
        }
        steps
    }

    /// Time at which the access reaches its stop.
    fn access_arrival(&self, steps: &[Step<'_>], access: &AccessEgress, egress: &AccessEgress, iteration_time: i32) -> i32 {
        let data = self.ctx.data;
        let slack = self.ctx.slack;
        let first_transit = steps.iter().position(|s| matches!(s, Step::Transit { .. }));

        let target = match first_transit {
            Some(k) => {
                let Step::Transit { trip, board_pos, .. } = steps[k] else {
                    unreachable!("position matched a transit step");
                };
                let pattern = data.pattern(trip.pattern);
                let board = data.trips(trip.pattern)[trip.trip].departure(board_pos);
                let mut target = board - slack.board_slack(pattern.slack_index());
                if access.has_rides() {
                    target -= slack.transfer_slack();
                }
                target - time_between(&steps[1..k])
            }
            None if self.ctx.forward() => {
                let departure = access
                    .earliest_departure_time(iteration_time)
                    .unwrap_or_else(|| panic!("access at stop {} is closed", access.stop));
                return departure + access.duration;
            }
            None => {
                let end = egress
                    .latest_arrival_time(iteration_time)
                    .unwrap_or_else(|| panic!("egress at stop {} is closed", egress.stop));
                let mut target = end - egress.duration;
                if egress.has_rides() {
                    target -= slack.transfer_slack();
                }
                target - time_between(&steps[1..steps.len() - 1])
            }
        };
        access
            .latest_arrival_time(target)
            .unwrap_or_else(|| panic!("access at stop {} cannot reach {target}", access.stop))
    }

    fn assemble(&self, steps: &[Step<'_>], iteration_time: i32) -> Path {
        let (Some(Step::Access(access)), Some(Step::Egress(egress))) = (steps.first(), steps.last())
        else {
            panic!("path must start with an access and end with an egress: {steps:?}");
        };
        let (access, egress) = (*access, *egress);
        let data = self.ctx.data;
        let slack = self.ctx.slack;
        let cost = self.ctx.cost;

        let access_end = self.access_arrival(steps, access, egress, iteration_time);
        let mut legs = Vec::with_capacity(steps.len());
        legs.push(PathLeg::Access(AccessEgressLeg {
            path: access.clone(),
            from_time: access_end - access.duration,
            to_time: access_end,
            c1: access.c1,
        }));

        // Earliest time for the next activity, and start of the wait
        // charged to the next boarding or egress
        let mut cursor = access_end;
        let mut wait_from = access_end;
        let mut last_alight = access_end;
        let mut first_boarding = !access.has_rides();
        let mut rides = 0usize;
        let mut stay_seated = 0usize;
        let mut groups = 0u32;

        for step in &steps[1..steps.len() - 1] {
            match *step {
                Step::Transfer {
                    from,
                    to,
                    duration,
                    c1,
                } => {
                    legs.push(PathLeg::Transfer(TransferLeg {
                        from_stop: from,
                        to_stop: to,
                        from_time: cursor,
                        to_time: cursor + duration,
                        c1,
                    }));
                    cursor += duration;
                    wait_from = cursor;
                }
                Step::Wait(wait) => cursor += wait,
                Step::Transit {
                    trip,
                    board_pos,
                    alight_pos,
                    boarded_with,
                    to_next,
                } => {
                    let pattern = data.pattern(trip.pattern);
                    let schedule = &data.trips(trip.pattern)[trip.trip];
                    let from_time = schedule.departure(board_pos);
                    let to_time = schedule.arrival(alight_pos);

                    // A constrained connection is timed from the alighting
                    // itself, not from the end of the alight slack
                    if boarded_with.is_some_and(TransferConstraint::ignores_slack) {
                        wait_from = last_alight;
                        if let Some(PathLeg::Transfer(walk)) = legs.last_mut() {
                            let duration = walk.to_time - walk.from_time;
                            walk.from_time = last_alight;
                            walk.to_time = last_alight + duration;
                            wait_from = walk.to_time;
                        }
                    }
                    // Time-shifted min-travel-duration boardings may leave
                    // before the rider is ready
                    let wait = match from_time - wait_from {
                        w if self.ctx.strict_paths => w,
                        w => w.max(0),
                    };

                    let alight_slack = slack.alight_slack(pattern.slack_index());
                    let board_stop = pattern.stop(board_pos);
                    let alight_stop = pattern.stop(alight_pos);
                    let board_cost = cost.boarding_cost(
                        first_boarding,
                        wait,
                        board_stop,
                        pattern,
                        boarded_with,
                    );
                    let c1 = cost.transit_arrival_cost(
                        board_cost,
                        alight_slack,
                        to_time - from_time,
                        pattern,
                        alight_stop,
                    );
                    if let Some(g) = self.ctx.groups {
                        groups = g.merge(groups, g.group(pattern));
                    }
                    if boarded_with.is_some_and(TransferConstraint::is_stay_seated) {
                        stay_seated += 1;
                    }
                    legs.push(PathLeg::Transit(TransitLeg {
                        trip,
                        route: pattern.name().to_string(),
                        mode: pattern.mode(),
                        board_stop,
                        alight_stop,
                        board_pos,
                        alight_pos,
                        from_time,
                        to_time,
                        c1,
                        constraint: to_next,
                    }));
                    first_boarding = false;
                    rides += 1;
                    last_alight = to_time;
                    cursor = to_time + alight_slack;
                    wait_from = cursor;
                }
                Step::Access(_) | Step::Egress(_) => {
                    panic!("access or egress in the middle of a path: {steps:?}")
                }
            }
        }

        let mut ready = cursor;
        if egress.has_rides() {
            ready += slack.transfer_slack();
        }
        let egress_start = egress
            .earliest_departure_time(ready)
            .unwrap_or_else(|| panic!("egress at stop {} is closed", egress.stop));
        legs.push(PathLeg::Egress(AccessEgressLeg {
            path: egress.clone(),
            from_time: egress_start,
            to_time: egress_start + egress.duration,
            c1: cost.egress_cost(egress) + cost.wait_cost(egress_start - wait_from),
        }));

        let total_rides = rides + access.rides as usize + egress.rides as usize;
        Path {
            iteration_departure_time: iteration_time,
            start_time: legs[0].from_time(),
            end_time: legs[legs.len() - 1].to_time(),
            c1: legs.iter().map(PathLeg::c1).sum(),
            number_of_transfers: total_rides.saturating_sub(1).saturating_sub(stay_seated),
            time_penalty: access.time_penalty + egress.time_penalty,
            groups,
            legs,
        }
    }
}

/// Walking and via waiting time in `steps`.
fn time_between(steps: &[Step<'_>]) -> i32 {
    steps
        .iter()
        .map(|s| match *s {
            Step::Transfer { duration, .. } => duration,
            Step::Wait(wait) => wait,
            _ => 0,
        })
        .sum()
}

fn can_follow(a: &PathLeg, b: &PathLeg) -> bool {
    match (a, b) {
        (PathLeg::Transit(_), _) | (_, PathLeg::Transit(_)) => true,
        (PathLeg::Access(access), PathLeg::Transfer(_)) => access.path.stop_reached_on_board,
        (PathLeg::Transfer(_), PathLeg::Egress(egress)) => egress.path.stop_reached_on_board,
        (PathLeg::Access(access), PathLeg::Egress(egress)) => {
            access.path.stop_reached_on_board || egress.path.stop_reached_on_board
        }
        _ => false,
    }
}

fn validate(path: &Path) {
    for leg in &path.legs {
        assert!(
            leg.to_time() >= leg.from_time(),
            "negative leg duration in {path}: {leg:?}"
        );
    }
    for pair in path.legs.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            b.from_time() >= a.to_time(),
            "time goes backwards in {path}: {a:?} then {b:?}"
        );
        assert!(can_follow(a, b), "illegal leg sequence in {path}: {a:?} then {b:?}");
    }
}
