//! Boarding search with transfer constraints.
//!
//! The regular rule boards the first trip departing (in search order) at or
//! after the rider is ready, slack included. When the incoming trip has a
//! constraint towards some trip of the pattern at this stop, the trips are
//! instead walked in order from the incoming alight time and each one is
//! checked against its constraint.

use crate::domain::{PatternIndex, StopIndex, TransferConstraint, TripRef};

use super::{ArrivalArena, ArrivalId, ArrivalKind, SearchContext};

/// A trip chosen for boarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Boarding {
    pub trip: usize,
    pub time: i32,
    pub constraint: Option<TransferConstraint>,
    /// For a constrained boarding, when the rider reached the stop from
    /// the incoming trip, alight slack excluded
    pub connected_at: Option<i32>,
}

/// Find the trip to board at `pos` for the label `previous`.
///
/// `earliest` is the label time plus the applicable slack. `bound` is the
/// trip already ridden on this scan; only better trips are returned.
pub(crate) fn find_boarding(
    ctx: &SearchContext<'_>,
    arena: &ArrivalArena,
    pattern: PatternIndex,
    pos: usize,
    previous: ArrivalId,
    earliest: i32,
    bound: Option<usize>,
) -> Option<Boarding> {
    let stop = ctx.data.pattern(pattern).stop(pos);
    if ctx.use_constraints && ctx.data.has_constrained_transfers(pattern, stop, ctx.forward()) {
        if let Some((source, walked)) = arena.previous_transit(previous) {
            if let ArrivalKind::Transit {
                trip, alight_time, ..
            } = source.kind
            {
                let incoming = Incoming {
                    trip,
                    stop: source.stop,
                    alight_time,
                    walked,
                };
                return constrained_boarding(ctx, pattern, pos, stop, incoming, earliest, bound);
            }
        }
    }
    regular_boarding(ctx, pattern, pos, earliest, bound)
}

fn regular_boarding(
    ctx: &SearchContext<'_>,
    pattern: PatternIndex,
    pos: usize,
    earliest: i32,
    bound: Option<usize>,
) -> Option<Boarding> {
    let trips = ctx.data.trips(pattern);
    let trip = ctx.calc.find_trip(trips, pos, earliest, bound)?;
    Some(Boarding {
        trip,
        time: ctx.calc.board_time(&trips[trip], pos),
        constraint: None,
        connected_at: None,
    })
}

/// The trip a rider arrives on, in search order.
struct Incoming {
    trip: TripRef,
    stop: StopIndex,
    alight_time: i32,
    walked: i32,
}

fn constrained_boarding(
    ctx: &SearchContext<'_>,
    pattern: PatternIndex,
    pos: usize,
    stop: StopIndex,
    incoming: Incoming,
    earliest: i32,
    bound: Option<usize>,
) -> Option<Boarding> {
    let calc = ctx.calc;
    let trips = ctx.data.trips(pattern);
    let seated = incoming.walked == 0 && incoming.stop == stop;
    let walked_to = calc.plus(incoming.alight_time, incoming.walked);
    let first = calc.find_trip(trips, pos, incoming.alight_time, None)?;

    for trip in calc.trips_from(trips.len(), first) {
        if bound.is_some_and(|b| !calc.trip_better(trip, b)) {
            break;
        }
        let time = calc.board_time(&trips[trip], pos);
        let constraint = calc.constraint(
            ctx.data,
            incoming.trip,
            incoming.stop,
            TripRef::new(pattern, trip),
            stop,
        );
        let boarding = |constraint: Option<TransferConstraint>| {
            Some(Boarding {
                trip,
                time,
                constraint,
                connected_at: constraint.map(|_| walked_to),
            })
        };
        match constraint {
            Some(TransferConstraint::NotAllowed) => continue,
            Some(c @ TransferConstraint::StaySeated) if seated => {
                if calc.is_before_or_equal(walked_to, time) {
                    return boarding(Some(c));
                }
            }
            Some(c @ TransferConstraint::Guaranteed) => {
                if calc.is_before_or_equal(walked_to, time) {
                    return boarding(Some(c));
                }
                continue;
            }
            Some(c @ TransferConstraint::MinTransferTime(min)) => {
                if calc.is_before_or_equal(calc.plus(walked_to, min), time) {
                    return boarding(Some(c));
                }
                continue;
            }
            _ => {}
        }
        if calc.is_before_or_equal(earliest, time) {
            return boarding(None);
        }
    }
    None
}
