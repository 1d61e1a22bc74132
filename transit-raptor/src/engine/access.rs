//! Access and egress timing in search time.
//!
//! In a forward search an access leaves the origin at the iteration time
//! (or when it opens) and an egress leaves the stop when the rider is
//! ready. A reverse search mirrors both: its "access" is the request's
//! egress, anchored at the iteration's arrival time.

use crate::domain::AccessEgress;

use super::TransitCalculator;

/// Origin time and label time at the stop for an access used at
/// `iteration_time`; the label time includes the time penalty.
///
/// Returns `None` when the path is closed.
pub(crate) fn access_times(
    calc: TransitCalculator,
    access: &AccessEgress,
    iteration_time: i32,
) -> Option<(i32, i32)> {
    if calc.forward() {
        let departure = access.earliest_departure_time(iteration_time)?;
        Some((departure, departure + access.duration_with_penalty()))
    } else {
        let arrival = access.latest_arrival_time(iteration_time)?;
        Some((arrival, arrival - access.duration_with_penalty()))
    }
}

/// Stop-side and destination-side times of an egress used by a rider
/// ready at the stop at `ready`.
pub(crate) fn egress_times(
    calc: TransitCalculator,
    egress: &AccessEgress,
    ready: i32,
) -> Option<(i32, i32)> {
    if calc.forward() {
        let departure = egress.earliest_departure_time(ready)?;
        Some((departure, departure + egress.duration))
    } else {
        let arrival = egress.latest_arrival_time(ready)?;
        Some((arrival, arrival - egress.duration))
    }
}

/// Wait charged to the first boarding after an access.
///
/// The access is shifted as close to the boarding as its opening hours
/// allow, so the wait is the boarding slack plus whatever the opening
/// hours force. Falls back to the label time when no shift is possible.
pub(crate) fn access_wait(
    calc: TransitCalculator,
    access: &AccessEgress,
    label_time: i32,
    board_time: i32,
    slack: i32,
) -> i32 {
    let target = calc.minus(board_time, slack);
    let shifted = if calc.forward() {
        access.latest_arrival_time(target)
    } else {
        access.earliest_departure_time(target)
    };
    let at_stop = shifted
        .filter(|&t| calc.is_before_or_equal(label_time, t))
        .unwrap_or(label_time);
    calc.duration(at_stop, board_time).max(0)
}
