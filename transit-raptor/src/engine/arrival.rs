//! Stop arrivals and their arena.
//!
//! Every accepted label is appended to an `ArrivalArena` and never moved or
//! removed. Labels point at their predecessor by `ArrivalId`, so many bag
//! entries can share an ancestor and path reconstruction is a walk back
//! through the arena.

use crate::domain::{StopIndex, TransferConstraint, TripRef};

/// Index of an arrival in an arena, tagged with the arena generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ArrivalId {
    index: u32,
    generation: u32,
}

/// How a stop was reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ArrivalKind {
    /// Access path `index`, leaving the origin at `departure_time`
    Access { index: usize, departure_time: i32 },
    /// A ride; positions and times are in search order
    Transit {
        trip: TripRef,
        board_pos: usize,
        alight_pos: usize,
        board_time: i32,
        alight_time: i32,
        /// Constraint used to board this trip from the previous one
        constraint: Option<TransferConstraint>,
    },
    /// A walk from `from_stop`; `via_transfer` marks a via connection
    Transfer {
        from_stop: StopIndex,
        duration: i32,
        c1: i32,
        via_transfer: bool,
    },
    /// Minimum wait at a via visit
    ViaWait { wait: i32 },
}

/// A label: one way of being at a stop at a given search time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Arrival {
    pub stop: StopIndex,
    /// Rides so far, access rides included
    pub round: usize,
    /// Search time at the stop; before the first ride it includes the
    /// access time penalty
    pub time: i32,
    /// Accumulated access penalty
    pub time_penalty: i32,
    pub c1: i32,
    /// Number of via locations satisfied
    pub via: u8,
    /// Merged priority-group code
    pub groups: u32,
    /// Arrived on board a vehicle (transit, or an access ending in a ride)
    pub on_board: bool,
    pub kind: ArrivalKind,
    pub previous: Option<ArrivalId>,
}

impl Arrival {
    /// Time with the access penalty removed, used against hard limits.
    pub fn real_time(&self, forward: bool) -> i32 {
        if forward {
            self.time - self.time_penalty
        } else {
            self.time + self.time_penalty
        }
    }
}

/// Append-only store of arrivals for one search.
#[derive(Debug, Default)]
pub(crate) struct ArrivalArena {
    arrivals: Vec<Arrival>,
    generation: u32,
}

impl ArrivalArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every arrival but keep the allocation; ids handed out before
    /// this call become invalid.
    pub fn recycle(mut self) -> Self {
        self.arrivals.clear();
        self.generation = self.generation.wrapping_add(1);
        self
    }

    /// Id the next pushed arrival will get.
    pub fn next_id(&self) -> ArrivalId {
        ArrivalId {
            index: u32::try_from(self.arrivals.len()).unwrap_or(u32::MAX),
            generation: self.generation,
        }
    }

    pub fn push(&mut self, arrival: Arrival) -> ArrivalId {
        let id = self.next_id();
        assert!(id.index < u32::MAX, "arrival arena is full");
        self.arrivals.push(arrival);
        id
    }

    pub fn get(&self, id: ArrivalId) -> &Arrival {
        debug_assert_eq!(id.generation, self.generation, "stale arrival id");
        &self.arrivals[id.index as usize]
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    /// The chain ending at `id`, last arrival first.
    pub fn chain(&self, id: ArrivalId) -> Vec<&Arrival> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(id) = next {
            let arrival = self.get(id);
            chain.push(arrival);
            next = arrival.previous;
        }
        chain
    }

    /// The transit arrival `id` was reached from, skipping via waits, with
    /// the walking time in between.
    ///
    /// Returns `None` when the chain reaches an access before any ride.
    pub fn previous_transit(&self, id: ArrivalId) -> Option<(&Arrival, i32)> {
        let mut walked = 0;
        let mut current = self.get(id);
        loop {
            match current.kind {
                ArrivalKind::Transit { .. } => return Some((current, walked)),
                ArrivalKind::Transfer { duration, .. } => walked += duration,
                ArrivalKind::ViaWait { .. } => {}
                ArrivalKind::Access { .. } => return None,
            }
            current = self.get(current.previous?);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn access(stop: StopIndex) -> Arrival {
        Arrival {
            stop,
            round: 0,
            time: 100,
            time_penalty: 0,
            c1: 0,
            via: 0,
            groups: 0,
            on_board: false,
            kind: ArrivalKind::Access {
                index: 0,
                departure_time: 40,
            },
            previous: None,
        }
    }

    fn ride(stop: StopIndex, previous: ArrivalId) -> Arrival {
        Arrival {
            round: 1,
            time: 500,
            on_board: true,
            kind: ArrivalKind::Transit {
                trip: TripRef::new(0, 0),
                board_pos: 0,
                alight_pos: 1,
                board_time: 200,
                alight_time: 500,
                constraint: None,
            },
            previous: Some(previous),
            ..access(stop)
        }
    }

    #[test]
    fn chain_walks_back_to_access() {
        let mut arena = ArrivalArena::new();
        let a = arena.push(access(0));
        let r = arena.push(ride(1, a));
        let t = arena.push(Arrival {
            stop: 2,
            time: 560,
            on_board: false,
            kind: ArrivalKind::Transfer {
                from_stop: 1,
                duration: 60,
                c1: 0,
                via_transfer: false,
            },
            previous: Some(r),
            ..access(2)
        });

        let stops: Vec<_> = arena.chain(t).iter().map(|a| a.stop).collect();
        assert_eq!(stops, vec![2, 1, 0]);
        assert_eq!(arena.len(), 3);

        let (transit, walked) = arena.previous_transit(t).unwrap();
        assert_eq!(transit.stop, 1);
        assert_eq!(walked, 60);
        assert!(arena.previous_transit(a).is_none());
    }

    #[test]
    fn real_time_removes_penalty() {
        let arrival = Arrival {
            time_penalty: 60,
            ..access(0)
        };
        assert_eq!(arrival.real_time(true), 40);
        assert_eq!(arrival.real_time(false), 160);
    }

    #[test]
    fn recycle_starts_new_generation() {
        let mut arena = ArrivalArena::new();
        let old = arena.push(access(0));
        let arena = arena.recycle();
        assert_eq!(arena.len(), 0);
        assert_ne!(arena.next_id(), old);
    }
}
