//! Via and pass-through locations.
//!
//! A journey must satisfy its via locations in the given order. A visit is
//! satisfied by arriving at one of its stops (or by walking one of its
//! transfers), a pass-through also by riding through one of its stops.

use serde::{Deserialize, Serialize};

use crate::domain::cost::{DEFAULT_WALK_RELUCTANCE, cost_from_secs_f64};
use crate::domain::StopIndex;

/// A street connection that satisfies a via location when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaTransfer {
    pub from_stop: StopIndex,
    pub to_stop: StopIndex,
    pub duration: i32,
    pub c1: i32,
}

impl ViaTransfer {
    /// A walk costed with the default walk reluctance.
    pub fn walk(from_stop: StopIndex, to_stop: StopIndex, duration: i32) -> Self {
        Self {
            from_stop,
            to_stop,
            duration,
            c1: cost_from_secs_f64(f64::from(duration) * DEFAULT_WALK_RELUCTANCE),
        }
    }

    /// The same connection seen from the other end.
    pub(crate) fn reversed(self) -> Self {
        Self {
            from_stop: self.to_stop,
            to_stop: self.from_stop,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViaKind {
    Visit {
        stops: Vec<StopIndex>,
        transfers: Vec<ViaTransfer>,
    },
    PassThrough {
        stops: Vec<StopIndex>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaLocation {
    pub label: String,
    pub kind: ViaKind,
    /// Extra wait at a visit before the journey may continue (seconds)
    pub minimum_wait: i32,
}

impl ViaLocation {
    pub fn visit(label: impl Into<String>, stops: &[StopIndex]) -> Self {
        Self {
            label: label.into(),
            kind: ViaKind::Visit {
                stops: stops.to_vec(),
                transfers: Vec::new(),
            },
            minimum_wait: 0,
        }
    }

    pub fn pass_through(label: impl Into<String>, stops: &[StopIndex]) -> Self {
        Self {
            label: label.into(),
            kind: ViaKind::PassThrough {
                stops: stops.to_vec(),
            },
            minimum_wait: 0,
        }
    }

    /// Add a transfer that satisfies this visit. Ignored for pass-through.
    pub fn with_transfer(mut self, transfer: ViaTransfer) -> Self {
        if let ViaKind::Visit { transfers, .. } = &mut self.kind {
            transfers.push(transfer);
        }
        self
    }

    /// Require a wait at the visit. Pass-through locations never wait.
    pub fn with_minimum_wait(mut self, seconds: i32) -> Self {
        if !self.is_pass_through() {
            self.minimum_wait = seconds;
        }
        self
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self.kind, ViaKind::PassThrough { .. })
    }

    pub fn stops(&self) -> &[StopIndex] {
        match &self.kind {
            ViaKind::Visit { stops, .. } | ViaKind::PassThrough { stops } => stops,
        }
    }

    pub fn transfers(&self) -> &[ViaTransfer] {
        match &self.kind {
            ViaKind::Visit { transfers, .. } => transfers,
            ViaKind::PassThrough { .. } => &[],
        }
    }

    pub fn contains_stop(&self, stop: StopIndex) -> bool {
        self.stops().contains(&stop)
    }

    pub fn is_empty(&self) -> bool {
        self.stops().is_empty() && self.transfers().is_empty()
    }

    /// The location as seen by a search running backwards in time.
    pub(crate) fn reversed(&self) -> Self {
        let kind = match &self.kind {
            ViaKind::Visit { stops, transfers } => ViaKind::Visit {
                stops: stops.clone(),
                transfers: transfers.iter().map(|t| t.reversed()).collect(),
            },
            pass => pass.clone(),
        };
        Self {
            label: self.label.clone(),
            kind,
            minimum_wait: self.minimum_wait,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_with_transfer_and_wait() {
        let via = ViaLocation::visit("C", &[2])
            .with_transfer(ViaTransfer::walk(2, 3, 60))
            .with_minimum_wait(300);
        assert!(via.contains_stop(2));
        assert!(!via.contains_stop(3));
        assert_eq!(via.transfers()[0].c1, 12_000);
        assert_eq!(via.minimum_wait, 300);
        assert!(!via.is_pass_through());

        let reversed = via.reversed();
        assert_eq!(reversed.transfers()[0].from_stop, 3);
        assert_eq!(reversed.transfers()[0].to_stop, 2);
    }

    #[test]
    fn pass_through_ignores_wait_and_transfers() {
        let via = ViaLocation::pass_through("X", &[4, 5])
            .with_minimum_wait(120)
            .with_transfer(ViaTransfer::walk(4, 6, 30));
        assert!(via.is_pass_through());
        assert_eq!(via.minimum_wait, 0);
        assert!(via.transfers().is_empty());
        assert_eq!(via.stops(), &[4, 5]);
    }

    #[test]
    fn empty_via() {
        assert!(ViaLocation::visit("none", &[]).is_empty());
        let via = ViaLocation::visit("t", &[]).with_transfer(ViaTransfer::walk(1, 2, 10));
        assert!(!via.is_empty());
    }
}
