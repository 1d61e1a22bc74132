//! Generalized cost.
//!
//! Costs are `i32` centi-seconds, so a reluctance factor of 0.8 on a
//! 45-second wait is still exact. The `CostCalculator` trait is the seam
//! for alternative cost models; `DefaultCostCalculator` implements the
//! usual board/transfer/wait/in-vehicle model.

use super::{AccessEgress, Pattern, StopIndex, TransferConstraint};

/// Walk reluctance used by the convenience constructors.
pub const DEFAULT_WALK_RELUCTANCE: f64 = 2.0;

/// Convert whole seconds to cost units.
pub const fn cost_from_secs(seconds: i32) -> i32 {
    seconds * 100
}

/// Convert fractional seconds to cost units, rounding to the nearest unit.
pub fn cost_from_secs_f64(seconds: f64) -> i32 {
    (seconds * 100.0).round() as i32
}

/// Format a cost in seconds with `_` thousand separators.
///
/// # Examples
///
/// ```
/// use transit_raptor::domain::cost::format_cost;
///
/// assert_eq!(format_cost(360_000), "3_600");
/// assert_eq!(format_cost(1_234_567_800), "12_345_678");
/// assert_eq!(format_cost(1_050), "10.5");
/// assert_eq!(format_cost(-200), "-2");
/// ```
pub fn format_cost(c1: i32) -> String {
    let sign = if c1 < 0 { "-" } else { "" };
    let abs = c1.unsigned_abs();
    let (whole, fraction) = (abs / 100, abs % 100);

    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('_');
        }
        grouped.push(c);
    }

    match fraction {
        0 => format!("{sign}{grouped}"),
        f if f % 10 == 0 => format!("{sign}{grouped}.{}", f / 10),
        f => format!("{sign}{grouped}.{f:02}"),
    }
}

/// Cost model used by the multi-criteria search and by path assembly.
pub trait CostCalculator: Send + Sync {
    /// Cost of boarding a trip, including the wait before boarding.
    ///
    /// `first_boarding` is true for the first ride of a journey that
    /// started with a walk. `wait_time` is never negative. `constraint` is
    /// the transfer constraint used for this boarding, if any.
    fn boarding_cost(
        &self,
        first_boarding: bool,
        wait_time: i32,
        board_stop: StopIndex,
        pattern: &Pattern,
        constraint: Option<TransferConstraint>,
    ) -> i32;

    /// Cost of a ride from boarding to the stop arrival after alighting.
    fn transit_arrival_cost(
        &self,
        boarding_cost: i32,
        alight_slack: i32,
        transit_time: i32,
        pattern: &Pattern,
        alight_stop: StopIndex,
    ) -> i32;

    /// Cost of waiting `seconds`.
    fn wait_cost(&self, seconds: i32) -> i32;

    /// Cost of an egress path, excluding any wait before it.
    fn egress_cost(&self, egress: &AccessEgress) -> i32;

    /// In-vehicle reluctance factor for a pattern.
    fn transit_reluctance(&self, pattern: &Pattern) -> f64;
}

/// Board cost, transfer cost, wait and transit reluctance, plus optional
/// per-stop board/alight costs.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultCostCalculator {
    board_cost: i32,
    transfer_cost: i32,
    wait_reluctance: f64,
    transit_reluctance: Vec<f64>,
    stop_costs: Option<Vec<i32>>,
}

impl DefaultCostCalculator {
    /// Create a calculator; costs are in seconds.
    pub fn new(board_cost_secs: i32, transfer_cost_secs: i32, wait_reluctance: f64) -> Self {
        Self {
            board_cost: cost_from_secs(board_cost_secs),
            transfer_cost: cost_from_secs(transfer_cost_secs),
            wait_reluctance,
            transit_reluctance: Vec::new(),
            stop_costs: None,
        }
    }

    /// Reluctance per pattern reluctance index; unlisted indexes use 1.0.
    pub fn with_transit_reluctance(mut self, factors: Vec<f64>) -> Self {
        self.transit_reluctance = factors;
        self
    }

    /// Extra cost, in seconds, for boarding or alighting at each stop.
    pub fn with_stop_costs(mut self, stop_costs_secs: Vec<i32>) -> Self {
        self.stop_costs = Some(stop_costs_secs.into_iter().map(cost_from_secs).collect());
        self
    }

    fn stop_cost(&self, stop: StopIndex) -> i32 {
        self.stop_costs
            .as_ref()
            .and_then(|costs| costs.get(stop).copied())
            .unwrap_or(0)
    }

    fn scaled(factor: f64, seconds: i32) -> i32 {
        cost_from_secs_f64(factor * f64::from(seconds))
    }
}

impl Default for DefaultCostCalculator {
    /// Board cost 10 minutes, no transfer cost, wait reluctance 1.0.
    fn default() -> Self {
        Self::new(600, 0, 1.0)
    }
}

impl CostCalculator for DefaultCostCalculator {
    fn boarding_cost(
        &self,
        first_boarding: bool,
        wait_time: i32,
        board_stop: StopIndex,
        pattern: &Pattern,
        constraint: Option<TransferConstraint>,
    ) -> i32 {
        debug_assert!(wait_time >= 0, "negative wait before boarding: {wait_time}s");
        match constraint {
            // Waiting on board counts as riding
            Some(TransferConstraint::StaySeated) => {
                Self::scaled(self.transit_reluctance(pattern), wait_time)
            }
            Some(TransferConstraint::Guaranteed) => self.wait_cost(wait_time),
            _ => {
                let mut cost = self.wait_cost(wait_time) + self.board_cost;
                if !first_boarding {
                    cost += self.transfer_cost;
                }
                cost + self.stop_cost(board_stop)
            }
        }
    }

    fn transit_arrival_cost(
        &self,
        boarding_cost: i32,
        alight_slack: i32,
        transit_time: i32,
        pattern: &Pattern,
        alight_stop: StopIndex,
    ) -> i32 {
        boarding_cost
            + Self::scaled(self.transit_reluctance(pattern), transit_time)
            + self.wait_cost(alight_slack)
            + self.stop_cost(alight_stop)
    }

    fn wait_cost(&self, seconds: i32) -> i32 {
        Self::scaled(self.wait_reluctance, seconds)
    }

    fn egress_cost(&self, egress: &AccessEgress) -> i32 {
        if egress.has_rides() {
            egress.c1 + self.transfer_cost
        } else {
            egress.c1
        }
    }

    fn transit_reluctance(&self, pattern: &Pattern) -> f64 {
        self.transit_reluctance
            .get(pattern.reluctance_index())
            .copied()
            .unwrap_or(1.0)
    }
}
