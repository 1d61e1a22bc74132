//! Cost relaxation and transit priority groups.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Pattern, TransitMode};

/// `ratio × c1 + slack`, used to keep labels whose cost is only slightly
/// worse than the best one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelaxFunction {
    pub ratio: f64,
    /// Additive slack in cost units (centi-seconds)
    pub slack: i32,
}

impl RelaxFunction {
    pub const NORMAL: RelaxFunction = RelaxFunction {
        ratio: 1.0,
        slack: 0,
    };

    /// A relax function with the slack given in seconds.
    pub fn new(ratio: f64, slack_secs: i32) -> Self {
        Self {
            ratio,
            slack: slack_secs * 100,
        }
    }

    /// # Examples
    ///
    /// ```
    /// use transit_raptor::request::RelaxFunction;
    ///
    /// let relax = RelaxFunction::new(1.5, 10);
    /// assert_eq!(relax.relax(20_000), 31_000);
    /// ```
    pub fn relax(&self, c1: i32) -> i32 {
        let relaxed = (self.ratio * f64::from(c1)).round() as i64 + i64::from(self.slack);
        relaxed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }

    pub fn is_normal(&self) -> bool {
        *self == Self::NORMAL
    }
}

impl Default for RelaxFunction {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for RelaxFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} * c1 + {}", self.ratio, crate::domain::cost::format_cost(self.slack))
    }
}

/// Assigns every pattern a priority-group code (C2b).
///
/// Codes are bit sets: a journey's code is the merge of the codes of every
/// pattern it rides. Labels with different codes never dominate each other
/// on the group criterion, and their costs are compared through `relax_c1`.
pub trait GroupPriorityCalculator: Send + Sync + fmt::Debug {
    /// Code of the group `pattern` belongs to; never zero.
    fn group(&self, pattern: &Pattern) -> u32;

    /// Code after riding a pattern of group `group`.
    fn merge(&self, current: u32, group: u32) -> u32 {
        current | group
    }

    /// Relaxation applied to the other label's cost when the codes differ.
    fn relax_c1(&self) -> RelaxFunction;
}

/// Groups patterns by transit mode.
///
/// Modes in the n-th configured group get bit `n + 1`; every other mode
/// shares bit 0.
#[derive(Debug, Clone)]
pub struct ModeGroupPriority {
    groups: Vec<Vec<TransitMode>>,
    relax: RelaxFunction,
}

impl ModeGroupPriority {
    pub fn new(relax: RelaxFunction) -> Self {
        Self {
            groups: Vec::new(),
            relax,
        }
    }

    /// Put `modes` in their own group.
    pub fn with_group(mut self, modes: &[TransitMode]) -> Self {
        self.groups.push(modes.to_vec());
        self
    }
}

impl GroupPriorityCalculator for ModeGroupPriority {
    fn group(&self, pattern: &Pattern) -> u32 {
        self.groups
            .iter()
            .position(|modes| modes.contains(&pattern.mode()))
            .map_or(1, |i| 1 << (i + 1))
    }

    fn relax_c1(&self) -> RelaxFunction {
        self.relax
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relax_rounds_and_adds_slack() {
        let relax = RelaxFunction::new(1.25, 30);
        assert_eq!(relax.relax(1_001), 1_251 + 3_000);
        assert_eq!(RelaxFunction::NORMAL.relax(777), 777);
        assert!(RelaxFunction::default().is_normal());
        assert_eq!(relax.to_string(), "1.25 * c1 + 30");
    }

    #[test]
    fn relax_saturates() {
        assert_eq!(RelaxFunction::new(2.0, 0).relax(i32::MAX), i32::MAX);
    }

    #[test]
    fn groups_by_mode() {
        let calc = ModeGroupPriority::new(RelaxFunction::new(1.0, 300))
            .with_group(&[TransitMode::Rail, TransitMode::Subway])
            .with_group(&[TransitMode::Ferry]);

        let rail = Pattern::with_stops("L1", TransitMode::Rail, &[0, 1]).unwrap();
        let ferry = Pattern::with_stops("F1", TransitMode::Ferry, &[0, 1]).unwrap();
        let bus = Pattern::with_stops("B1", TransitMode::Bus, &[0, 1]).unwrap();

        assert_eq!(calc.group(&rail), 2);
        assert_eq!(calc.group(&ferry), 4);
        assert_eq!(calc.group(&bus), 1);
        assert_eq!(calc.merge(calc.group(&bus), calc.group(&rail)), 3);
        assert_eq!(calc.relax_c1().slack, 30_000);
    }
}
