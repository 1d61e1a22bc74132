//! Slack policy.
//!
//! Slack is the extra time a rider needs around a boarding: to get on the
//! vehicle (board slack), to get off it (alight slack) and to move between
//! two trips (transfer slack). Board and alight slack can vary per pattern
//! through the pattern's slack index.

/// Source of board, alight and transfer slack, in seconds.
pub trait SlackProvider: Send + Sync {
    /// Slack added between two trips (not applied to the first boarding).
    fn transfer_slack(&self) -> i32;

    /// Slack before boarding a pattern with the given slack index.
    fn board_slack(&self, slack_index: usize) -> i32;

    /// Slack after alighting a pattern with the given slack index.
    fn alight_slack(&self, slack_index: usize) -> i32;
}

/// Slack with one default value per kind and optional per-index overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultSlackProvider {
    transfer: i32,
    board: i32,
    alight: i32,
    overrides: Vec<Option<(i32, i32)>>,
}

impl DefaultSlackProvider {
    pub fn new(transfer: i32, board: i32, alight: i32) -> Self {
        Self {
            transfer,
            board,
            alight,
            overrides: Vec::new(),
        }
    }

    /// Use different board and alight slack for patterns with `slack_index`.
    pub fn with_index(mut self, slack_index: usize, board: i32, alight: i32) -> Self {
        if self.overrides.len() <= slack_index {
            self.overrides.resize(slack_index + 1, None);
        }
        self.overrides[slack_index] = Some((board, alight));
        self
    }

    fn lookup(&self, slack_index: usize) -> Option<(i32, i32)> {
        self.overrides.get(slack_index).copied().flatten()
    }
}

impl Default for DefaultSlackProvider {
    /// One minute of transfer slack, no board or alight slack.
    fn default() -> Self {
        Self::new(60, 0, 0)
    }
}

impl SlackProvider for DefaultSlackProvider {
    fn transfer_slack(&self) -> i32 {
        self.transfer
    }

    fn board_slack(&self, slack_index: usize) -> i32 {
        self.lookup(slack_index).map_or(self.board, |(b, _)| b)
    }

    fn alight_slack(&self, slack_index: usize) -> i32 {
        self.lookup(slack_index).map_or(self.alight, |(_, a)| a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let slack = DefaultSlackProvider::default();
        assert_eq!(slack.transfer_slack(), 60);
        assert_eq!(slack.board_slack(0), 0);
        assert_eq!(slack.alight_slack(3), 0);
    }

    #[test]
    fn per_index_overrides() {
        let slack = DefaultSlackProvider::new(30, 20, 10).with_index(2, 45, 15);
        assert_eq!(slack.board_slack(0), 20);
        assert_eq!(slack.alight_slack(1), 10);
        assert_eq!(slack.board_slack(2), 45);
        assert_eq!(slack.alight_slack(2), 15);
        assert_eq!(slack.board_slack(7), 20);
    }
}
