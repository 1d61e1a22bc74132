//! Router configuration.
//!
//! Values here are service-wide defaults; a request can override the round
//! budget and the search window. The configuration deserializes from JSON
//! and every omitted field takes its default.

use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::RaptorError;

/// Configuration parameters for the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaptorConfig {
    /// Hard limit on transfers; rounds run up to this plus one.
    pub max_number_of_transfers: usize,

    /// Transfers allowed above the heuristic minimum when pruning is on.
    pub number_of_additional_transfers: usize,

    /// Distance between two range iterations (seconds).
    pub iteration_step_secs: i32,

    /// Longest journey considered when a time limit has to be derived
    /// (minutes).
    pub max_journey_duration_mins: i64,

    /// Run range iterations on the rayon pool.
    pub parallel_iterations: bool,

    /// Iterations per parallel chunk.
    pub iteration_chunk_size: usize,

    /// How the window is sized when a request does not set one.
    pub dynamic_search_window: DynamicSearchWindow,
}

/// Parameters of the dynamic search window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicSearchWindow {
    pub min_window_mins: i64,
    pub max_window_mins: i64,
    /// Share of the heuristic minimum travel time added to the window.
    pub min_transit_time_coefficient: f64,
    /// The window is rounded up to a multiple of this.
    pub step_mins: i64,
}

impl RaptorConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    ///
    /// `RaptorError::Config` if the JSON is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self, RaptorError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RaptorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    ///
    /// # Errors
    ///
    /// `RaptorError::Config` if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RaptorError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| RaptorError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), RaptorError> {
        if self.iteration_step_secs <= 0 {
            return Err(RaptorError::Config(
                "iteration_step_secs must be positive".to_string(),
            ));
        }
        if self.iteration_chunk_size == 0 {
            return Err(RaptorError::Config(
                "iteration_chunk_size must be positive".to_string(),
            ));
        }
        let dsw = &self.dynamic_search_window;
        if dsw.step_mins <= 0 || dsw.min_window_mins < 0 || dsw.max_window_mins < dsw.min_window_mins {
            return Err(RaptorError::Config(
                "dynamic_search_window needs step > 0 and 0 <= min <= max".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the iteration step as a Duration.
    pub fn iteration_step(&self) -> Duration {
        Duration::seconds(i64::from(self.iteration_step_secs))
    }

    /// Returns the maximum journey duration as a Duration.
    pub fn max_journey_duration(&self) -> Duration {
        Duration::minutes(self.max_journey_duration_mins)
    }
}

impl Default for RaptorConfig {
    fn default() -> Self {
        Self {
            max_number_of_transfers: 12,
            number_of_additional_transfers: 5,
            iteration_step_secs: 60,
            max_journey_duration_mins: 24 * 60,
            parallel_iterations: false,
            iteration_chunk_size: 8,
            dynamic_search_window: DynamicSearchWindow::default(),
        }
    }
}

impl DynamicSearchWindow {
    pub fn min_window(&self) -> Duration {
        Duration::minutes(self.min_window_mins)
    }

    pub fn max_window(&self) -> Duration {
        Duration::minutes(self.max_window_mins)
    }

    pub fn step(&self) -> Duration {
        Duration::minutes(self.step_mins)
    }

    /// Window for a journey whose minimum travel time is
    /// `min_travel_duration` seconds, or the minimum window when unknown.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_raptor::config::DynamicSearchWindow;
    ///
    /// let dsw = DynamicSearchWindow::default();
    /// // 40m + 0.5 * 25m = 52m30s, rounded up to 1h
    /// assert_eq!(dsw.window_secs(Some(25 * 60)), 3_600);
    /// assert_eq!(dsw.window_secs(None), 40 * 60);
    /// ```
    pub fn window_secs(&self, min_travel_duration: Option<i32>) -> i32 {
        let min = self.min_window_mins * 60;
        let max = self.max_window_mins * 60;
        let step = self.step_mins * 60;
        let Some(travel) = min_travel_duration else {
            return min as i32;
        };
        let raw = min as f64 + self.min_transit_time_coefficient * f64::from(travel.max(0));
        let rounded = ((raw / step as f64).ceil() as i64) * step;
        rounded.clamp(min, max) as i32
    }
}

impl Default for DynamicSearchWindow {
    fn default() -> Self {
        Self {
            min_window_mins: 40,
            max_window_mins: 180,
            min_transit_time_coefficient: 0.5,
            step_mins: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = RaptorConfig::default();

        assert_eq!(config.max_number_of_transfers, 12);
        assert_eq!(config.number_of_additional_transfers, 5);
        assert_eq!(config.iteration_step_secs, 60);
        assert_eq!(config.max_journey_duration_mins, 1440);
        assert!(!config.parallel_iterations);
        assert_eq!(config.iteration_chunk_size, 8);
        assert_eq!(config.dynamic_search_window.min_window_mins, 40);
    }

    #[test]
    fn duration_methods() {
        let config = RaptorConfig::default();

        assert_eq!(config.iteration_step(), Duration::minutes(1));
        assert_eq!(config.max_journey_duration(), Duration::hours(24));
        assert_eq!(config.dynamic_search_window.max_window(), Duration::hours(3));
        assert_eq!(config.dynamic_search_window.step(), Duration::minutes(10));
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let config = RaptorConfig::from_json_str(
            r#"{ "max_number_of_transfers": 3, "dynamic_search_window": { "step_mins": 5 } }"#,
        )
        .unwrap();

        assert_eq!(config.max_number_of_transfers, 3);
        assert_eq!(config.iteration_step_secs, 60);
        assert_eq!(config.dynamic_search_window.step_mins, 5);
        assert_eq!(config.dynamic_search_window.max_window_mins, 180);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = RaptorConfig::from_json_str(r#"{ "iteration_step_secs": 0 }"#).unwrap_err();
        assert!(matches!(err, RaptorError::Config(_)));

        let err = RaptorConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, RaptorError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "parallel_iterations": true, "iteration_chunk_size": 4 }}"#).unwrap();

        let config = RaptorConfig::from_json_file(file.path()).unwrap();
        assert!(config.parallel_iterations);
        assert_eq!(config.iteration_chunk_size, 4);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = RaptorConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RaptorError::Config(msg) if msg.contains("absent.json")));
    }

    #[test]
    fn dynamic_window_is_clamped() {
        let dsw = DynamicSearchWindow::default();
        assert_eq!(dsw.window_secs(Some(0)), 40 * 60);
        assert_eq!(dsw.window_secs(Some(10 * 3600)), 180 * 60);
        // 40m + 0.5 * 20m = 50m exactly
        assert_eq!(dsw.window_secs(Some(20 * 60)), 50 * 60);
    }
}
