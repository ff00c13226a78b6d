//! Runtime configuration for the background decode pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`spawn_decode`](crate::pipeline::spawn_decode).
///
/// Detection thresholds and preview limits are constants of their own
/// modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum time between two progress events (milliseconds).
    pub progress_interval_ms: u64,
    /// Send a 0% "Parsing Global Header..." event before decoding starts.
    pub report_initial_status: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 200,
            report_initial_status: true,
        }
    }
}

impl PipelineConfig {
    /// Progress throttle as a [`Duration`].
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Set the progress throttle.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }
}
