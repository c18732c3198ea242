use std::time::Duration;

use crate::config::PipelineSettings;

/// Sizes and polling intervals handed to each pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Capacity of the track queue.
    pub fetching_buffer: usize,
    /// Poll interval of the fetch supervisor.
    pub fetching_timeout: Duration,
    /// Tracks appended before `ListingPipeline::start` returns.
    pub load_eager: usize,
    /// Rows the loader keeps ahead of the cursor.
    pub load_lookahead: usize,
    /// Poll interval of the listing loader and its supervisor.
    pub load_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&PipelineSettings::default())
    }
}

impl From<&PipelineSettings> for PipelineConfig {
    fn from(s: &PipelineSettings) -> Self {
        Self {
            fetching_buffer: s.fetching_buffer,
            fetching_timeout: Duration::from_millis(s.fetching_timeout_ms),
            load_eager: s.load_eager,
            load_lookahead: s.load_lookahead,
            load_timeout: Duration::from_millis(s.load_timeout_ms),
        }
    }
}
