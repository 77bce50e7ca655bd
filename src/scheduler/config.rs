use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::capture::frame::TransformFlags;
use crate::scheduler::error::{Result, SchedulerError};

/// Highest accepted capture rate.
pub const MAX_FRAMES_PER_SECOND: f64 = 60.0;

/// Capture rate used when nothing else is configured.
pub const DEFAULT_FRAMES_PER_SECOND: f64 = 5.0;

/// Longest gap between ticks. Slower rates are clamped so timer deadlines
/// never overflow `Instant`.
pub const MAX_FRAME_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Rate and transforms for a capture run.
///
/// Copied out of the scheduler once per tick, so a change never lands
/// halfway through a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConfig {
    pub frames_per_second: f64,
    pub flags: TransformFlags,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            flags: TransformFlags::GRAYSCALE,
        }
    }
}

impl ScheduleConfig {
    pub fn new(frames_per_second: f64, flags: TransformFlags) -> Self {
        Self {
            frames_per_second,
            flags,
        }
    }

    /// Check the rate lies in `(0, 60]`. NaN is rejected.
    pub fn validate(&self) -> Result<()> {
        let fps = self.frames_per_second;
        if fps > 0.0 && fps <= MAX_FRAMES_PER_SECOND {
            Ok(())
        } else {
            Err(SchedulerError::InvalidRate(fps))
        }
    }

    /// Time between ticks, at most [`MAX_FRAME_INTERVAL`]. Rates that fail
    /// [`validate`](Self::validate) also map to the ceiling.
    pub fn frame_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.frames_per_second)
            .map_or(MAX_FRAME_INTERVAL, |interval| interval.min(MAX_FRAME_INTERVAL))
    }
}

/// Whether the scheduler is currently driving captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunState {
    Idle,
    Running,
}
