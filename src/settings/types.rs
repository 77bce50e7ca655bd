use serde::{Deserialize, Serialize};

use crate::capture::frame::TransformFlags;
use crate::capture::target::{WindowId, WindowInfo};
use crate::scheduler::config::{ScheduleConfig, DEFAULT_FRAMES_PER_SECOND};

/// User capture preferences, persisted between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureSettings {
    pub frames_per_second: f64,
    pub grayscale: bool,
    pub flip: bool,
    /// Window captured most recently, offered again if it is still open.
    pub last_window_id: Option<WindowId>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            grayscale: true,
            flip: false,
            last_window_id: None,
        }
    }
}

impl CaptureSettings {
    /// Schedule config for these settings. A stored rate outside the accepted
    /// range falls back to the default rate.
    pub fn schedule_config(&self) -> ScheduleConfig {
        let flags = TransformFlags {
            grayscale: self.grayscale,
            flip: self.flip,
        };
        let config = ScheduleConfig::new(self.frames_per_second, flags);
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("Ignoring stored capture rate: {e}");
                ScheduleConfig::new(DEFAULT_FRAMES_PER_SECOND, flags)
            }
        }
    }

    /// The last captured window, if it is among `windows`.
    pub fn resume_window<'a>(&self, windows: &'a [WindowInfo]) -> Option<&'a WindowInfo> {
        let id = self.last_window_id?;
        windows.iter().find(|w| w.id == id)
    }
}
