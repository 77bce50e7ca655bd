pub mod capture;
pub mod diagnostics;
pub mod logging;
pub mod preview;
pub mod scheduler;
pub mod settings;
pub mod transform;

use std::sync::Arc;

use async_trait::async_trait;

pub use capture::backend::{ErrorCallback, FrameSink, FrameSource};
pub use capture::dummy::PatternSource;
pub use capture::error::CaptureError;
pub use capture::frame::{ProcessedFrame, RawFrame, TransformFlags};
pub use capture::target::{CaptureTarget, WindowId, WindowInfo};
pub use diagnostics::stats::DiagnosticSnapshot;
pub use preview::buffer::FrameBuffer;
pub use scheduler::{CaptureScheduler, RunState, ScheduleConfig, SchedulerError};
pub use settings::store::SettingsStore;

/// Frame source used when the host does not inject a platform one.
///
/// When `DUMMY_CAPTURE=1` is set, a synthetic gradient source is used instead.
pub fn create_frame_source() -> Arc<dyn FrameSource> {
    if PatternSource::is_enabled() {
        tracing::info!("DUMMY_CAPTURE set, using synthetic frame source");
        return Arc::new(PatternSource::new());
    }
    Arc::new(NullSource)
}

/// Source for builds without a platform capture backend. Every capture fails.
struct NullSource;

#[async_trait]
impl FrameSource for NullSource {
    async fn capture(&self, _target: &CaptureTarget) -> capture::error::Result<RawFrame> {
        Err(CaptureError::Unavailable("no capture backend".to_string()))
    }
}
