use std::sync::Arc;

use async_trait::async_trait;

use crate::capture::error::{CaptureError, Result};
use crate::capture::frame::{ProcessedFrame, RawFrame};
use crate::capture::target::CaptureTarget;

/// Callback type for reporting per-tick failures.
///
/// Kept separate from [`FrameSink`] so a failing tick never reaches the
/// display path.
pub type ErrorCallback = Arc<dyn Fn(&CaptureTarget, &CaptureError) + Send + Sync>;

/// Platform-agnostic frame acquisition.
///
/// Implemented per platform (ScreenCaptureKit, PipeWire, Windows.Graphics.Capture).
/// The scheduler calls [`FrameSource::capture`] at most once at a time per run.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Check that `target` refers to something this source can capture.
    ///
    /// Called synchronously from `start`; the default accepts any target with
    /// a non-zero area.
    fn resolve(&self, target: &CaptureTarget) -> Result<()> {
        if target.has_area() {
            Ok(())
        } else {
            Err(CaptureError::EmptyFrame {
                width: target.width,
                height: target.height,
            })
        }
    }

    /// Grab one still frame of `target`.
    async fn capture(&self, target: &CaptureTarget) -> Result<RawFrame>;
}

/// Consumer of processed frames (preview widget, web view bridge, ...).
pub trait FrameSink: Send + Sync {
    /// Hand a frame over for display. Must return quickly.
    fn publish(&self, frame: ProcessedFrame);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::frame::TransformFlags;
    use crate::capture::target::WindowId;
    use parking_lot::Mutex;

    /// Source that only knows about a single window.
    struct SingleWindowSource {
        known: WindowId,
    }

    #[async_trait]
    impl FrameSource for SingleWindowSource {
        fn resolve(&self, target: &CaptureTarget) -> Result<()> {
            if target.window_id == self.known {
                Ok(())
            } else {
                Err(CaptureError::Unavailable(target.window_id.to_string()))
            }
        }

        async fn capture(&self, target: &CaptureTarget) -> Result<RawFrame> {
            self.resolve(target)?;
            let len = target.width as usize * target.height as usize * 4;
            Ok(RawFrame::new(vec![0; len], target.width, target.height, 0))
        }
    }

    struct DefaultResolveSource;

    #[async_trait]
    impl FrameSource for DefaultResolveSource {
        async fn capture(&self, _target: &CaptureTarget) -> Result<RawFrame> {
            Err(CaptureError::Unavailable("never".to_string()))
        }
    }

    struct RecordingSink {
        frames: Mutex<Vec<ProcessedFrame>>,
    }

    impl FrameSink for RecordingSink {
        fn publish(&self, frame: ProcessedFrame) {
            self.frames.lock().push(frame);
        }
    }

    #[tokio::test]
    async fn custom_source_captures_known_window() {
        let source = SingleWindowSource {
            known: WindowId::new(1),
        };
        let frame = source
            .capture(&CaptureTarget::new(WindowId::new(1), 4, 2))
            .await
            .unwrap();
        assert_eq!(frame.data.len(), 32);
    }

    #[tokio::test]
    async fn custom_source_rejects_unknown_window() {
        let source = SingleWindowSource {
            known: WindowId::new(1),
        };
        let result = source
            .capture(&CaptureTarget::new(WindowId::new(2), 4, 2))
            .await;
        assert!(matches!(result, Err(CaptureError::Unavailable(_))));
    }

    #[test]
    fn default_resolve_rejects_zero_area_targets() {
        let source = DefaultResolveSource;
        assert!(source
            .resolve(&CaptureTarget::new(WindowId::new(1), 0, 10))
            .is_err());
        assert!(source
            .resolve(&CaptureTarget::new(WindowId::new(1), 10, 10))
            .is_ok());
    }

    #[test]
    fn sink_receives_ownership_of_published_frames() {
        let sink = RecordingSink {
            frames: Mutex::new(Vec::new()),
        };
        sink.publish(ProcessedFrame {
            data: vec![9; 4],
            width: 1,
            height: 1,
            timestamp_us: 5,
            flags: TransformFlags::NONE,
        });
        assert_eq!(sink.frames.lock()[0].timestamp_us, 5);
    }

    #[test]
    fn trait_objects_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn FrameSource>();
        assert_send_sync::<dyn FrameSink>();
        assert_send_sync::<ErrorCallback>();
    }
}
