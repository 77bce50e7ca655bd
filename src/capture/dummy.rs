use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::capture::backend::FrameSource;
use crate::capture::error::{CaptureError, Result};
use crate::capture::frame::{RawFrame, BYTES_PER_PIXEL};
use crate::capture::target::CaptureTarget;

/// A synthetic frame source for running without screen-capture permission.
///
/// Produces a deterministic RGBA gradient the size of the target, shifted by
/// one column per capture so consecutive frames differ. Latency and a number
/// of leading failures can be injected.
///
/// Enable via `DUMMY_CAPTURE=1` environment variable.
pub struct PatternSource {
    latency: Duration,
    failures_left: AtomicU32,
    captures: AtomicU64,
    epoch: Instant,
}

impl PatternSource {
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
            failures_left: AtomicU32::new(0),
            captures: AtomicU64::new(0),
            epoch: Instant::now(),
        }
    }

    /// Delay every capture by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fail the first `count` captures with `CaptureError::Unavailable`.
    pub fn with_failures(self, count: u32) -> Self {
        self.failures_left.store(count, Ordering::Relaxed);
        self
    }

    /// Whether the synthetic source is enabled via environment variable.
    pub fn is_enabled() -> bool {
        std::env::var("DUMMY_CAPTURE").is_ok_and(|v| v == "1" || v == "true")
    }

    /// Number of capture calls made so far, failed ones included.
    pub fn capture_count(&self) -> u64 {
        self.captures.load(Ordering::Relaxed)
    }

    /// Render the gradient for the given capture index.
    pub fn render(width: u32, height: u32, shift: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(width as usize * height as usize * BYTES_PER_PIXEL);
        for y in 0..height {
            for x in 0..width {
                let col = (u64::from(x) + shift) % 256;
                data.push(col as u8); // R
                data.push((y % 256) as u8); // G
                data.push(128); // B
                data.push(255); // A
            }
        }
        data
    }
}

impl Default for PatternSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameSource for PatternSource {
    async fn capture(&self, target: &CaptureTarget) -> Result<RawFrame> {
        let index = self.captures.fetch_add(1, Ordering::Relaxed);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let failing = self
            .failures_left
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CaptureError::Unavailable(format!(
                "{} is not on screen",
                target.window_id
            )));
        }

        Ok(RawFrame::new(
            Self::render(target.width, target.height, index),
            target.width,
            target.height,
            self.epoch.elapsed().as_micros() as u64,
        ))
    }
}
