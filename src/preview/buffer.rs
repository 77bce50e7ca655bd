use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::capture::backend::FrameSink;
use crate::capture::frame::ProcessedFrame;

/// Thread-safe ring buffer of published frames.
///
/// Stores up to `capacity` frames, overwriting the oldest when full.
/// Frames are wrapped in `Arc` so readers get a cheap reference-counted
/// pointer instead of cloning multi-megabyte pixel buffers.
///
/// As a [`FrameSink`] it keeps showing the last good frame when a tick
/// fails, since failed ticks never publish.
pub struct FrameBuffer {
    slots: Mutex<Ring>,
    /// Monotonic counter incremented on each push; lets a display poller
    /// tell whether anything new arrived since its last read.
    sequence: AtomicU64,
}

struct Ring {
    frames: Vec<Option<Arc<ProcessedFrame>>>,
    write_idx: usize,
}

impl FrameBuffer {
    /// Create a new ring buffer with the given capacity (at least one slot).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Mutex::new(Ring {
                frames: (0..capacity).map(|_| None).collect(),
                write_idx: 0,
            }),
            sequence: AtomicU64::new(0),
        }
    }

    /// Push a new frame into the buffer, overwriting the oldest if full.
    pub fn push(&self, frame: ProcessedFrame) {
        let mut ring = self.slots.lock();
        let idx = ring.write_idx;
        ring.frames[idx] = Some(Arc::new(frame));
        ring.write_idx = (idx + 1) % ring.frames.len();
        self.sequence.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of frames pushed so far.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }

    /// Get the most recently pushed frame, if any.
    pub fn latest(&self) -> Option<Arc<ProcessedFrame>> {
        let ring = self.slots.lock();
        let len = ring.frames.len();
        let latest_idx = (ring.write_idx + len - 1) % len;
        ring.frames[latest_idx].clone()
    }

    /// Drop all buffered frames, e.g. when a different window is selected.
    pub fn clear(&self) {
        let mut ring = self.slots.lock();
        ring.frames.iter_mut().for_each(|slot| *slot = None);
        ring.write_idx = 0;
    }
}

impl FrameSink for FrameBuffer {
    fn publish(&self, frame: ProcessedFrame) {
        self.push(frame);
    }
}
