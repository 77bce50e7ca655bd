use serde::Serialize;
use std::time::{Duration, Instant};

/// Collects diagnostic statistics for a capture run.
pub struct DiagnosticStats {
    published: u64,
    skipped: u64,
    failed: u64,
    discarded: u64,
    start_time: Instant,
    last_publish: Option<Instant>,
    latency: Duration,
}

/// Snapshot of diagnostic stats for serialisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticSnapshot {
    pub fps: f64,
    pub published: u64,
    pub skipped: u64,
    pub failed: u64,
    pub discarded: u64,
    pub skip_rate: f64,
    pub latency_ms: f64,
}

impl DiagnosticStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            published: 0,
            skipped: 0,
            failed: 0,
            discarded: 0,
            start_time: Instant::now(),
            last_publish: None,
            latency: Duration::ZERO,
        }
    }

    /// Record a frame handed to the sink, along with when its tick began.
    pub fn record_publish(&mut self, tick_started: Instant) {
        self.published += 1;
        let now = Instant::now();
        self.latency = now.saturating_duration_since(tick_started);
        self.last_publish = Some(now);
    }

    /// Record a tick dropped because a capture was still in flight.
    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    /// Record a tick whose capture or transform failed.
    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Record a result thrown away because the run stopped or restarted.
    pub fn record_discard(&mut self) {
        self.discarded += 1;
    }

    pub fn published(&self) -> u64 {
        self.published
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Effective publish rate since the stats were (re)started.
    pub fn fps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < 0.001 {
            return 0.0;
        }
        self.published as f64 / elapsed
    }

    /// Share of ticks skipped for overlap, as a percentage (0.0 - 100.0).
    pub fn skip_rate(&self) -> f64 {
        let total = self.published + self.skipped + self.failed + self.discarded;
        if total == 0 {
            return 0.0;
        }
        (self.skipped as f64 / total as f64) * 100.0
    }

    /// Latest tick-start-to-publish latency in milliseconds.
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_secs_f64() * 1000.0
    }

    /// Time since the last successful publish, if any.
    pub fn since_last_publish(&self) -> Option<Duration> {
        self.last_publish.map(|t| t.elapsed())
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot {
            fps: self.fps(),
            published: self.published,
            skipped: self.skipped,
            failed: self.failed,
            discarded: self.discarded,
            skip_rate: self.skip_rate(),
            latency_ms: self.latency_ms(),
        }
    }
}

impl Default for DiagnosticStats {
    fn default() -> Self {
        Self::new()
    }
}
