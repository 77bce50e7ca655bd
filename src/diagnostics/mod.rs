// Per-run capture statistics.

pub mod stats;
