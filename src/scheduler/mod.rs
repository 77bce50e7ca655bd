// Timer-driven capture -> transform -> publish loop.

pub mod config;
pub mod error;
pub mod session;

pub use config::{RunState, ScheduleConfig};
pub use error::SchedulerError;
pub use session::CaptureScheduler;
