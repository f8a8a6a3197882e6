pub mod timer;

pub use timer::{HighPrecisionTimer, ManualTimer, Scheduler, Timer, TimerHandle};
