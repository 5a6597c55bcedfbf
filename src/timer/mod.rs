pub mod clock;
pub mod controller;
pub mod format;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use controller::{TimerController, TICK_INTERVAL};
pub use format::{billable_seconds, format_hms};
pub use state::{CursorMode, TimerSnapshot, TimerState, TimerStatus};
