pub mod error;
pub mod session;
pub mod timestamp;

pub use error::TimerInputError;
pub use session::{SessionWindow, TableBinding, TimerProps};
pub use timestamp::parse_timestamp;
