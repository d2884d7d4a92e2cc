//! Seams between the client logic and its environment.

pub mod clock;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use storage::KeyValueStorage;
