//! Tilth Animation System
//!
//! Time-driven building blocks for the interaction engine.
//!
//! # Features
//!
//! - **Easing**: Standard easing curves, including the ease-out quartic used by counters
//! - **Rate Limiting**: Leading-edge throttle and trailing-edge debounce
//! - **Timers**: A cooperative timer queue standing in for `setTimeout`
//! - **Count-Up**: Eased integer counters that land exactly on their target
//!
//! Nothing here reads a clock. Every time-dependent call takes the current
//! [`std::time::Instant`] from the caller, so hosts and tests control time.

pub mod count_up;
pub mod easing;
pub mod scheduler;
pub mod throttle;

pub use count_up::{CountUp, CountUpFrame};
pub use easing::Easing;
pub use scheduler::{TimerId, TimerQueue};
pub use throttle::{Debounce, Debounced, Throttle, Throttled};
