//! Leave-day arithmetic: turning a requested date range into a day count and
//! deciding how that count is paid for. Everything here is pure; callers
//! supply the clock, the balance snapshot and the existing applications.

pub mod balance;
pub mod calculator;
pub mod date_range;
pub mod day_count;
pub mod days;
pub mod error;
pub mod overlap;
pub mod types;

#[cfg(test)]
mod day_count_tests;

pub use calculator::assess;
pub use days::Days;
pub use error::{LeaveError, LeaveErrorKind};
pub use types::*;
