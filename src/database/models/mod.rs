pub(crate) mod macros;

pub mod balance;
pub mod calendar;
pub mod leave_application;
pub mod user;

// Re-export all models for easy importing
pub use balance::*;
pub use calendar::*;
pub use leave_application::*;
pub use user::*;
