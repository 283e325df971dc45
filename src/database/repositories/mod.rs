pub mod leave_application;
pub mod leave_balance;
pub mod user;

// Re-export all repositories for easy importing
pub use leave_application::{LeaveApplicationRepository, StatusTransition};
pub use leave_balance::LeaveBalanceRepository;
pub use user::UserRepository;
