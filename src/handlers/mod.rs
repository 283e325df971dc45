pub mod leave;
pub mod leave_balance;
pub mod shared;
