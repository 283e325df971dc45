pub mod auth;
pub mod balance_service;
pub mod leave_service;
pub mod notifier;
pub mod stats_cache;
pub mod user_context;
pub mod user_locks;

pub use auth::AuthService;
pub use balance_service::BalanceService;
pub use leave_service::LeaveService;
pub use notifier::{LogNotifier, Notifier};
pub use stats_cache::StatsCache;
pub use user_context::{UserContext, UserContextService};
pub use user_locks::UserLocks;
