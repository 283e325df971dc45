pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod leave;
pub mod middleware;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::SqlitePool;

pub use config::Config;
pub use services::{AuthService, BalanceService, LeaveService};

use services::{Notifier, StatsCache, UserLocks};

const STATS_CACHE_CAPACITY: u64 = 10_000;

pub struct AppState {
    pub leave_service: LeaveService,
    pub balance_service: BalanceService,
    pub locks: UserLocks,
}

impl AppState {
    /// Both services share one lock registry so every balance write for a
    /// user is serialized, whichever endpoint it comes from.
    pub fn new(pool: SqlitePool, config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        let locks = UserLocks::new();
        let stats = StatsCache::new(STATS_CACHE_CAPACITY, config.stats_cache_ttl_secs);

        Self {
            leave_service: LeaveService::new(pool.clone(), locks.clone(), stats, notifier),
            balance_service: BalanceService::new(pool, locks.clone(), config),
            locks,
        }
    }
}
