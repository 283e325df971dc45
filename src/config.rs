use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

use crate::leave::Days;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_days: i64,
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Annual balance given to users created without one.
    pub default_leave_balance: Days,
    pub monthly_accrual_days: Days,
    /// Users at or above this balance are skipped by the monthly accrual.
    pub monthly_accrual_cap: Days,
    pub stats_cache_ttl_secs: u64,
    pub accrual_check_interval_secs: u64,
}

fn var_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn days_var(key: &str, default: i64) -> Result<Days> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<Days>()
            .with_context(|| format!("{} must be a decimal number of days, got {:?}", key, value)),
        Err(_) => Ok(Days::whole(default)),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:hrleave.db".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                "your-super-secret-jwt-key-change-this-in-production-12345".to_string()
            }),
            jwt_expiration_days: var_or("JWT_EXPIRATION_DAYS", 30),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: var_or("PORT", 8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            default_leave_balance: days_var("DEFAULT_LEAVE_BALANCE", 20)?,
            monthly_accrual_days: days_var("MONTHLY_ACCRUAL_DAYS", 1)?,
            monthly_accrual_cap: days_var("MONTHLY_ACCRUAL_CAP", 18)?,
            stats_cache_ttl_secs: var_or("STATS_CACHE_TTL_SECS", 300),
            accrual_check_interval_secs: var_or("ACCRUAL_CHECK_INTERVAL_SECS", 3600),
        })
    }

    /// Defaults with a throwaway secret, for tests that build services directly.
    pub fn test_config(database_url: &str) -> Self {
        Config {
            database_url: database_url.to_string(),
            jwt_secret: "test-secret-key".to_string(),
            jwt_expiration_days: 1,
            host: "127.0.0.1".to_string(),
            port: 8080,
            environment: "test".to_string(),
            default_leave_balance: Days::whole(20),
            monthly_accrual_days: Days::whole(1),
            monthly_accrual_cap: Days::whole(18),
            stats_cache_ttl_secs: 60,
            accrual_check_interval_secs: 3600,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
