use std::env;

use hrleave::config::Config;
use hrleave::leave::Days;
use pretty_assertions::assert_eq;
use serial_test::serial;

mod common;

const KEYS: [&str; 11] = [
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRATION_DAYS",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "DEFAULT_LEAVE_BALANCE",
    "MONTHLY_ACCRUAL_DAYS",
    "MONTHLY_ACCRUAL_CAP",
    "STATS_CACHE_TTL_SECS",
    "ACCRUAL_CHECK_INTERVAL_SECS",
];

/// Runs `test` with the config variables cleared, restoring them afterwards.
fn with_clean_env(test: impl FnOnce()) {
    common::setup_test_env();
    let original: Vec<_> = KEYS.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in KEYS {
        unsafe {
            env::remove_var(key);
        }
    }

    test();

    for (key, value) in original {
        unsafe {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn config_defaults_apply_when_nothing_is_set() {
    with_clean_env(|| {
        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "sqlite:hrleave.db");
        assert_eq!(config.jwt_expiration_days, 30);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.default_leave_balance, Days::whole(20));
        assert_eq!(config.monthly_accrual_days, Days::whole(1));
        assert_eq!(config.monthly_accrual_cap, Days::whole(18));
        assert_eq!(config.stats_cache_ttl_secs, 300);
        assert!(!config.is_production());
    });
}

#[test]
#[serial]
fn config_reads_custom_values() {
    with_clean_env(|| {
        unsafe {
            env::set_var("DATABASE_URL", "sqlite:./custom.db");
            env::set_var("PORT", "9090");
            env::set_var("ENVIRONMENT", "production");
            env::set_var("DEFAULT_LEAVE_BALANCE", "24");
            env::set_var("MONTHLY_ACCRUAL_DAYS", "1.5");
        }

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "sqlite:./custom.db");
        assert_eq!(config.server_address(), "127.0.0.1:9090");
        assert!(config.is_production());
        assert_eq!(config.default_leave_balance, Days::whole(24));
        assert_eq!(config.monthly_accrual_days, Days::whole(1) + Days::half());
    });
}

#[test]
#[serial]
fn malformed_numbers_fall_back_but_malformed_days_fail() {
    with_clean_env(|| {
        unsafe {
            env::set_var("PORT", "not-a-port");
        }
        assert_eq!(Config::from_env_only().unwrap().port, 8080);

        unsafe {
            env::set_var("MONTHLY_ACCRUAL_CAP", "eighteen");
        }
        let error = Config::from_env_only().unwrap_err();
        assert!(error.to_string().contains("MONTHLY_ACCRUAL_CAP"));
    });
}
