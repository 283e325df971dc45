use chrono::{Datelike, NaiveDate};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{
    AccrualSummary, BalanceAdjustmentInput, BalanceChange, BalanceChangeType, BalanceType,
    CompOffCreditInput, LeaveBalanceHistory, User,
};
use crate::database::repositories::{LeaveBalanceRepository, UserRepository};
use crate::error::AppError;
use crate::leave::Days;
use crate::services::user_context::UserContext;
use crate::services::user_locks::UserLocks;

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
const MAX_HISTORY_LIMIT: i64 = 500;

#[derive(Clone)]
pub struct BalanceService {
    pool: SqlitePool,
    users: UserRepository,
    balances: LeaveBalanceRepository,
    locks: UserLocks,
    accrual_days: Days,
    accrual_cap: Days,
}

impl BalanceService {
    pub fn new(pool: SqlitePool, locks: UserLocks, config: &Config) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            balances: LeaveBalanceRepository::new(pool.clone()),
            pool,
            locks,
            accrual_days: config.monthly_accrual_days.clone(),
            accrual_cap: config.monthly_accrual_cap.clone(),
        }
    }

    /// Signed manual change to the annual balance.
    pub async fn adjust(
        &self,
        actor: &UserContext,
        user_id: Uuid,
        input: BalanceAdjustmentInput,
    ) -> Result<LeaveBalanceHistory, AppError> {
        if !actor.can_adjust_balances() {
            return Err(AppError::PermissionDenied(
                "Only admin or HR users can adjust leave balances.".to_string(),
            ));
        }

        let days = Days::from_input(input.days_changed.into_inner());
        if days.is_zero() {
            return Err(AppError::BadRequest(
                "An adjustment must change the balance.".to_string(),
            ));
        }
        let description = required_description(&input.description)?;

        let entry = self
            .apply(user_id, |user| {
                if (&user.leave_balance + &days).is_negative() {
                    return Err(AppError::BadRequest(format!(
                        "Adjustment of {} days would leave a negative balance ({} days remaining).",
                        days, user.leave_balance
                    )));
                }
                Ok(BalanceChange {
                    balance_type: BalanceType::Annual,
                    change_type: BalanceChangeType::Adjustment,
                    days_changed: days.clone(),
                    description: description.clone(),
                    related_application_id: None,
                    accrual_period: None,
                })
            })
            .await?;

        log::info!(
            "Annual balance of {} adjusted by {} days by {}",
            user_id,
            entry.days_changed,
            actor.user_id()
        );
        Ok(entry)
    }

    pub async fn credit_comp_off(
        &self,
        actor: &UserContext,
        user_id: Uuid,
        input: CompOffCreditInput,
    ) -> Result<LeaveBalanceHistory, AppError> {
        if !actor.is_leave_manager() {
            return Err(AppError::PermissionDenied(
                "Only admin, HR or manager users can credit compensatory leave.".to_string(),
            ));
        }

        let days = Days::from_input(input.comp_off_days.into_inner());
        if days < Days::half() {
            return Err(AppError::BadRequest(
                "Compensatory leave credits must be at least 0.5 days.".to_string(),
            ));
        }
        let description = input
            .description
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or("Compensatory off credited")
            .to_string();

        let entry = self
            .apply(user_id, |_| {
                Ok(BalanceChange {
                    balance_type: BalanceType::CompOff,
                    change_type: BalanceChangeType::Credit,
                    days_changed: days.clone(),
                    description: description.clone(),
                    related_application_id: None,
                    accrual_period: None,
                })
            })
            .await?;

        log::info!(
            "Credited {} comp-off days to {} by {}",
            entry.days_changed,
            user_id,
            actor.user_id()
        );
        Ok(entry)
    }

    pub async fn history(
        &self,
        actor: &UserContext,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<LeaveBalanceHistory>, AppError> {
        if !actor.can_access_user_resource(user_id) {
            return Err(AppError::PermissionDenied(
                "You cannot view the balance history of this user.".to_string(),
            ));
        }

        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        Ok(self.balances.history(user_id, limit).await?)
    }

    pub async fn run_monthly_accrual_as(
        &self,
        actor: &UserContext,
        today: NaiveDate,
    ) -> Result<AccrualSummary, AppError> {
        if !actor.can_adjust_balances() {
            return Err(AppError::PermissionDenied(
                "Only admin or HR users can run the monthly accrual.".to_string(),
            ));
        }
        self.run_monthly_accrual(today).await
    }

    /// Credits every user below the cap once for the month containing `today`.
    /// Running it again in the same month changes nothing.
    pub async fn run_monthly_accrual(&self, today: NaiveDate) -> Result<AccrualSummary, AppError> {
        let period = format!("{:04}-{:02}", today.year(), today.month());
        let mut summary = AccrualSummary {
            period: period.clone(),
            credited_users: 0,
            skipped_users: 0,
        };

        for user in self.users.list_all().await? {
            let credited = self.accrue(user.id, &period).await?;
            if credited {
                summary.credited_users += 1;
            } else {
                summary.skipped_users += 1;
            }
        }

        log::info!(
            "Monthly accrual for {}: {} credited, {} skipped",
            summary.period,
            summary.credited_users,
            summary.skipped_users
        );
        Ok(summary)
    }

    async fn accrue(&self, user_id: Uuid, period: &str) -> Result<bool, AppError> {
        let _guard = self.locks.lock(user_id).await;
        let mut tx = self.pool.begin().await?;

        if !self.users.lock_for_update(&mut tx, user_id).await? {
            return Ok(false);
        }
        if self.balances.has_accrual(&mut tx, user_id, period).await? {
            return Ok(false);
        }
        let Some(user) = self.users.find_by_id_tx(&mut tx, user_id).await? else {
            return Ok(false);
        };
        if user.leave_balance >= self.accrual_cap {
            return Ok(false);
        }

        let change = BalanceChange {
            balance_type: BalanceType::Annual,
            change_type: BalanceChangeType::Accrual,
            days_changed: self.accrual_days.clone(),
            description: format!("Monthly leave accrual for {}", period),
            related_application_id: None,
            accrual_period: Some(period.to_string()),
        };
        self.balances
            .apply_change(&mut tx, &user, &change)
            .await?
            .ok_or_else(AppError::balance_conflict)?;
        tx.commit().await?;

        Ok(true)
    }

    /// Runs `build` against a fresh read of the user under their lock and
    /// applies the change it returns.
    async fn apply<F>(&self, user_id: Uuid, build: F) -> Result<LeaveBalanceHistory, AppError>
    where
        F: FnOnce(&User) -> Result<BalanceChange, AppError>,
    {
        let _guard = self.locks.lock(user_id).await;
        let mut tx = self.pool.begin().await?;

        if !self.users.lock_for_update(&mut tx, user_id).await? {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        let user = self
            .users
            .find_by_id_tx(&mut tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let change = build(&user)?;
        let entry = self
            .balances
            .apply_change(&mut tx, &user, &change)
            .await?
            .ok_or_else(AppError::balance_conflict)?;
        tx.commit().await?;

        Ok(entry)
    }
}

fn required_description(description: &str) -> Result<String, AppError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(AppError::BadRequest(
            "A description is required for balance adjustments.".to_string(),
        ));
    }
    Ok(description.to_string())
}
