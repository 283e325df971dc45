use anyhow::Result;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{BalanceChange, BalanceType, LeaveBalanceHistory, User};

#[derive(Clone)]
pub struct LeaveBalanceRepository {
    pool: SqlitePool,
}

impl LeaveBalanceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Applies `change` to the balance read into `user` and records it in the
    /// ledger. The write only lands if the row still carries the version that
    /// was read; otherwise nothing is written and `None` is returned.
    pub async fn apply_change(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user: &User,
        change: &BalanceChange,
    ) -> Result<Option<LeaveBalanceHistory>> {
        let previous_balance = match change.balance_type {
            BalanceType::Annual => user.leave_balance.clone(),
            BalanceType::CompOff => user.comp_off_balance.clone(),
        };
        let new_balance = &previous_balance + &change.days_changed;
        let now = Utc::now();

        let update = format!(
            r#"
            UPDATE users
            SET
                {} = ?,
                balance_version = balance_version + 1,
                updated_at = ?
            WHERE id = ?
              AND balance_version = ?
            "#,
            change.balance_type.column()
        );
        let result = sqlx::query(&update)
            .bind(&new_balance)
            .bind(now)
            .bind(user.id)
            .bind(user.balance_version)
            .execute(&mut **tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let entry = sqlx::query_as::<_, LeaveBalanceHistory>(
            r#"
            INSERT INTO leave_balance_history (
                user_id, balance_type, change_type, days_changed, previous_balance,
                new_balance, description, related_application_id, accrual_period, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                user_id,
                balance_type,
                change_type,
                days_changed,
                previous_balance,
                new_balance,
                description,
                related_application_id,
                accrual_period,
                created_at
            "#,
        )
        .bind(user.id)
        .bind(change.balance_type)
        .bind(change.change_type)
        .bind(&change.days_changed)
        .bind(&previous_balance)
        .bind(&new_balance)
        .bind(&change.description)
        .bind(change.related_application_id)
        .bind(&change.accrual_period)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;

        Ok(Some(entry))
    }

    /// Get balance history for a user, newest first
    pub async fn history(&self, user_id: Uuid, limit: i64) -> Result<Vec<LeaveBalanceHistory>> {
        let history = sqlx::query_as::<_, LeaveBalanceHistory>(
            r#"
            SELECT
                id,
                user_id,
                balance_type,
                change_type,
                days_changed,
                previous_balance,
                new_balance,
                description,
                related_application_id,
                accrual_period,
                created_at
            FROM leave_balance_history
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    pub async fn has_accrual(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user_id: Uuid,
        period: &str,
    ) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM leave_balance_history WHERE user_id = ? AND accrual_period = ?",
        )
        .bind(user_id)
        .bind(period)
        .fetch_one(&mut **tx)
        .await?;

        Ok(count > 0)
    }
}
