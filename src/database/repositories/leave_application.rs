use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{
    CalendarLeave, LeaveApplication, LeaveApplicationFilter, NewLeaveApplication, YearTotals,
};
use crate::leave::{Days, ExistingLeaveRange, LeaveStatus};

const APPLICATION_COLUMNS: &str = r#"
    id,
    user_id,
    start_date,
    end_date,
    reason,
    leave_type,
    day_type,
    start_half_session,
    end_half_session,
    leave_days,
    deducted_days,
    unpaid_days,
    balance_source,
    status,
    approved_by,
    approved_at,
    rejection_reason,
    created_at,
    updated_at
"#;

/// A status change applied only while the application is still pending.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    pub status: LeaveStatus,
    pub decided_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
}

#[derive(Clone)]
pub struct LeaveApplicationRepository {
    pool: SqlitePool,
}

impl LeaveApplicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        application: &NewLeaveApplication,
    ) -> Result<LeaveApplication> {
        let now = Utc::now();
        let query = format!(
            r#"
            INSERT INTO leave_applications (
                id, user_id, start_date, end_date, reason, leave_type, day_type,
                start_half_session, end_half_session, leave_days, deducted_days,
                unpaid_days, balance_source, status, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(Uuid::new_v4())
            .bind(application.user_id)
            .bind(application.start_date)
            .bind(application.end_date)
            .bind(&application.reason)
            .bind(application.leave_type)
            .bind(application.day_type)
            .bind(application.start_half_session)
            .bind(application.end_half_session)
            .bind(&application.leave_days)
            .bind(&application.deducted_days)
            .bind(&application.unpaid_days)
            .bind(application.balance_source)
            .bind(LeaveStatus::Pending)
            .bind(now)
            .bind(now)
            .fetch_one(&mut **tx)
            .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<LeaveApplication>> {
        let query = format!("SELECT {APPLICATION_COLUMNS} FROM leave_applications WHERE id = ?");
        let application = sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(application)
    }

    pub async fn find_by_id_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
    ) -> Result<Option<LeaveApplication>> {
        let query = format!("SELECT {APPLICATION_COLUMNS} FROM leave_applications WHERE id = ?");
        let application = sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(application)
    }

    /// Get applications with optional filtering, newest first
    pub async fn list(&self, filter: &LeaveApplicationFilter) -> Result<Vec<LeaveApplication>> {
        let mut query = format!(
            "SELECT {APPLICATION_COLUMNS} FROM leave_applications WHERE 1=1"
        );

        if filter.user_id.is_some() {
            query.push_str(" AND user_id = ?");
        }
        if filter.status.is_some() {
            query.push_str(" AND status = ?");
        }
        if filter.leave_type.is_some() {
            query.push_str(" AND leave_type = ?");
        }
        query.push_str(" ORDER BY start_date DESC, created_at DESC");

        let mut sql_query = sqlx::query_as::<_, LeaveApplication>(&query);
        if let Some(user_id) = filter.user_id {
            sql_query = sql_query.bind(user_id);
        }
        if let Some(status) = filter.status {
            sql_query = sql_query.bind(status);
        }
        if let Some(leave_type) = filter.leave_type {
            sql_query = sql_query.bind(leave_type);
        }

        let applications = sql_query.fetch_all(&self.pool).await?;
        Ok(applications)
    }

    /// Pending and approved ranges for a user; these are the only ones that
    /// block new dates.
    pub async fn blocking_ranges_for_user(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user_id: Uuid,
    ) -> Result<Vec<ExistingLeaveRange>> {
        let ranges = sqlx::query_as::<_, ExistingLeaveRange>(
            r#"
            SELECT start_date, end_date, status
            FROM leave_applications
            WHERE user_id = ?
              AND status IN (?, ?)
            "#,
        )
        .bind(user_id)
        .bind(LeaveStatus::Pending)
        .bind(LeaveStatus::Approved)
        .fetch_all(&mut **tx)
        .await?;

        Ok(ranges)
    }

    /// Moves a pending application to its final status. Returns `None` when
    /// the application was no longer pending.
    pub async fn transition_from_pending(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: Uuid,
        transition: &StatusTransition,
    ) -> Result<Option<LeaveApplication>> {
        let now = Utc::now();
        let approved_at = (transition.status == LeaveStatus::Approved).then_some(now);
        let query = format!(
            r#"
            UPDATE leave_applications
            SET
                status = ?,
                approved_by = ?,
                approved_at = ?,
                rejection_reason = ?,
                updated_at = ?
            WHERE id = ?
              AND status = ?
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(transition.status)
            .bind(transition.decided_by)
            .bind(approved_at)
            .bind(&transition.rejection_reason)
            .bind(now)
            .bind(id)
            .bind(LeaveStatus::Pending)
            .fetch_optional(&mut **tx)
            .await?;

        Ok(updated)
    }

    /// Approved applications starting on or before `end`; callers narrow
    /// them down to the ones that overlap their window.
    pub async fn approved_starting_by(&self, end: NaiveDate) -> Result<Vec<CalendarLeave>> {
        let leaves = sqlx::query_as::<_, CalendarLeave>(
            r#"
            SELECT user_id, start_date, end_date, leave_type, day_type, leave_days
            FROM leave_applications
            WHERE status = ?
              AND start_date <= ?
            ORDER BY start_date
            "#,
        )
        .bind(LeaveStatus::Approved)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(leaves)
    }

    /// Rewrites the reason of a pending application owned by `user_id`.
    /// Returns `None` when no such pending application exists.
    pub async fn update_pending_reason(
        &self,
        id: Uuid,
        user_id: Uuid,
        reason: &str,
    ) -> Result<Option<LeaveApplication>> {
        let query = format!(
            r#"
            UPDATE leave_applications
            SET reason = ?, updated_at = ?
            WHERE id = ?
              AND user_id = ?
              AND status = ?
            RETURNING {APPLICATION_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, LeaveApplication>(&query)
            .bind(reason)
            .bind(Utc::now())
            .bind(id)
            .bind(user_id)
            .bind(LeaveStatus::Pending)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    /// Totals for applications starting in `year`.
    pub async fn year_totals(&self, user_id: Uuid, year: i32) -> Result<YearTotals> {
        let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Ok(YearTotals::default());
        };

        let rows = sqlx::query_as::<_, (LeaveStatus, Days, Days)>(
            r#"
            SELECT status, leave_days, unpaid_days
            FROM leave_applications
            WHERE user_id = ?
              AND start_date BETWEEN ? AND ?
            "#,
        )
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await?;

        let mut totals = YearTotals::default();
        for (status, leave_days, unpaid_days) in rows {
            match status {
                LeaveStatus::Approved => {
                    totals.approved_applications += 1;
                    totals.used_days = totals.used_days + leave_days;
                    totals.unpaid_days = totals.unpaid_days + unpaid_days;
                }
                LeaveStatus::Pending => {
                    totals.pending_applications += 1;
                    totals.pending_days = totals.pending_days + leave_days;
                }
                LeaveStatus::Rejected => totals.rejected_applications += 1,
                LeaveStatus::Cancelled => totals.cancelled_applications += 1,
            }
        }

        Ok(totals)
    }
}
