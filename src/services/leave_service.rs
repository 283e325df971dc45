use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{
    BalanceChange, BalanceChangeType, BalanceType, CalendarLeave, CalendarQuery, CalendarRow,
    LeaveApplication, LeaveApplicationFilter, LeaveCalculation, LeaveStatistics,
    NewLeaveApplication, SubmitLeaveInput, UpdateReasonInput, User,
};
use crate::database::repositories::{
    LeaveApplicationRepository, LeaveBalanceRepository, StatusTransition, UserRepository,
};
use crate::error::AppError;
use crate::leave::overlap::ranges_overlap;
use crate::leave::{self, Days, LeaveStatus};
use crate::services::notifier::{LeaveEvent, LeaveNotification, Notifier};
use crate::services::stats_cache::StatsCache;
use crate::services::user_context::UserContext;
use crate::services::user_locks::UserLocks;

/// Runs leave applications through their lifecycle: preview, submission,
/// approval, rejection and cancellation.
///
/// Every step that touches a balance holds the applicant's lock from
/// [`UserLocks`] and runs in a single transaction, so two submissions for the
/// same user can never spend the same days.
#[derive(Clone)]
pub struct LeaveService {
    pool: SqlitePool,
    users: UserRepository,
    applications: LeaveApplicationRepository,
    balances: LeaveBalanceRepository,
    locks: UserLocks,
    stats: StatsCache,
    notifier: Arc<dyn Notifier>,
}

impl LeaveService {
    pub fn new(
        pool: SqlitePool,
        locks: UserLocks,
        stats: StatsCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            applications: LeaveApplicationRepository::new(pool.clone()),
            balances: LeaveBalanceRepository::new(pool.clone()),
            pool,
            locks,
            stats,
            notifier,
        }
    }

    /// Dry run of a submission against current data. Nothing is written.
    pub async fn calculate(
        &self,
        actor: &UserContext,
        input: SubmitLeaveInput,
        today: NaiveDate,
    ) -> Result<LeaveCalculation, AppError> {
        let request = input.into_request()?;

        let mut tx = self.pool.begin().await?;
        let user = self.load_user(&mut tx, actor.user_id()).await?;
        let existing = self
            .applications
            .blocking_ranges_for_user(&mut tx, user.id)
            .await?;
        tx.rollback().await?;

        let assessment = leave::assess(&request, today, &user.balance_snapshot(), &existing)?;
        Ok(LeaveCalculation::from(&assessment))
    }

    pub async fn submit(
        &self,
        actor: &UserContext,
        input: SubmitLeaveInput,
        today: NaiveDate,
    ) -> Result<LeaveApplication, AppError> {
        let request = input.into_request()?;
        let user_id = actor.user_id();

        let guard = self.locks.lock(user_id).await;
        let mut tx = self.pool.begin().await?;
        let user = self.load_user_for_update(&mut tx, user_id).await?;
        let existing = self
            .applications
            .blocking_ranges_for_user(&mut tx, user_id)
            .await?;

        let assessment = match leave::assess(&request, today, &user.balance_snapshot(), &existing) {
            Ok(assessment) => assessment,
            Err(error) => {
                log::info!("Leave submission by {} refused: {}", user_id, error);
                return Err(error.into());
            }
        };

        let new_application = NewLeaveApplication::from_assessment(user_id, request, &assessment);
        let application = self.applications.insert(&mut tx, &new_application).await?;

        if let Some(balance_type) = BalanceType::for_source(application.balance_source) {
            if application.deducted_days.is_positive() {
                let change = BalanceChange {
                    balance_type,
                    change_type: BalanceChangeType::Usage,
                    days_changed: Days::zero() - application.deducted_days.clone(),
                    description: format!(
                        "{} from {} to {}",
                        application.leave_type.display_name(),
                        application.start_date,
                        application.end_date
                    ),
                    related_application_id: Some(application.id),
                    accrual_period: None,
                };
                self.balances
                    .apply_change(&mut tx, &user, &change)
                    .await?
                    .ok_or_else(AppError::balance_conflict)?;
            }
        }

        tx.commit().await?;
        drop(guard);

        log::info!(
            "Leave application {} submitted by {}: {} days of {} ({} deducted, {} unpaid)",
            application.id,
            user_id,
            application.leave_days,
            application.leave_type,
            application.deducted_days,
            application.unpaid_days
        );

        self.invalidate_stats(&application).await;
        self.notify_approvers(&user, &application).await;

        Ok(application)
    }

    pub async fn approve(
        &self,
        actor: &UserContext,
        application_id: Uuid,
    ) -> Result<LeaveApplication, AppError> {
        let (application, applicant) = self.load_for_decision(actor, application_id).await?;

        let transition = StatusTransition {
            status: LeaveStatus::Approved,
            decided_by: Some(actor.user_id()),
            rejection_reason: None,
        };
        let approved = self.finish_pending(&application, &transition).await?;

        log::info!(
            "Leave application {} approved by {}",
            approved.id,
            actor.user_id()
        );
        self.notify_applicant(LeaveEvent::Approved, &applicant, &approved)
            .await;

        Ok(approved)
    }

    pub async fn reject(
        &self,
        actor: &UserContext,
        application_id: Uuid,
        reason: &str,
    ) -> Result<LeaveApplication, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::BadRequest(
                "A rejection reason is required.".to_string(),
            ));
        }

        let (application, applicant) = self.load_for_decision(actor, application_id).await?;

        let transition = StatusTransition {
            status: LeaveStatus::Rejected,
            decided_by: Some(actor.user_id()),
            rejection_reason: Some(reason.to_string()),
        };
        let rejected = self.finish_pending(&application, &transition).await?;

        log::info!(
            "Leave application {} rejected by {}",
            rejected.id,
            actor.user_id()
        );
        self.notify_applicant(LeaveEvent::Rejected, &applicant, &rejected)
            .await;

        Ok(rejected)
    }

    /// Applicants may withdraw their own pending applications.
    pub async fn cancel(
        &self,
        actor: &UserContext,
        application_id: Uuid,
    ) -> Result<LeaveApplication, AppError> {
        let application = self.find_application(application_id).await?;
        if application.user_id != actor.user_id() {
            return Err(AppError::PermissionDenied(
                "Only the applicant can cancel a leave application.".to_string(),
            ));
        }
        if !application.is_pending() {
            return Err(not_pending(&application));
        }

        let transition = StatusTransition {
            status: LeaveStatus::Cancelled,
            decided_by: None,
            rejection_reason: None,
        };
        let cancelled = self.finish_pending(&application, &transition).await?;

        log::info!("Leave application {} cancelled", cancelled.id);
        Ok(cancelled)
    }

    /// Applicants may reword the reason while the application is pending.
    pub async fn update_reason(
        &self,
        actor: &UserContext,
        application_id: Uuid,
        input: &UpdateReasonInput,
    ) -> Result<LeaveApplication, AppError> {
        let application = self.find_application(application_id).await?;
        if application.user_id != actor.user_id() {
            return Err(AppError::PermissionDenied(
                "Only the applicant can change the reason of a leave application.".to_string(),
            ));
        }
        if !application.is_pending() {
            return Err(not_pending(&application));
        }
        let reason = input.validated()?;

        let updated = self
            .applications
            .update_pending_reason(application_id, actor.user_id(), &reason)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Leave application {} was decided by another request.",
                    application_id
                ))
            })?;

        log::info!("Reason of leave application {} updated", updated.id);
        Ok(updated)
    }

    /// Who is on approved leave between the query's dates, one row per
    /// matching employee.
    pub async fn calendar(
        &self,
        query: &CalendarQuery,
        today: NaiveDate,
    ) -> Result<Vec<CalendarRow>, AppError> {
        let (start, end) = query.window(today)?;
        let users = self.users.search_by_name(query.name_filter()).await?;
        let leaves: Vec<CalendarLeave> = self
            .applications
            .approved_starting_by(end)
            .await?
            .into_iter()
            .filter(|leave| ranges_overlap(start, end, leave.start_date, leave.end_date))
            .collect();

        let absent_only = query.absent_only.unwrap_or(false);
        let rows = users
            .into_iter()
            .map(|user| {
                let own: Vec<&CalendarLeave> = leaves
                    .iter()
                    .filter(|leave| leave.user_id == user.id)
                    .collect();
                CalendarRow::build(user.id, user.name, &own, start, end, today)
            })
            .filter(|row| !absent_only || row.has_absence)
            .collect();

        Ok(rows)
    }

    /// Employees only ever see their own applications; leave managers may
    /// filter across everyone.
    pub async fn list(
        &self,
        actor: &UserContext,
        mut filter: LeaveApplicationFilter,
    ) -> Result<Vec<LeaveApplication>, AppError> {
        if !actor.is_leave_manager() {
            filter.user_id = Some(actor.user_id());
        }

        Ok(self.applications.list(&filter).await?)
    }

    pub async fn get(
        &self,
        actor: &UserContext,
        application_id: Uuid,
    ) -> Result<LeaveApplication, AppError> {
        let application = self.find_application(application_id).await?;
        if actor.can_access_user_resource(application.user_id) {
            return Ok(application);
        }

        let applicant = self.find_user(application.user_id).await?;
        if actor.can_approve(&application, &applicant) {
            Ok(application)
        } else {
            Err(AppError::PermissionDenied(
                "You cannot view this leave application.".to_string(),
            ))
        }
    }

    pub async fn statistics(
        &self,
        actor: &UserContext,
        user_id: Option<Uuid>,
        year: i32,
    ) -> Result<LeaveStatistics, AppError> {
        let user_id = user_id.unwrap_or_else(|| actor.user_id());
        if !actor.can_access_user_resource(user_id) {
            return Err(AppError::PermissionDenied(
                "You cannot view leave statistics for this user.".to_string(),
            ));
        }

        let user = self.find_user(user_id).await?;
        let totals = match self.stats.get(user_id, year).await {
            Some(totals) => totals,
            None => {
                let totals = self.applications.year_totals(user_id, year).await?;
                self.stats.insert(user_id, year, totals.clone()).await;
                totals
            }
        };

        Ok(LeaveStatistics {
            year,
            remaining_balance: user.leave_balance,
            comp_off_balance: user.comp_off_balance,
            totals,
        })
    }

    /// Who is told about, and may decide, `applicant`'s leave: the designated
    /// approver (else the parent) followed by every leave manager.
    pub async fn approvers(&self, applicant: &User) -> Result<Vec<User>, AppError> {
        let mut approvers = Vec::new();

        if let Some(approver_id) = applicant.leave_approver_id.or(applicant.parent_id) {
            if let Some(approver) = self.users.find_by_id(approver_id).await? {
                approvers.push(approver);
            }
        }
        approvers.extend(self.users.find_leave_managers().await?);

        let mut seen = HashSet::new();
        approvers.retain(|approver| approver.id != applicant.id && seen.insert(approver.id));

        Ok(approvers)
    }

    pub async fn approvers_for(&self, actor: &UserContext) -> Result<Vec<User>, AppError> {
        self.approvers(&actor.user).await
    }

    async fn load_for_decision(
        &self,
        actor: &UserContext,
        application_id: Uuid,
    ) -> Result<(LeaveApplication, User), AppError> {
        let application = self.find_application(application_id).await?;
        let applicant = self.find_user(application.user_id).await?;

        if !actor.can_approve(&application, &applicant) {
            return Err(AppError::PermissionDenied(
                "You are not allowed to decide on this leave application.".to_string(),
            ));
        }
        if !application.is_pending() {
            return Err(not_pending(&application));
        }

        Ok((application, applicant))
    }

    /// Moves a pending application to its final status and, unless it was
    /// approved, refunds whatever the submission debited.
    async fn finish_pending(
        &self,
        application: &LeaveApplication,
        transition: &StatusTransition,
    ) -> Result<LeaveApplication, AppError> {
        let _guard = self.locks.lock(application.user_id).await;
        let mut tx = self.pool.begin().await?;
        let applicant = self
            .load_user_for_update(&mut tx, application.user_id)
            .await?;

        let updated = self
            .applications
            .transition_from_pending(&mut tx, application.id, transition)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!(
                    "Leave application {} was decided by another request.",
                    application.id
                ))
            })?;

        if transition.status != LeaveStatus::Approved {
            self.refund(&mut tx, &applicant, &updated).await?;
        }

        tx.commit().await?;
        self.invalidate_stats(&updated).await;

        Ok(updated)
    }

    async fn refund(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        applicant: &User,
        application: &LeaveApplication,
    ) -> Result<(), AppError> {
        let Some(balance_type) = BalanceType::for_source(application.balance_source) else {
            return Ok(());
        };
        if !application.deducted_days.is_positive() {
            return Ok(());
        }

        let change = BalanceChange {
            balance_type,
            change_type: BalanceChangeType::Refund,
            days_changed: application.deducted_days.clone(),
            description: format!(
                "Refund for {} application ({})",
                application.status, application.id
            ),
            related_application_id: Some(application.id),
            accrual_period: None,
        };
        self.balances
            .apply_change(tx, applicant, &change)
            .await?
            .ok_or_else(AppError::balance_conflict)?;

        log::info!(
            "Refunded {} {} days to {} for application {}",
            application.deducted_days,
            balance_type,
            applicant.id,
            application.id
        );
        Ok(())
    }

    async fn load_user(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user_id: Uuid,
    ) -> Result<User, AppError> {
        self.users
            .find_by_id_tx(tx, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    async fn load_user_for_update(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        user_id: Uuid,
    ) -> Result<User, AppError> {
        if !self.users.lock_for_update(tx, user_id).await? {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        self.load_user(tx, user_id).await
    }

    async fn find_user(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    async fn find_application(&self, application_id: Uuid) -> Result<LeaveApplication, AppError> {
        self.applications
            .find_by_id(application_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Leave application {} not found", application_id))
            })
    }

    async fn invalidate_stats(&self, application: &LeaveApplication) {
        self.stats
            .invalidate(application.user_id, application.start_date.year())
            .await;
    }

    async fn notify_approvers(&self, applicant: &User, application: &LeaveApplication) {
        let approvers = match self.approvers(applicant).await {
            Ok(approvers) => approvers,
            Err(error) => {
                log::error!(
                    "Could not resolve approvers for application {}: {}",
                    application.id,
                    error
                );
                return;
            }
        };

        for approver in approvers {
            let notification = LeaveNotification::for_application(
                LeaveEvent::Submitted,
                application,
                approver.id,
                &approver.email,
            );
            if let Err(error) = self.notifier.notify(&notification).await {
                log::error!(
                    "Failed to notify approver {} about application {}: {}",
                    approver.id,
                    application.id,
                    error
                );
            }
        }
    }

    async fn notify_applicant(
        &self,
        event: LeaveEvent,
        applicant: &User,
        application: &LeaveApplication,
    ) {
        let notification =
            LeaveNotification::for_application(event, application, applicant.id, &applicant.email);
        if let Err(error) = self.notifier.notify(&notification).await {
            log::error!(
                "Failed to notify applicant {} about application {}: {}",
                applicant.id,
                application.id,
                error
            );
        }
    }
}

fn not_pending(application: &LeaveApplication) -> AppError {
    AppError::BadRequest(format!(
        "Leave application {} is already {}.",
        application.id, application.status
    ))
}
