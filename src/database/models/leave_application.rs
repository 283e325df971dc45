use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::leave::{
    BalanceSource, DayType, Days, HalfSession, LeaveAssessment, LeaveRequest, LeaveStatus,
    LeaveType,
};

pub const MIN_REASON_LENGTH: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub leave_type: LeaveType,
    pub day_type: DayType,
    pub start_half_session: Option<HalfSession>,
    pub end_half_session: Option<HalfSession>,
    pub leave_days: Days,
    pub deducted_days: Days,
    pub unpaid_days: Days,
    pub balance_source: BalanceSource,
    pub status: LeaveStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveApplication {
    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }
}

/// Body of a leave submission or preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLeaveInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub day_type: Option<DayType>,
    pub start_half_session: Option<HalfSession>,
    pub end_half_session: Option<HalfSession>,
    pub leave_type: Option<String>,
    pub reason: String,
}

impl SubmitLeaveInput {
    /// Resolve defaults: the day type is inferred as half when only a
    /// session is given, and the leave type falls back to annual.
    pub fn into_request(self) -> Result<LeaveRequest, AppError> {
        let day_type = self.day_type.unwrap_or(
            if self.start_half_session.is_some() || self.end_half_session.is_some() {
                DayType::Half
            } else {
                DayType::Full
            },
        );

        let leave_type = match self.leave_type.as_deref().map(str::trim) {
            None | Some("") => LeaveType::default(),
            Some(value) => LeaveType::parse(value)?,
        };

        let reason = self.reason.trim().to_string();
        if reason.chars().count() < MIN_REASON_LENGTH {
            return Err(AppError::BadRequest(format!(
                "The reason must be at least {} characters.",
                MIN_REASON_LENGTH
            )));
        }

        Ok(LeaveRequest {
            start_date: self.start_date,
            end_date: self.end_date,
            day_type,
            start_half_session: self.start_half_session,
            end_half_session: self.end_half_session,
            leave_type,
            reason,
        })
    }
}

/// A row ready to insert, built from an accepted request.
#[derive(Debug, Clone)]
pub struct NewLeaveApplication {
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub leave_type: LeaveType,
    pub day_type: DayType,
    pub start_half_session: Option<HalfSession>,
    pub end_half_session: Option<HalfSession>,
    pub leave_days: Days,
    pub deducted_days: Days,
    pub unpaid_days: Days,
    pub balance_source: BalanceSource,
}

impl NewLeaveApplication {
    pub fn from_assessment(user_id: Uuid, request: LeaveRequest, assessment: &LeaveAssessment) -> Self {
        // Full days carry no sessions; a single half day stores its one session on both ends.
        let (start_half_session, end_half_session) = match request.day_type {
            DayType::Full => (None, None),
            DayType::Half if request.start_date == request.end_date => {
                (request.start_half_session, request.start_half_session)
            }
            DayType::Half => (request.start_half_session, request.end_half_session),
        };

        Self {
            user_id,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason,
            leave_type: request.leave_type,
            day_type: request.day_type,
            start_half_session,
            end_half_session,
            leave_days: assessment.days().clone(),
            deducted_days: assessment.amount_to_deduct().clone(),
            unpaid_days: assessment.amount_unpaid().clone(),
            balance_source: assessment.decision.balance_source,
        }
    }
}

/// Result of a dry run, returned by the preview endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveCalculation {
    pub leave_days: Days,
    pub is_half_day: bool,
    pub deduct_from_balance: Days,
    pub unpaid_days: Days,
    pub exempt_days: Days,
    pub balance_source: BalanceSource,
}

impl From<&LeaveAssessment> for LeaveCalculation {
    fn from(assessment: &LeaveAssessment) -> Self {
        Self {
            leave_days: assessment.day_count.days.clone(),
            is_half_day: assessment.day_count.is_half_day,
            deduct_from_balance: assessment.decision.deduct_from_balance.clone(),
            unpaid_days: assessment.decision.unpaid_days.clone(),
            exempt_days: assessment.decision.exempt_days.clone(),
            balance_source: assessment.decision.balance_source,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveApplicationFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<LeaveStatus>,
    pub leave_type: Option<LeaveType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RejectLeaveInput {
    pub reason: String,
}

pub const MAX_REASON_LENGTH: usize = 500;

/// Body of `PATCH /leave/{id}/reason`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReasonInput {
    pub reason: String,
}

impl UpdateReasonInput {
    /// Trimmed reason, held to the same bounds as a submission plus an upper limit.
    pub fn validated(&self) -> Result<String, AppError> {
        let reason = self.reason.trim();
        let length = reason.chars().count();

        if length < MIN_REASON_LENGTH {
            return Err(AppError::BadRequest(format!(
                "The reason must be at least {} characters.",
                MIN_REASON_LENGTH
            )));
        }
        if length > MAX_REASON_LENGTH {
            return Err(AppError::BadRequest(format!(
                "The reason may not be longer than {} characters.",
                MAX_REASON_LENGTH
            )));
        }

        Ok(reason.to_string())
    }
}
