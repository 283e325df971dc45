use chrono::NaiveDate;
use thiserror::Error;

use super::days::Days;
use super::types::LeaveType;

/// Every way a leave submission can be refused by the calculator.
///
/// None of these are transient; retrying with the same input yields the
/// same error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LeaveError {
    #[error("Start date ({start}) must be before or equal to the end date ({end}).")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Cannot apply for leave in the past ({start} is before {today}).")]
    PastDate { start: NaiveDate, today: NaiveDate },

    #[error("A single leave application may span at most {max} calendar days ({start} to {end}).")]
    RangeTooLong {
        start: NaiveDate,
        end: NaiveDate,
        max: i64,
    },

    #[error("The start session is required for a half-day leave.")]
    MissingSession,

    #[error(
        "A single half day cannot cover both morning and afternoon. Submit a full day instead."
    )]
    AmbiguousSession,

    #[error("A half-day session cannot be placed on {date}, which falls on a weekend.")]
    InvalidSessionPlacement { date: NaiveDate },

    #[error(
        "The selected leave period results in zero or fewer leave days. Please check your dates and sessions."
    )]
    EmptyRange { half_day: bool },

    #[error(
        "Insufficient annual leave balance. You have {remaining} days remaining, but requested {requested} days."
    )]
    InsufficientBalance { remaining: Days, requested: Days },

    #[error("{} cannot exceed {cap} days, but requested {requested} days.", .leave_type.display_name())]
    ExceedsStatutoryCap {
        leave_type: LeaveType,
        cap: Days,
        requested: Days,
    },

    #[error(
        "Insufficient compensatory leave balance. You have {remaining} comp-off days, but requested {requested} days."
    )]
    InsufficientCompOffBalance { remaining: Days, requested: Days },

    #[error("Invalid leave type selected: {0}")]
    UnknownLeaveType(String),

    #[error(
        "You already have an approved or pending leave application that overlaps with these dates."
    )]
    OverlappingRequest,
}

/// How a host should surface a [`LeaveError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveErrorKind {
    /// Malformed or out of policy input.
    Validation,
    /// Well formed, refused by a balance or cap rule.
    BusinessRule,
    /// Clashes with existing data; the dates must change.
    Conflict,
}

impl LeaveError {
    pub fn kind(&self) -> LeaveErrorKind {
        match self {
            LeaveError::InvalidRange { .. }
            | LeaveError::PastDate { .. }
            | LeaveError::RangeTooLong { .. }
            | LeaveError::MissingSession
            | LeaveError::AmbiguousSession
            | LeaveError::InvalidSessionPlacement { .. }
            | LeaveError::EmptyRange { .. } => LeaveErrorKind::Validation,
            LeaveError::InsufficientBalance { .. }
            | LeaveError::ExceedsStatutoryCap { .. }
            | LeaveError::InsufficientCompOffBalance { .. }
            | LeaveError::UnknownLeaveType(_) => LeaveErrorKind::BusinessRule,
            LeaveError::OverlappingRequest => LeaveErrorKind::Conflict,
        }
    }

    /// Stable machine-readable name, independent of the message wording.
    pub fn code(&self) -> &'static str {
        match self {
            LeaveError::InvalidRange { .. } => "invalid_range",
            LeaveError::PastDate { .. } => "past_date",
            LeaveError::RangeTooLong { .. } => "range_too_long",
            LeaveError::MissingSession => "missing_session",
            LeaveError::AmbiguousSession => "ambiguous_session",
            LeaveError::InvalidSessionPlacement { .. } => "invalid_session_placement",
            LeaveError::EmptyRange { .. } => "empty_range",
            LeaveError::InsufficientBalance { .. } => "insufficient_balance",
            LeaveError::ExceedsStatutoryCap { .. } => "exceeds_statutory_cap",
            LeaveError::InsufficientCompOffBalance { .. } => "insufficient_comp_off_balance",
            LeaveError::UnknownLeaveType(_) => "unknown_leave_type",
            LeaveError::OverlappingRequest => "overlapping_request",
        }
    }

    /// The input field a form should highlight.
    pub fn field(&self) -> &'static str {
        match self {
            LeaveError::MissingSession | LeaveError::AmbiguousSession => "start_half_session",
            LeaveError::InvalidSessionPlacement { .. }
            | LeaveError::EmptyRange { half_day: true } => "end_half_session",
            LeaveError::RangeTooLong { .. } => "end_date",
            LeaveError::UnknownLeaveType(_) => "leave_type",
            _ => "start_date",
        }
    }
}
