use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::days::Days;
use super::error::LeaveError;
use crate::database::models::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveType {
        Annual => "annual",
        Sick => "sick",
        Personal => "personal",
        Emergency => "emergency",
        Maternity => "maternity",
        Paternity => "paternity",
        Compensatory => "compensatory",
        Wfh => "wfh",
    }
}

impl LeaveType {
    /// Parse a caller supplied leave type, rejecting anything outside the enum.
    pub fn parse(value: &str) -> Result<Self, LeaveError> {
        value
            .parse()
            .map_err(|_| LeaveError::UnknownLeaveType(value.to_string()))
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            LeaveType::Annual => "Annual Leave",
            LeaveType::Sick => "Sick Leave",
            LeaveType::Personal => "Personal Leave",
            LeaveType::Emergency => "Emergency Leave",
            LeaveType::Maternity => "Maternity Leave",
            LeaveType::Paternity => "Paternity Leave",
            LeaveType::Compensatory => "Compensatory Leave",
            LeaveType::Wfh => "Work From Home",
        }
    }
}

impl Default for LeaveType {
    fn default() -> Self {
        LeaveType::Annual
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum DayType {
        Full => "full",
        Half => "half",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum HalfSession {
        Morning => "morning",
        Afternoon => "afternoon",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
    #[serde(rename_all = "snake_case")]
    pub enum LeaveStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Cancelled => "cancelled",
    }
}

impl LeaveStatus {
    /// Pending and approved applications block their dates; the rest do not.
    pub fn blocks_dates(&self) -> bool {
        matches!(self, LeaveStatus::Pending | LeaveStatus::Approved)
    }
}

string_enum! {
    /// Which stored balance a decision draws from.
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum BalanceSource {
        Annual => "annual",
        CompOff => "comp_off",
        None => "none",
    }
}

/// A leave submission as seen by the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub day_type: DayType,
    pub start_half_session: Option<HalfSession>,
    pub end_half_session: Option<HalfSession>,
    pub leave_type: LeaveType,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCountResult {
    pub days: Days,
    pub is_half_day: bool,
}

/// Snapshot of the balances a request may draw from, taken by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BalanceSnapshot {
    pub remaining_balance: Days,
    pub comp_off_balance: Days,
}

impl BalanceSnapshot {
    pub fn new(remaining_balance: Days, comp_off_balance: Days) -> Self {
        Self {
            remaining_balance: remaining_balance.non_negative(),
            comp_off_balance: comp_off_balance.non_negative(),
        }
    }
}

/// Outcome of reconciling a day count against a balance snapshot.
///
/// When not rejected, `deduct_from_balance + unpaid_days + exempt_days`
/// equals the requested days. Types that draw from a balance never have
/// exempt days.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceDecision {
    pub deduct_from_balance: Days,
    pub unpaid_days: Days,
    pub exempt_days: Days,
    pub balance_source: BalanceSource,
    pub rejection: Option<LeaveError>,
}

impl BalanceDecision {
    pub(crate) fn deduct(source: BalanceSource, deduct: Days, unpaid: Days) -> Self {
        Self {
            deduct_from_balance: deduct,
            unpaid_days: unpaid,
            exempt_days: Days::zero(),
            balance_source: source,
            rejection: None,
        }
    }

    pub(crate) fn exempt(days: Days) -> Self {
        Self {
            deduct_from_balance: Days::zero(),
            unpaid_days: Days::zero(),
            exempt_days: days,
            balance_source: BalanceSource::None,
            rejection: None,
        }
    }

    pub(crate) fn rejected(source: BalanceSource, reason: LeaveError) -> Self {
        Self {
            deduct_from_balance: Days::zero(),
            unpaid_days: Days::zero(),
            exempt_days: Days::zero(),
            balance_source: source,
            rejection: Some(reason),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }

    pub fn rejection_reason(&self) -> Option<String> {
        self.rejection.as_ref().map(|e| e.to_string())
    }

    /// Turn a rejected decision into its error.
    pub fn into_result(self) -> Result<Self, LeaveError> {
        match self.rejection {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

/// An existing application as far as overlap checking is concerned.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ExistingLeaveRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
}

/// Everything a caller needs to persist a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveAssessment {
    pub day_count: DayCountResult,
    pub decision: BalanceDecision,
}

impl LeaveAssessment {
    pub fn days(&self) -> &Days {
        &self.day_count.days
    }

    pub fn amount_to_deduct(&self) -> &Days {
        &self.decision.deduct_from_balance
    }

    pub fn amount_unpaid(&self) -> &Days {
        &self.decision.unpaid_days
    }
}
