use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::leave::{BalanceSource, Days};

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum BalanceType {
        Annual => "annual",
        CompOff => "comp_off",
    }
}

impl BalanceType {
    pub fn column(&self) -> &'static str {
        match self {
            BalanceType::Annual => "leave_balance",
            BalanceType::CompOff => "comp_off_balance",
        }
    }

    /// The balance an application's deduction was taken from, if any.
    pub fn for_source(source: BalanceSource) -> Option<Self> {
        match source {
            BalanceSource::Annual => Some(BalanceType::Annual),
            BalanceSource::CompOff => Some(BalanceType::CompOff),
            BalanceSource::None => None,
        }
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum BalanceChangeType {
        Accrual => "accrual",
        Usage => "usage",
        Refund => "refund",
        Adjustment => "adjustment",
        Credit => "credit",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveBalanceHistory {
    pub id: i64,
    pub user_id: Uuid,
    pub balance_type: BalanceType,
    pub change_type: BalanceChangeType,
    pub days_changed: Days,
    pub previous_balance: Days,
    pub new_balance: Days,
    pub description: Option<String>,
    pub related_application_id: Option<Uuid>,
    pub accrual_period: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A signed change to one balance, written together with its ledger row.
#[derive(Debug, Clone)]
pub struct BalanceChange {
    pub balance_type: BalanceType,
    pub change_type: BalanceChangeType,
    pub days_changed: Days,
    pub description: String,
    pub related_application_id: Option<Uuid>,
    pub accrual_period: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceAdjustmentInput {
    pub days_changed: Days,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompOffCreditInput {
    pub comp_off_days: Days,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccrualSummary {
    pub period: String,
    pub credited_users: usize,
    pub skipped_users: usize,
}

/// Per-status totals for one user's applications starting in one year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearTotals {
    pub used_days: Days,
    pub pending_days: Days,
    pub unpaid_days: Days,
    pub approved_applications: i64,
    pub pending_applications: i64,
    pub rejected_applications: i64,
    pub cancelled_applications: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveStatistics {
    pub year: i32,
    pub remaining_balance: Days,
    pub comp_off_balance: Days,
    #[serde(flatten)]
    pub totals: YearTotals,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsQuery {
    pub year: Option<i32>,
    pub user_id: Option<Uuid>,
}
