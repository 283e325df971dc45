use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use crate::leave::{BalanceSnapshot, Days};

string_enum! {
    #[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "snake_case")]
    pub enum UserRole {
        Admin => "admin",
        Hr => "hr",
        Manager => "manager",
        Employee => "employee",
    }
}

impl UserRole {
    /// Roles allowed to see and decide everyone's leave.
    pub fn is_leave_manager(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Hr | UserRole::Manager)
    }

    /// Roles allowed to change balances directly.
    pub fn can_adjust_balances(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Hr)
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Employee
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub leave_balance: Days,
    pub comp_off_balance: Days,
    #[serde(skip)]
    pub balance_version: i64,
    pub leave_approver_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn balance_snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot::new(self.leave_balance.clone(), self.comp_off_balance.clone())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Option<UserRole>,
    pub leave_balance: Option<Days>,
    pub comp_off_balance: Option<Days>,
    pub leave_approver_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
}
