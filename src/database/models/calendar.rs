use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::leave::day_count::is_business_day;
use crate::leave::{DayType, Days, LeaveType};

/// Widest window the calendar will render in one request.
pub const MAX_CALENDAR_DAYS: i64 = 92;

/// Query string of `GET /leave/calendar`. Missing dates default to the
/// current month.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub name: Option<String>,
    pub absent_only: Option<bool>,
}

impl CalendarQuery {
    pub fn window(&self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
        let month_start = today.with_day(1).unwrap_or(today);
        let start = self.start.unwrap_or(month_start);
        let end = match self.end {
            Some(end) => end,
            None => (start.with_day(1).unwrap_or(start) + Months::new(1))
                .pred_opt()
                .unwrap_or(start),
        };

        if start > end {
            return Err(AppError::BadRequest(format!(
                "Calendar start ({}) must not be after its end ({}).",
                start, end
            )));
        }
        if (end - start).num_days() + 1 > MAX_CALENDAR_DAYS {
            return Err(AppError::BadRequest(format!(
                "The calendar can show at most {} days at a time.",
                MAX_CALENDAR_DAYS
            )));
        }

        Ok((start, end))
    }

    pub fn name_filter(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|name| !name.is_empty())
    }
}

/// An approved application as the calendar needs it.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CalendarLeave {
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub day_type: DayType,
    pub leave_days: Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarDayStatus {
    Leave,
    Weekend,
    Future,
    Working,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: CalendarDayStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leave_type: Option<LeaveType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_type: Option<DayType>,
}

/// One employee's line on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarRow {
    pub user_id: Uuid,
    pub name: String,
    pub has_absence: bool,
    pub days: Vec<CalendarDay>,
}

impl CalendarRow {
    /// Lay out `[start, end]` for one user. Leave wins over weekends; dates
    /// after `today` that are not on leave are `future`.
    pub fn build(
        user_id: Uuid,
        name: String,
        leaves: &[&CalendarLeave],
        start: NaiveDate,
        end: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let days: Vec<CalendarDay> = start
            .iter_days()
            .take_while(|date| *date <= end)
            .map(|date| {
                let on_leave = leaves
                    .iter()
                    .find(|leave| leave.start_date <= date && date <= leave.end_date);

                let status = match on_leave {
                    Some(_) => CalendarDayStatus::Leave,
                    None if !is_business_day(date) => CalendarDayStatus::Weekend,
                    None if date > today => CalendarDayStatus::Future,
                    None => CalendarDayStatus::Working,
                };

                CalendarDay {
                    date,
                    status,
                    leave_type: on_leave.map(|leave| leave.leave_type),
                    day_type: on_leave.map(|leave| leave.day_type),
                }
            })
            .collect();

        Self {
            user_id,
            name,
            has_absence: days
                .iter()
                .any(|day| day.status == CalendarDayStatus::Leave),
            days,
        }
    }
}
