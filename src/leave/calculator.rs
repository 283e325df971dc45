use chrono::NaiveDate;

use super::error::LeaveError;
use super::types::{BalanceSnapshot, ExistingLeaveRange, LeaveAssessment, LeaveRequest};
use super::{balance, date_range, day_count, overlap};

/// Run a request through range validation, day counting, balance
/// reconciliation and overlap checking, stopping at the first failure.
pub fn assess(
    request: &LeaveRequest,
    today: NaiveDate,
    snapshot: &BalanceSnapshot,
    existing: &[ExistingLeaveRange],
) -> Result<LeaveAssessment, LeaveError> {
    date_range::validate(request.start_date, request.end_date, today)?;

    let day_count = day_count::compute(
        request.start_date,
        request.end_date,
        request.day_type,
        request.start_half_session,
        request.end_half_session,
    )?;

    let decision = balance::reconcile(request.leave_type, &day_count.days, snapshot).into_result()?;

    if overlap::has_overlap(request.start_date, request.end_date, existing) {
        return Err(LeaveError::OverlappingRequest);
    }

    Ok(LeaveAssessment {
        day_count,
        decision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::days::Days;
    use crate::leave::types::{BalanceSource, DayType, HalfSession, LeaveStatus, LeaveType};
    use pretty_assertions::assert_eq;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn request(start: u32, end: u32, leave_type: LeaveType) -> LeaveRequest {
        LeaveRequest {
            start_date: jan(start),
            end_date: jan(end),
            day_type: DayType::Full,
            start_half_session: None,
            end_half_session: None,
            leave_type,
            reason: "Family trip to the coast".to_string(),
        }
    }

    fn snapshot(remaining: i64) -> BalanceSnapshot {
        BalanceSnapshot::new(Days::whole(remaining), Days::zero())
    }

    #[test]
    fn successful_annual_request_yields_deduction() {
        let assessment = assess(&request(1, 5, LeaveType::Annual), jan(1), &snapshot(10), &[])
            .unwrap();
        assert_eq!(assessment.days(), &Days::whole(5));
        assert_eq!(assessment.amount_to_deduct(), &Days::whole(5));
        assert!(assessment.amount_unpaid().is_zero());
        assert_eq!(assessment.decision.balance_source, BalanceSource::Annual);
    }

    #[test]
    fn half_day_request_flows_through() {
        let mut req = request(1, 3, LeaveType::Personal);
        req.day_type = DayType::Half;
        req.start_half_session = Some(HalfSession::Afternoon);

        let assessment = assess(&req, jan(1), &snapshot(2), &[]).unwrap();
        assert_eq!(assessment.days(), &"2.5".parse::<Days>().unwrap());
        assert_eq!(assessment.amount_to_deduct(), &Days::whole(2));
        assert_eq!(assessment.amount_unpaid(), &Days::half());
    }

    #[test]
    fn date_errors_come_before_balance_errors() {
        let err = assess(&request(1, 5, LeaveType::Annual), jan(2), &snapshot(0), &[])
            .unwrap_err();
        assert!(matches!(err, LeaveError::PastDate { .. }));
    }

    #[test]
    fn balance_errors_come_before_overlap() {
        let existing = [ExistingLeaveRange {
            start_date: jan(2),
            end_date: jan(2),
            status: LeaveStatus::Approved,
        }];
        let err = assess(&request(1, 5, LeaveType::Annual), jan(1), &snapshot(1), &existing)
            .unwrap_err();
        assert!(matches!(err, LeaveError::InsufficientBalance { .. }));
    }

    #[test]
    fn overlap_is_reported_last() {
        let existing = [ExistingLeaveRange {
            start_date: jan(5),
            end_date: jan(9),
            status: LeaveStatus::Pending,
        }];
        let err = assess(&request(1, 5, LeaveType::Sick), jan(1), &snapshot(0), &existing)
            .unwrap_err();
        assert_eq!(err, LeaveError::OverlappingRequest);
    }

    #[test]
    fn weekend_only_request_is_empty() {
        let err = assess(&request(6, 7, LeaveType::Annual), jan(1), &snapshot(10), &[])
            .unwrap_err();
        assert_eq!(err, LeaveError::EmptyRange { half_day: false });
    }
}
