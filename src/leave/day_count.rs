use chrono::{Datelike, NaiveDate, Weekday};

use super::days::Days;
use super::error::LeaveError;
use super::types::{DayCountResult, DayType, HalfSession};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of Mon-Fri days in `[start, end]`, zero for a reversed range.
///
/// Whole weeks contribute five days each; only the trailing partial week
/// is walked.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> i64 {
    if start > end {
        return 0;
    }

    let span = (end - start).num_days() + 1;
    let whole_weeks = span / 7;
    let offset = i64::from(start.weekday().num_days_from_monday());

    let tail = (0..span % 7)
        .filter(|day| (offset + day) % 7 < 5)
        .count() as i64;

    whole_weeks * 5 + tail
}

/// Convert a date range and optional half-day markers into a day count.
///
/// Full days count business days only. A half day on a single date is always
/// half a day. Over several dates, an afternoon start gives back the first
/// morning and a morning end gives back the last afternoon. Markers may only
/// sit on business days, and the result must be positive.
pub fn compute(
    start: NaiveDate,
    end: NaiveDate,
    day_type: DayType,
    start_session: Option<HalfSession>,
    end_session: Option<HalfSession>,
) -> Result<DayCountResult, LeaveError> {
    let days = match day_type {
        DayType::Full => Days::whole(business_days(start, end)),
        DayType::Half if start == end => single_half_day(start, start_session, end_session)?,
        DayType::Half => multi_day_half(start, end, start_session, end_session)?,
    };

    if !days.is_positive() {
        return Err(LeaveError::EmptyRange {
            half_day: day_type == DayType::Half,
        });
    }

    Ok(DayCountResult {
        days,
        is_half_day: day_type == DayType::Half,
    })
}

fn single_half_day(
    date: NaiveDate,
    start_session: Option<HalfSession>,
    end_session: Option<HalfSession>,
) -> Result<Days, LeaveError> {
    let session = start_session.ok_or(LeaveError::MissingSession)?;

    if end_session.is_some_and(|end| end != session) {
        return Err(LeaveError::AmbiguousSession);
    }

    if !is_business_day(date) {
        return Err(LeaveError::InvalidSessionPlacement { date });
    }

    Ok(Days::half())
}

fn multi_day_half(
    start: NaiveDate,
    end: NaiveDate,
    start_session: Option<HalfSession>,
    end_session: Option<HalfSession>,
) -> Result<Days, LeaveError> {
    let start_session = start_session.ok_or(LeaveError::MissingSession)?;

    if !is_business_day(start) {
        return Err(LeaveError::InvalidSessionPlacement { date: start });
    }
    if end_session.is_some() && !is_business_day(end) {
        return Err(LeaveError::InvalidSessionPlacement { date: end });
    }

    let mut days = Days::whole(business_days(start, end));
    if start_session == HalfSession::Afternoon {
        days = days - Days::half();
    }
    if end_session == Some(HalfSession::Morning) {
        days = days - Days::half();
    }

    Ok(days)
}
