use chrono::NaiveDate;

use super::error::LeaveError;

/// Longest inclusive span, in calendar days, one application may cover.
/// Comfortably above the maternity cap once weekends are added back.
pub const MAX_RANGE_DAYS: i64 = 366;

/// Reject reversed ranges, ranges starting before `today` and ranges longer
/// than [`MAX_RANGE_DAYS`].
pub fn validate(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<(), LeaveError> {
    if start > end {
        return Err(LeaveError::InvalidRange { start, end });
    }

    if start < today {
        return Err(LeaveError::PastDate { start, today });
    }

    if (end - start).num_days() + 1 > MAX_RANGE_DAYS {
        return Err(LeaveError::RangeTooLong {
            start,
            end,
            max: MAX_RANGE_DAYS,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_same_day_start() {
        let today = date(2024, 1, 1);
        assert_eq!(validate(today, today, today), Ok(()));
    }

    #[test]
    fn rejects_reversed_range() {
        let today = date(2024, 1, 1);
        let err = validate(date(2024, 1, 5), date(2024, 1, 3), today).unwrap_err();
        assert_eq!(
            err,
            LeaveError::InvalidRange {
                start: date(2024, 1, 5),
                end: date(2024, 1, 3)
            }
        );
    }

    #[test]
    fn rejects_past_start() {
        let today = date(2024, 1, 10);
        let err = validate(date(2024, 1, 9), date(2024, 1, 12), today).unwrap_err();
        assert!(matches!(err, LeaveError::PastDate { .. }));
    }

    #[test]
    fn accepts_range_of_exactly_the_maximum_length() {
        let today = date(2024, 1, 1);
        let end = today + chrono::Duration::days(MAX_RANGE_DAYS - 1);
        assert_eq!(validate(today, end, today), Ok(()));
    }

    #[test]
    fn rejects_range_longer_than_the_maximum() {
        let today = date(2024, 1, 1);
        let end = today + chrono::Duration::days(MAX_RANGE_DAYS);
        let err = validate(today, end, today).unwrap_err();
        assert_eq!(
            err,
            LeaveError::RangeTooLong {
                start: today,
                end,
                max: MAX_RANGE_DAYS
            }
        );
        assert_eq!(err.field(), "end_date");
    }

    #[test]
    fn reversed_range_is_reported_before_past_date() {
        let today = date(2024, 1, 10);
        let err = validate(date(2024, 1, 2), date(2024, 1, 1), today).unwrap_err();
        assert!(matches!(err, LeaveError::InvalidRange { .. }));
    }
}
