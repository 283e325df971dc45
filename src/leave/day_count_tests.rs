use chrono::NaiveDate;
use pretty_assertions::assert_eq;

use super::day_count::{business_days, compute};
use super::days::Days;
use super::error::LeaveError;
use super::types::{DayType, HalfSession};

// 2024-01-01 is a Monday.
fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn days(value: &str) -> Days {
    value.parse().unwrap()
}

#[test]
fn full_week_counts_five_days() {
    let result = compute(jan(1), jan(5), DayType::Full, None, None).unwrap();
    assert_eq!(result.days, days("5"));
    assert!(!result.is_half_day);
}

#[test]
fn weekend_inside_range_is_skipped() {
    let result = compute(jan(1), jan(8), DayType::Full, None, None).unwrap();
    assert_eq!(result.days, days("6"));
}

#[test]
fn full_day_count_matches_weekday_count_for_every_range_in_january() {
    for start in 1..=31 {
        for end in start..=31 {
            let expected = (start..=end)
                .map(jan)
                .filter(|d| super::day_count::is_business_day(*d))
                .count() as i64;
            match compute(jan(start), jan(end), DayType::Full, None, None) {
                Ok(result) => assert_eq!(result.days, Days::whole(expected)),
                Err(err) => {
                    assert_eq!(expected, 0);
                    assert_eq!(err, LeaveError::EmptyRange { half_day: false });
                }
            }
        }
    }
}

#[test]
fn weekend_only_full_range_is_empty() {
    let err = compute(jan(6), jan(7), DayType::Full, None, None).unwrap_err();
    assert_eq!(err, LeaveError::EmptyRange { half_day: false });
    assert_eq!(err.field(), "start_date");
}

#[test]
fn full_day_ignores_session_markers() {
    let result = compute(
        jan(1),
        jan(3),
        DayType::Full,
        Some(HalfSession::Afternoon),
        Some(HalfSession::Morning),
    )
    .unwrap();
    assert_eq!(result.days, days("3"));
}

#[test]
fn single_half_day_is_always_half() {
    for session in [HalfSession::Morning, HalfSession::Afternoon] {
        let result = compute(jan(2), jan(2), DayType::Half, Some(session), None).unwrap();
        assert_eq!(result.days, days("0.5"));
        assert!(result.is_half_day);

        let repeated = compute(jan(2), jan(2), DayType::Half, Some(session), Some(session));
        assert_eq!(repeated.unwrap().days, days("0.5"));
    }
}

#[test]
fn single_half_day_with_both_sessions_is_ambiguous() {
    let err = compute(
        jan(2),
        jan(2),
        DayType::Half,
        Some(HalfSession::Morning),
        Some(HalfSession::Afternoon),
    )
    .unwrap_err();
    assert_eq!(err, LeaveError::AmbiguousSession);
}

#[test]
fn half_day_requires_start_session() {
    assert_eq!(
        compute(jan(2), jan(2), DayType::Half, None, None).unwrap_err(),
        LeaveError::MissingSession
    );
    assert_eq!(
        compute(jan(2), jan(4), DayType::Half, None, Some(HalfSession::Morning)).unwrap_err(),
        LeaveError::MissingSession
    );
}

#[test]
fn single_half_day_on_weekend_is_misplaced() {
    let err = compute(jan(6), jan(6), DayType::Half, Some(HalfSession::Morning), None)
        .unwrap_err();
    assert_eq!(err, LeaveError::InvalidSessionPlacement { date: jan(6) });
}

#[test]
fn afternoon_start_without_end_session() {
    let result = compute(jan(1), jan(3), DayType::Half, Some(HalfSession::Afternoon), None)
        .unwrap();
    assert_eq!(result.days, days("2.5"));
}

#[test]
fn afternoon_start_and_morning_end_give_back_a_day() {
    let result = compute(
        jan(1),
        jan(3),
        DayType::Half,
        Some(HalfSession::Afternoon),
        Some(HalfSession::Morning),
    )
    .unwrap();
    assert_eq!(result.days, days("2"));
}

#[test]
fn morning_start_and_afternoon_end_take_every_day() {
    let result = compute(
        jan(1),
        jan(3),
        DayType::Half,
        Some(HalfSession::Morning),
        Some(HalfSession::Afternoon),
    )
    .unwrap();
    assert_eq!(result.days, days("3"));
}

#[test]
fn friday_afternoon_to_monday_morning_spans_the_weekend() {
    let result = compute(
        jan(5),
        jan(8),
        DayType::Half,
        Some(HalfSession::Afternoon),
        Some(HalfSession::Morning),
    )
    .unwrap();
    assert_eq!(result.days, days("1"));
}

#[test]
fn session_marker_on_weekend_endpoint_is_rejected() {
    let err = compute(jan(6), jan(9), DayType::Half, Some(HalfSession::Afternoon), None)
        .unwrap_err();
    assert_eq!(err, LeaveError::InvalidSessionPlacement { date: jan(6) });

    let err = compute(
        jan(1),
        jan(7),
        DayType::Half,
        Some(HalfSession::Afternoon),
        Some(HalfSession::Morning),
    )
    .unwrap_err();
    assert_eq!(err, LeaveError::InvalidSessionPlacement { date: jan(7) });
}

#[test]
fn weekend_end_without_marker_counts_business_days() {
    let result = compute(jan(1), jan(7), DayType::Half, Some(HalfSession::Afternoon), None)
        .unwrap();
    assert_eq!(result.days, days("4.5"));
}

#[test]
fn compute_is_idempotent() {
    let first = compute(jan(1), jan(10), DayType::Half, Some(HalfSession::Afternoon), None);
    let second = compute(jan(1), jan(10), DayType::Half, Some(HalfSession::Afternoon), None);
    assert_eq!(first, second);
}

#[test]
fn business_days_of_reversed_range_is_zero() {
    assert_eq!(business_days(jan(5), jan(1)), 0);
}

#[test]
fn business_days_matches_a_day_by_day_walk() {
    let origin = jan(1);
    for start_offset in 0..7 {
        let start = origin + chrono::Duration::days(start_offset);
        for length in 0..60 {
            let end = start + chrono::Duration::days(length);
            let walked = start
                .iter_days()
                .take_while(|d| *d <= end)
                .filter(|d| super::day_count::is_business_day(*d))
                .count() as i64;
            assert_eq!(business_days(start, end), walked, "{start} to {end}");
        }
    }
}

#[test]
fn business_days_of_a_far_future_range_is_computed_directly() {
    // 52 whole weeks starting on a Monday.
    assert_eq!(business_days(jan(1), NaiveDate::from_ymd_opt(2024, 12, 29).unwrap()), 260);

    let far = NaiveDate::from_ymd_opt(200_000, 1, 1).unwrap();
    let count = business_days(jan(1), far);
    let span = (far - jan(1)).num_days() + 1;
    assert!(count > span / 7 * 5 - 1 && count <= span / 7 * 5 + 5);
}
