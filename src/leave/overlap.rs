use chrono::NaiveDate;

use super::types::ExistingLeaveRange;

/// Inclusive overlap of `[a_start, a_end]` and `[b_start, b_end]`.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && a_end >= b_start
}

/// Does `[new_start, new_end]` share a day with any pending or approved range?
pub fn has_overlap(new_start: NaiveDate, new_end: NaiveDate, existing: &[ExistingLeaveRange]) -> bool {
    existing
        .iter()
        .filter(|range| range.status.blocks_dates())
        .any(|range| ranges_overlap(new_start, new_end, range.start_date, range.end_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leave::types::LeaveStatus;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn range(start: u32, end: u32, status: LeaveStatus) -> ExistingLeaveRange {
        ExistingLeaveRange {
            start_date: jan(start),
            end_date: jan(end),
            status,
        }
    }

    #[test]
    fn touching_boundary_counts_as_overlap() {
        let existing = [range(5, 8, LeaveStatus::Approved)];
        assert!(has_overlap(jan(1), jan(5), &existing));
        assert!(has_overlap(jan(8), jan(10), &existing));
        assert!(!has_overlap(jan(1), jan(4), &existing));
        assert!(!has_overlap(jan(9), jan(12), &existing));
    }

    #[test]
    fn containment_in_either_direction_overlaps() {
        let existing = [range(3, 10, LeaveStatus::Pending)];
        assert!(has_overlap(jan(4), jan(6), &existing));
        assert!(has_overlap(jan(1), jan(20), &existing));
    }

    #[test]
    fn rejected_and_cancelled_ranges_are_ignored() {
        let existing = [
            range(1, 10, LeaveStatus::Rejected),
            range(1, 10, LeaveStatus::Cancelled),
        ];
        assert!(!has_overlap(jan(2), jan(3), &existing));
    }

    #[test]
    fn overlap_is_symmetric() {
        let pairs = [(1, 5, 5, 9), (1, 3, 4, 6), (2, 8, 4, 5), (10, 12, 1, 9)];
        for (a_start, a_end, b_start, b_end) in pairs {
            let forward = has_overlap(
                jan(a_start),
                jan(a_end),
                &[range(b_start, b_end, LeaveStatus::Pending)],
            );
            let backward = has_overlap(
                jan(b_start),
                jan(b_end),
                &[range(a_start, a_end, LeaveStatus::Pending)],
            );
            assert_eq!(forward, backward, "{a_start}-{a_end} vs {b_start}-{b_end}");
        }
    }

    #[test]
    fn empty_history_never_overlaps() {
        assert!(!has_overlap(jan(1), jan(31), &[]));
    }
}
