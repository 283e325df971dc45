use super::days::Days;
use super::error::LeaveError;
use super::types::{BalanceDecision, BalanceSnapshot, BalanceSource, LeaveType};

/// Statutory ceiling for maternity leave, roughly six months.
pub const MATERNITY_CAP_DAYS: i64 = 6 * 30;
/// Statutory ceiling for paternity leave, roughly two months.
pub const PATERNITY_CAP_DAYS: i64 = 2 * 30;

/// Decide how much of `requested` comes out of which balance.
///
/// The snapshot is never modified; the caller applies the returned decision.
pub fn reconcile(
    leave_type: LeaveType,
    requested: &Days,
    snapshot: &BalanceSnapshot,
) -> BalanceDecision {
    let remaining = &snapshot.remaining_balance;

    match leave_type {
        LeaveType::Annual => {
            if requested > remaining {
                BalanceDecision::rejected(
                    BalanceSource::Annual,
                    LeaveError::InsufficientBalance {
                        remaining: remaining.clone(),
                        requested: requested.clone(),
                    },
                )
            } else {
                BalanceDecision::deduct(BalanceSource::Annual, requested.clone(), Days::zero())
            }
        }
        LeaveType::Personal | LeaveType::Emergency => {
            let deduct = requested.clone().min(remaining.clone());
            let unpaid = requested - &deduct;
            BalanceDecision::deduct(BalanceSource::Annual, deduct, unpaid)
        }
        LeaveType::Maternity => capped(leave_type, requested, MATERNITY_CAP_DAYS),
        LeaveType::Paternity => capped(leave_type, requested, PATERNITY_CAP_DAYS),
        LeaveType::Compensatory => {
            let comp_off = &snapshot.comp_off_balance;
            if requested > comp_off {
                BalanceDecision::rejected(
                    BalanceSource::CompOff,
                    LeaveError::InsufficientCompOffBalance {
                        remaining: comp_off.clone(),
                        requested: requested.clone(),
                    },
                )
            } else {
                BalanceDecision::deduct(BalanceSource::CompOff, requested.clone(), Days::zero())
            }
        }
        LeaveType::Sick | LeaveType::Wfh => BalanceDecision::exempt(requested.clone()),
    }
}

fn capped(leave_type: LeaveType, requested: &Days, cap: i64) -> BalanceDecision {
    let cap = Days::whole(cap);
    if *requested > cap {
        return BalanceDecision::rejected(
            BalanceSource::None,
            LeaveError::ExceedsStatutoryCap {
                leave_type,
                cap,
                requested: requested.clone(),
            },
        );
    }
    BalanceDecision::exempt(requested.clone())
}
