//! Deduction and reversal of approved leave against tranches.
//!
//! Deduction consumes tranches **most-recently-granted first** ("LIFO").
//! Policy note for stakeholders: oldest-first consumption is the more common
//! approach because it avoids forfeiting soon-to-expire days, and the test
//! suite pins the current ordering so a change of policy is a conscious
//! decision rather than an accident. Within equal grant dates the ordering
//! is stable by insertion order.
//!
//! A deduction is all-or-nothing: if the open tranches cannot cover the full
//! request, no tranche is debited and the caller receives the shortfall.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::LeavePolicy;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{GrantTranche, ReversalEvent, TrancheDebit, UsageEvent, is_half_day_multiple};

use super::store::EmployeeLedger;

/// Checks that a usage amount is positive and on the half-day grid.
///
/// # Errors
///
/// Returns `InvalidAmount` for zero, negative, or sub-half-day amounts.
/// Called before any tranche is touched.
pub fn validate_usage_amount(amount: Decimal) -> LedgerResult<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount {
            amount,
            message: "must be positive".to_string(),
        });
    }
    if !is_half_day_multiple(amount) {
        return Err(LedgerError::InvalidAmount {
            amount,
            message: "must be a multiple of 0.5 days".to_string(),
        });
    }
    Ok(())
}

/// Candidate tranche indices in deduction order: grant date descending,
/// insertion order within equal grant dates.
fn deduction_order(tranches: &[GrantTranche], as_of: NaiveDate) -> Vec<usize> {
    let mut order: Vec<usize> = tranches
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_open(as_of))
        .map(|(i, _)| i)
        .collect();
    // Stable sort: ties keep insertion order.
    order.sort_by(|a, b| tranches[*b].grant_date.cmp(&tranches[*a].grant_date));
    order
}

/// Applies an approved leave request against the employee's open tranches.
///
/// Walks the tranches most-recently-granted first, taking
/// `min(remaining, still_needed)` from each until the request is satisfied.
/// The returned [`UsageEvent`] carries the full attribution list and has
/// already been recorded on the ledger.
///
/// # Errors
///
/// - `InvalidAmount` if the amount fails [`validate_usage_amount`].
/// - `InsufficientBalance` (with the shortfall) if the open tranches cannot
///   cover the request; in that case no tranche is modified.
pub fn deduct(
    ledger: &mut EmployeeLedger,
    use_date: NaiveDate,
    amount: Decimal,
) -> LedgerResult<UsageEvent> {
    validate_usage_amount(amount)?;

    let order = deduction_order(ledger.tranches(), use_date);
    let available: Decimal = order
        .iter()
        .map(|&i| ledger.tranches()[i].remaining_amount)
        .sum();
    if available < amount {
        return Err(LedgerError::InsufficientBalance {
            requested: amount,
            available,
            shortfall: amount - available,
        });
    }

    let mut still_needed = amount;
    let mut debits = Vec::new();
    for index in order {
        if still_needed.is_zero() {
            break;
        }
        let tranche = &mut ledger.tranches_mut()[index];
        let take = tranche.remaining_amount.min(still_needed);
        tranche.remaining_amount -= take;
        still_needed -= take;
        debits.push(TrancheDebit {
            tranche_id: tranche.id,
            amount: take,
        });
        debug!(
            tranche_id = %tranche.id,
            fiscal_year = tranche.fiscal_year,
            taken = %take,
            "debited tranche"
        );
    }

    let event = UsageEvent {
        id: Uuid::new_v4(),
        employee_id: ledger.employee().id.clone(),
        use_date,
        amount_requested: amount,
        debits,
    };
    info!(
        employee_id = %event.employee_id,
        event_id = %event.id,
        amount = %amount,
        %use_date,
        "recorded approved leave"
    );
    ledger.record_usage(event.clone());
    Ok(event)
}

/// Books a compensating reversal for a previously recorded usage event.
///
/// Each attributed amount is credited back to its tranche if the tranche's
/// validity window is still open as of `as_of`. Amounts whose tranche has
/// lapsed (or no longer exists) are forfeited into a zero-duration
/// adjustment tranche that expires immediately, so reversed days never
/// reappear past their legal window.
///
/// # Errors
///
/// - `UsageEventNotFound` if the event is not on this ledger.
/// - `UsageEventAlreadyReversed` if a compensating reversal already exists.
pub fn reverse(
    ledger: &mut EmployeeLedger,
    event_id: Uuid,
    as_of: NaiveDate,
    policy: &LeavePolicy,
) -> LedgerResult<ReversalEvent> {
    let event = ledger
        .usage_events()
        .iter()
        .find(|e| e.id == event_id)
        .cloned()
        .ok_or(LedgerError::UsageEventNotFound { event_id })?;
    if ledger.is_reversed(event_id) {
        return Err(LedgerError::UsageEventAlreadyReversed { event_id });
    }

    let mut credited = Vec::new();
    let mut forfeited = Vec::new();
    for debit in &event.debits {
        let open_index = ledger
            .tranches()
            .iter()
            .position(|t| t.id == debit.tranche_id && !t.has_lapsed(as_of));
        match open_index {
            Some(index) => {
                ledger.tranches_mut()[index].remaining_amount += debit.amount;
                credited.push(debit.clone());
            }
            None => forfeited.push(debit.clone()),
        }
    }

    let forfeit_total: Decimal = forfeited.iter().map(|d| d.amount).sum();
    if forfeit_total > Decimal::ZERO {
        let mut adjustment = GrantTranche::new(
            policy.fiscal_year_of(as_of),
            as_of,
            as_of,
            forfeit_total,
        );
        adjustment.remaining_amount = Decimal::ZERO;
        adjustment.expired_amount = forfeit_total;
        ledger.add_tranche(adjustment)?;
    }

    let reversal = ReversalEvent {
        id: Uuid::new_v4(),
        original_event_id: event_id,
        employee_id: ledger.employee().id.clone(),
        reversal_date: as_of,
        credited,
        forfeited,
    };
    info!(
        employee_id = %reversal.employee_id,
        event_id = %event_id,
        forfeited = %forfeit_total,
        "reversed leave"
    );
    ledger.record_reversal(reversal.clone());
    Ok(reversal)
}
