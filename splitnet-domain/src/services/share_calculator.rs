//! Per-expense share computation.
//!
//! Every amount is an integer number of minor units. Indivisible remainders are
//! assigned deterministically so that repeated runs over the same expense give
//! identical output.

use std::cmp::Reverse;

use fxhash::FxHashSet;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::{
    error::ValidationError,
    model::{Expense, MemberBalances, MemberId, Money, SplitRule},
};

const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;
/// Allowed drift of a percentage split, in minor units of the expense total.
const PERCENTAGE_TOLERANCE_UNITS: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
/// Fallback when the total is zero and the minor-unit tolerance says nothing.
const PERCENTAGE_POINT_EPSILON: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Computes who owes what for a single expense.
pub struct ShareCalculator;

impl ShareCalculator {
    /// Returns the "paid minus owed" delta of every member touched by `expense`.
    ///
    /// The payer is always present; the deltas sum to zero.
    pub fn compute_shares(&self, expense: &Expense) -> Result<MemberBalances, ValidationError> {
        let shares = self.split_amounts(expense)?;

        let mut deltas = MemberBalances::new();
        deltas.insert(expense.payer, expense.total);
        for (member, share) in shares {
            *deltas.entry(member).or_insert(Money::ZERO) -= share;
        }

        tracing::debug!(
            expense_id = %expense.id,
            payer = %expense.payer,
            total = %expense.total,
            participant_count = expense.participants.len(),
            "Computed expense shares"
        );

        Ok(deltas)
    }

    /// Returns the amount each participant owes, in ascending member-id order.
    pub fn split_amounts(&self, expense: &Expense) -> Result<Vec<(MemberId, Money)>, ValidationError> {
        validate_participants(&expense.participants)?;
        if expense.total.is_negative() {
            return Err(ValidationError::NegativeTotal {
                total: expense.total,
            });
        }

        let mut shares = match &expense.rule {
            SplitRule::Equal => split_equal(expense.total, &expense.participants),
            SplitRule::Exact(amounts) => split_exact(expense.total, &expense.participants, amounts)?,
            SplitRule::Percentage(percentages) => {
                split_percentage(expense.total, &expense.participants, percentages)?
            }
        };
        shares.sort_unstable_by_key(|(member, _)| *member);

        debug_assert_eq!(
            shares.iter().map(|(_, share)| *share).sum::<Money>(),
            expense.total
        );
        Ok(shares)
    }
}

fn validate_participants(participants: &[MemberId]) -> Result<(), ValidationError> {
    if participants.is_empty() {
        return Err(ValidationError::EmptyParticipants);
    }

    let mut seen = FxHashSet::default();
    for &member in participants {
        if !seen.insert(member) {
            return Err(ValidationError::DuplicateParticipant { member });
        }
    }
    Ok(())
}

fn check_entry_count(participants: &[MemberId], found: usize) -> Result<(), ValidationError> {
    if participants.len() != found {
        return Err(ValidationError::ShareCountMismatch {
            expected: participants.len(),
            found,
        });
    }
    Ok(())
}

fn split_equal(total: Money, participants: &[MemberId]) -> Vec<(MemberId, Money)> {
    let mut ordered = participants.to_vec();
    ordered.sort_unstable();

    let count = ordered.len() as i64;
    let base = total.amount() / count;
    let remainder = (total.amount() % count) as usize;

    ordered
        .into_iter()
        .enumerate()
        .map(|(idx, member)| {
            let share = if idx < remainder { base + 1 } else { base };
            (member, Money::from_i64(share))
        })
        .collect()
}

fn split_exact(
    total: Money,
    participants: &[MemberId],
    amounts: &[Money],
) -> Result<Vec<(MemberId, Money)>, ValidationError> {
    check_entry_count(participants, amounts.len())?;

    let mut sum = 0_i64;
    for (&member, &amount) in participants.iter().zip(amounts) {
        if amount.is_negative() {
            return Err(ValidationError::NegativeShare { member, amount });
        }
        sum = sum
            .checked_add(amount.amount())
            .ok_or(ValidationError::AmountOutOfRange)?;
    }

    let found = Money::from_i64(sum);
    if found != total {
        return Err(ValidationError::ExactSharesMismatch {
            expected: total,
            found,
        });
    }

    Ok(participants.iter().copied().zip(amounts.iter().copied()).collect())
}

fn split_percentage(
    total: Money,
    participants: &[MemberId],
    percentages: &[Decimal],
) -> Result<Vec<(MemberId, Money)>, ValidationError> {
    check_entry_count(participants, percentages.len())?;

    let mut total_percentage = Decimal::ZERO;
    for (&member, &percentage) in participants.iter().zip(percentages) {
        if percentage.is_sign_negative() && !percentage.is_zero() {
            return Err(ValidationError::NegativePercentage { member, percentage });
        }
        total_percentage = total_percentage
            .checked_add(percentage)
            .ok_or(ValidationError::AmountOutOfRange)?;
    }

    let total_units = total.as_decimal();
    let percentage_drift = (total_percentage - ONE_HUNDRED).abs();
    let within_tolerance = if total.is_zero() {
        percentage_drift <= PERCENTAGE_POINT_EPSILON
    } else {
        let unit_drift = total_units
            .checked_mul(percentage_drift)
            .ok_or(ValidationError::AmountOutOfRange)?
            / ONE_HUNDRED;
        unit_drift <= PERCENTAGE_TOLERANCE_UNITS
    };
    if !within_tolerance {
        return Err(ValidationError::PercentageSumMismatch { total_percentage });
    }

    // (member, rounded share, exact - rounded)
    let mut entries: Vec<(MemberId, i64, Decimal)> = Vec::with_capacity(participants.len());
    for (&member, &percentage) in participants.iter().zip(percentages) {
        let exact = total_units
            .checked_mul(percentage)
            .ok_or(ValidationError::AmountOutOfRange)?
            / ONE_HUNDRED;
        let rounded = exact.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
        let share = rounded.to_i64().ok_or(ValidationError::AmountOutOfRange)?;
        entries.push((member, share, exact - rounded));
    }

    let allocated = entries
        .iter()
        .try_fold(0_i64, |acc, (_, share, _)| acc.checked_add(*share))
        .ok_or(ValidationError::AmountOutOfRange)?;
    let mut discrepancy = total.amount() - allocated;

    if discrepancy != 0 {
        let mut ranked: Vec<usize> = (0..entries.len()).collect();
        if discrepancy > 0 {
            // Short: top up whoever was rounded down the most.
            ranked.sort_by_key(|&idx| (Reverse(entries[idx].2), entries[idx].0));
        } else {
            // Over: take back from whoever was rounded up the most.
            ranked.sort_by_key(|&idx| (entries[idx].2, entries[idx].0));
        }

        tracing::debug!(
            discrepancy,
            participant_count = entries.len(),
            "Correcting percentage rounding discrepancy"
        );

        while discrepancy != 0 {
            let mut progressed = false;
            for &idx in &ranked {
                if discrepancy == 0 {
                    break;
                }
                let share = &mut entries[idx].1;
                if discrepancy > 0 {
                    *share += 1;
                    discrepancy -= 1;
                    progressed = true;
                } else if *share > 0 {
                    *share -= 1;
                    discrepancy += 1;
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
    }

    Ok(entries
        .into_iter()
        .map(|(member, share, _)| (member, Money::from_i64(share)))
        .collect())
}
