use std::{cmp::Reverse, collections::BinaryHeap};

use crate::{
    error::InvariantViolation,
    model::{MemberBalances, MemberId, Money, Settlement},
};

/// Greedy largest-creditor/largest-debtor netting.
///
/// Every step pairs the member owed the most with the member owing the most,
/// so each transfer fully clears at least one of them. For `n` members with a
/// nonzero balance at most `n - 1` settlements are produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NettingSolver {
    min_transfer: Money,
}

impl Default for NettingSolver {
    fn default() -> Self {
        Self {
            min_transfer: Money::from_i64(1),
        }
    }
}

impl NettingSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settlements smaller than `min_transfer` are left out of the result.
    pub fn with_min_transfer(min_transfer: Money) -> Self {
        Self { min_transfer }
    }

    pub fn min_transfer(&self) -> Money {
        self.min_transfer
    }

    /// Reduces `balances` to an ordered list of debtor-to-creditor transfers.
    ///
    /// Positive balance means the member is owed money. The balances must sum
    /// to zero.
    pub fn simplify(&self, balances: &MemberBalances) -> Result<Vec<Settlement>, InvariantViolation> {
        // Widened so that zero-summing extremes do not overflow on the way.
        let total: i128 = balances.values().map(|money| i128::from(money.amount())).sum();
        if total != 0 {
            tracing::error!(
                reject_reason = "input_imbalance",
                member_count = balances.len(),
                total = %total,
                "Netting rejected due to input imbalance"
            );
            return Err(i64::try_from(total)
                .map(|total| InvariantViolation::ImbalancedTotal(Money::from_i64(total)))
                .unwrap_or(InvariantViolation::TotalOutOfRange));
        }

        // Max-heaps on (remaining, Reverse(id)): largest amount first, lowest id on ties.
        let mut creditors: BinaryHeap<(Money, Reverse<MemberId>)> = BinaryHeap::new();
        let mut debtors: BinaryHeap<(Money, Reverse<MemberId>)> = BinaryHeap::new();
        for (&member, &balance) in balances {
            if balance.is_positive() {
                creditors.push((balance, Reverse(member)));
            } else if balance.is_negative() {
                let debt = balance.checked_abs().ok_or_else(|| {
                    tracing::error!(
                        reject_reason = "balance_out_of_range",
                        member = %member,
                        "Netting rejected due to unrepresentable balance"
                    );
                    InvariantViolation::BalanceOutOfRange { member }
                })?;
                debtors.push((debt, Reverse(member)));
            }
        }
        let nonzero_count = creditors.len() + debtors.len();

        let mut settlements = Vec::with_capacity(nonzero_count.saturating_sub(1));
        while let (Some((credit, Reverse(creditor))), Some((debt, Reverse(debtor)))) =
            (creditors.pop(), debtors.pop())
        {
            let amount = credit.min(debt);
            settlements.push(Settlement {
                from: debtor,
                to: creditor,
                amount,
            });

            let credit_left = credit - amount;
            let debt_left = debt - amount;
            if !credit_left.is_zero() {
                creditors.push((credit_left, Reverse(creditor)));
            }
            if !debt_left.is_zero() {
                debtors.push((debt_left, Reverse(debtor)));
            }
        }

        debug_assert!(creditors.is_empty() && debtors.is_empty());
        debug_assert!(settlements.len() <= nonzero_count.saturating_sub(1));

        let emitted = settlements.len();
        let mut dropped_total: i128 = 0;
        settlements.retain(|settlement| {
            let keep = settlement.amount >= self.min_transfer;
            if !keep {
                dropped_total += i128::from(settlement.amount.amount());
            }
            keep
        });

        if settlements.len() < emitted {
            tracing::warn!(
                dropped_count = emitted - settlements.len(),
                dropped_total = %dropped_total,
                min_transfer = %self.min_transfer,
                "Settlements below minimum transfer were left unsettled"
            );
        }

        tracing::debug!(
            member_count = balances.len(),
            nonzero_count,
            settlement_count = settlements.len(),
            "Netting completed"
        );

        Ok(settlements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::apply_settlements;
    use rstest::{fixture, rstest};

    #[fixture]
    fn solver() -> NettingSolver {
        NettingSolver::default()
    }

    fn balances(raw: &[(u64, i64)]) -> MemberBalances {
        raw.iter()
            .map(|&(id, amount)| (MemberId(id), Money::from_i64(amount)))
            .collect()
    }

    fn as_triples(settlements: &[Settlement]) -> Vec<(u64, u64, i64)> {
        settlements
            .iter()
            .map(|s| (s.from.0, s.to.0, s.amount.amount()))
            .collect()
    }

    #[rstest]
    #[case::single_creditor_equal_debtors(
        &[(1, 6000), (2, -3000), (3, -3000)],
        vec![(2, 1, 3000), (3, 1, 3000)]
    )]
    #[case::two_people(&[(1, 100), (2, -100)], vec![(2, 1, 100)])]
    #[case::chain_reduction(
        &[(1, 100), (2, 50), (3, -80), (4, -70)],
        vec![(3, 1, 80), (4, 2, 50), (4, 1, 20)]
    )]
    #[case::equal_creditors_lowest_id_first(
        &[(7, 50), (2, 50), (5, -100)],
        vec![(5, 2, 50), (5, 7, 50)]
    )]
    #[case::zero_members_ignored(
        &[(1, 0), (2, 25), (3, 0), (4, -25)],
        vec![(4, 2, 25)]
    )]
    #[case::all_zero(&[(1, 0), (2, 0)], vec![])]
    #[case::empty(&[], vec![])]
    fn simplify_cases(
        solver: NettingSolver,
        #[case] input: &[(u64, i64)],
        #[case] expected: Vec<(u64, u64, i64)>,
    ) {
        let settlements = solver.simplify(&balances(input)).expect("balanced input");

        assert_eq!(as_triples(&settlements), expected);
    }

    #[rstest]
    fn chain_reduction_zeroes_every_balance(solver: NettingSolver) {
        let input = balances(&[(1, 100), (2, 50), (3, -80), (4, -70)]);

        let settlements = solver.simplify(&input).expect("balanced input");

        assert!(settlements.len() <= 3);
        assert!(apply_settlements(&input, &settlements).values().all(|m| m.is_zero()));
    }

    #[rstest]
    fn rejects_imbalanced_total(solver: NettingSolver) {
        let result = solver.simplify(&balances(&[(1, 50), (2, -40)]));

        assert_eq!(
            result,
            Err(InvariantViolation::ImbalancedTotal(Money::from_i64(10)))
        );
    }

    #[rstest]
    fn extreme_balances_that_sum_to_zero_are_netted(solver: NettingSolver) {
        let input = balances(&[(1, i64::MAX), (2, 1), (3, -i64::MAX), (4, -1)]);

        let settlements = solver.simplify(&input).expect("balanced input");

        assert_eq!(as_triples(&settlements), vec![(3, 1, i64::MAX), (4, 2, 1)]);
        assert!(apply_settlements(&input, &settlements).values().all(|m| m.is_zero()));
    }

    #[rstest]
    #[case::minimum_balance(
        &[(1, i64::MIN), (2, i64::MAX), (3, 1)],
        InvariantViolation::BalanceOutOfRange { member: MemberId(1) }
    )]
    #[case::total_overflows(&[(1, i64::MAX), (2, i64::MAX)], InvariantViolation::TotalOutOfRange)]
    fn rejects_unrepresentable_balances(
        solver: NettingSolver,
        #[case] input: &[(u64, i64)],
        #[case] expected: InvariantViolation,
    ) {
        assert_eq!(solver.simplify(&balances(input)), Err(expected));
    }

    #[rstest]
    fn applied_solution_is_idempotent(solver: NettingSolver) {
        let input = balances(&[(1, 300), (2, -100), (3, -120), (4, -80)]);

        let settlements = solver.simplify(&input).expect("balanced input");
        let settled = apply_settlements(&input, &settlements);

        assert!(solver.simplify(&settled).expect("zero vector").is_empty());
    }

    #[test]
    fn floor_drops_small_settlements() {
        let solver = NettingSolver::with_min_transfer(Money::from_i64(10));
        let input = balances(&[(1, 105), (2, -100), (3, -5)]);

        let settlements = solver.simplify(&input).expect("balanced input");

        assert_eq!(as_triples(&settlements), vec![(2, 1, 100)]);
        assert_eq!(
            apply_settlements(&input, &settlements),
            balances(&[(1, 5), (2, 0), (3, -5)])
        );
    }

    #[test]
    fn default_floor_is_one_minor_unit() {
        let solver = NettingSolver::new();
        let input = balances(&[(1, 1), (2, -1)]);

        assert_eq!(solver.min_transfer(), Money::from_i64(1));
        assert_eq!(
            as_triples(&solver.simplify(&input).expect("balanced input")),
            vec![(2, 1, 1)]
        );
    }
}
