use fxhash::FxHashSet;
use splitnet_domain::{
    BalanceAccumulator, MemberBalances, MemberId, Money, NettingSolver, apply_settlements,
};

use crate::{
    config::SettlementConfig,
    error::{MemberRemovalError, SettlementBuildError},
    model::{GroupSettlement, GroupSnapshot},
};

/// Turns a group snapshot into balances and settlements.
///
/// Stateless apart from its configuration; one instance may serve any number
/// of groups concurrently.
#[derive(Clone, Copy, Debug)]
pub struct SettlementService {
    config: SettlementConfig,
    solver: NettingSolver,
}

impl Default for SettlementService {
    fn default() -> Self {
        Self::new(SettlementConfig::default())
    }
}

impl SettlementService {
    pub fn new(config: SettlementConfig) -> Self {
        Self {
            config,
            solver: NettingSolver::with_min_transfer(config.min_transfer),
        }
    }

    /// Net balance of every roster member over the whole expense history.
    pub fn balances(&self, group: &GroupSnapshot) -> Result<MemberBalances, SettlementBuildError> {
        let member_ids = group.member_ids();
        let mut seen = FxHashSet::default();
        for &member in &member_ids {
            if !seen.insert(member) {
                return Err(SettlementBuildError::DuplicateMember { member });
            }
        }

        let mut accumulator = BalanceAccumulator::new_with_members(&member_ids);
        for expense in &group.expenses {
            accumulator.apply(expense).map_err(|source| {
                tracing::info!(
                    expense_id = %expense.id,
                    error = %source,
                    "Rejected expense while accumulating balances"
                );
                SettlementBuildError::InvalidExpense {
                    expense: expense.id,
                    source,
                }
            })?;
        }

        Ok(accumulator.into_balances())
    }

    pub fn settle(&self, group: &GroupSnapshot) -> Result<GroupSettlement, SettlementBuildError> {
        let balances = self.balances(group)?;
        let settlements = self.solver.simplify(&balances)?;
        let residual = apply_settlements(&balances, &settlements);

        debug_assert!(
            self.config.min_transfer > Money::from_i64(1)
                || residual.values().all(|money| money.is_zero())
        );

        tracing::debug!(
            member_count = group.members.len(),
            expense_count = group.expenses.len(),
            settlement_count = settlements.len(),
            "Group settlement computed"
        );

        Ok(GroupSettlement {
            balances,
            settlements,
            residual,
        })
    }

    /// Checks that `member` could leave the group without losing money.
    ///
    /// A member may only be removed with a zero balance and no expense that
    /// names them as payer or participant.
    pub fn check_member_removal(
        &self,
        group: &GroupSnapshot,
        member: MemberId,
    ) -> Result<(), MemberRemovalError> {
        if group.member(member).is_none() {
            return Err(MemberRemovalError::UnknownMember { member });
        }

        let balances = self.balances(group)?;
        if let Some(&balance) = balances.get(&member).filter(|balance| !balance.is_zero()) {
            return Err(MemberRemovalError::OutstandingBalance { member, balance });
        }

        if let Some(expense) = group.expenses.iter().find(|e| e.references(member)) {
            return Err(MemberRemovalError::ReferencedByExpense {
                member,
                expense: expense.id,
            });
        }

        Ok(())
    }
}
