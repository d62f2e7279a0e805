use std::{
    collections::BTreeMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use fxhash::FxHashSet;
use rust_decimal::Decimal;

use crate::{error::ValidationError, services::ShareCalculator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(pub u64);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Amount in integer minor units of the group currency (e.g. cents).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub const fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn amount(self) -> i64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_abs(self) -> Option<Self> {
        self.0.checked_abs().map(Self)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Signed per-member amounts keyed by member id.
///
/// Used both for the deltas of a single expense and for a group's net balances.
/// Iteration is in ascending member-id order.
pub type MemberBalances = BTreeMap<MemberId, Money>;

/// How an expense total is divided among its participants.
///
/// `Exact` and `Percentage` carry one entry per participant, aligned by
/// position with [`Expense::participants`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SplitRule {
    Equal,
    Exact(Vec<Money>),
    Percentage(Vec<Decimal>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub payer: MemberId,
    pub total: Money,
    pub participants: Vec<MemberId>,
    pub rule: SplitRule,
    pub description: Option<String>,
}

impl Expense {
    pub fn new(
        id: ExpenseId,
        payer: MemberId,
        total: Money,
        participants: Vec<MemberId>,
        rule: SplitRule,
    ) -> Self {
        Self {
            id,
            payer,
            total,
            participants,
            rule,
            description: None,
        }
    }

    pub fn equal(id: ExpenseId, payer: MemberId, total: Money, participants: Vec<MemberId>) -> Self {
        Self::new(id, payer, total, participants, SplitRule::Equal)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn references(&self, member: MemberId) -> bool {
        self.payer == member || self.participants.contains(&member)
    }
}

/// A directed transfer from a debtor to a creditor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// Folds expenses into the net balances of a fixed group roster.
pub struct BalanceAccumulator {
    balances: MemberBalances,
    roster: FxHashSet<MemberId>,
}

impl BalanceAccumulator {
    pub fn new_with_members(members: &[MemberId]) -> Self {
        let balances: MemberBalances = members
            .iter()
            .copied()
            .map(|member| (member, Money::ZERO))
            .collect();
        let roster = members.iter().copied().collect();

        Self { balances, roster }
    }

    /// Adds the deltas of `expense` to the running balances.
    ///
    /// On error the balances are left untouched.
    pub fn apply(&mut self, expense: &Expense) -> Result<(), ValidationError> {
        for member in std::iter::once(expense.payer).chain(expense.participants.iter().copied()) {
            if !self.roster.contains(&member) {
                return Err(ValidationError::UnknownMember { member });
            }
        }

        let deltas = ShareCalculator.compute_shares(expense)?;

        // Stage every new balance first so an overflow leaves nothing applied.
        let mut updated = Vec::with_capacity(deltas.len());
        for (member, delta) in deltas {
            let current = self.balances.get(&member).copied().unwrap_or(Money::ZERO);
            let next = current.checked_add(delta).ok_or_else(|| {
                tracing::warn!(
                    expense_id = %expense.id,
                    member = %member,
                    balance = %current,
                    delta = %delta,
                    "Balance overflow while applying expense"
                );
                ValidationError::AmountOutOfRange
            })?;
            updated.push((member, next));
        }
        self.balances.extend(updated);
        Ok(())
    }

    pub fn balances(&self) -> &MemberBalances {
        &self.balances
    }

    pub fn into_balances(self) -> MemberBalances {
        self.balances
    }
}

/// Returns `balances` after every settlement has been paid.
///
/// Paying moves the debtor up by `amount` and the creditor down by `amount`.
pub fn apply_settlements(balances: &MemberBalances, settlements: &[Settlement]) -> MemberBalances {
    let mut next = balances.clone();
    for settlement in settlements {
        *next.entry(settlement.from).or_insert(Money::ZERO) += settlement.amount;
        *next.entry(settlement.to).or_insert(Money::ZERO) -= settlement.amount;
    }
    next
}
