use rust_decimal::Decimal;
use thiserror::Error;

use crate::model::{MemberId, Money};

/// Malformed expense input. Always the caller's fault and always recoverable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Expense has no participants")]
    EmptyParticipants,
    #[error("Participant {member} is listed more than once")]
    DuplicateParticipant { member: MemberId },
    #[error("Member {member} is not part of the group")]
    UnknownMember { member: MemberId },
    #[error("Expense total must not be negative (found {total})")]
    NegativeTotal { total: Money },
    #[error("Split rule has {found} entries for {expected} participants")]
    ShareCountMismatch { expected: usize, found: usize },
    #[error("Exact share for {member} must not be negative (found {amount})")]
    NegativeShare { member: MemberId, amount: Money },
    #[error("Exact shares sum to {found}, expected {expected}")]
    ExactSharesMismatch { expected: Money, found: Money },
    #[error("Percentage for {member} must not be negative (found {percentage})")]
    NegativePercentage { member: MemberId, percentage: Decimal },
    #[error("Percentages sum to {total_percentage}, expected 100")]
    PercentageSumMismatch { total_percentage: Decimal },
    #[error("Share amounts exceed the representable range")]
    AmountOutOfRange,
}

/// Broken upstream accumulation. Callers should treat this as an internal error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("Sum of balances must be zero (found {0})")]
    ImbalancedTotal(Money),
    #[error("Sum of balances must be zero (found a total outside the representable range)")]
    TotalOutOfRange,
    #[error("Balance of {member} has no representable magnitude")]
    BalanceOutOfRange { member: MemberId },
}
