use splitnet_domain::{ExpenseId, InvariantViolation, MemberId, Money, ValidationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementBuildError {
    #[error("Member {member} is declared more than once")]
    DuplicateMember { member: MemberId },
    #[error("Expense {expense} is invalid: {source}")]
    InvalidExpense {
        expense: ExpenseId,
        source: ValidationError,
    },
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemberRemovalError {
    #[error("Member {member} is not part of the group")]
    UnknownMember { member: MemberId },
    #[error("Member {member} still has a balance of {balance}")]
    OutstandingBalance { member: MemberId, balance: Money },
    #[error("Member {member} is referenced by expense {expense}")]
    ReferencedByExpense {
        member: MemberId,
        expense: ExpenseId,
    },
    #[error(transparent)]
    Balances(#[from] SettlementBuildError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("{key} must be at most {max} (found {found})")]
    OutOfRange {
        key: &'static str,
        max: u32,
        found: u32,
    },
}
