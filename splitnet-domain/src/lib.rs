#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::{InvariantViolation, ValidationError};
pub use model::{
    BalanceAccumulator, Expense, ExpenseId, Member, MemberBalances, MemberId, Money, Settlement,
    SplitRule, apply_settlements,
};
pub use services::{NettingSolver, ShareCalculator};
