#![warn(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod model;
pub mod ports;
pub mod settlement_service;

pub use config::SettlementConfig;
pub use error::{ConfigError, MemberRemovalError, SettlementBuildError};
pub use model::{GroupSettlement, GroupSnapshot};
pub use ports::MemberDirectory;
pub use settlement_service::SettlementService;
