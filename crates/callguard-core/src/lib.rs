//! # callguard-core
//!
//! Call-screening decision engine for `CallGuard`.
//!
//! This crate provides:
//! - **Rule Store** - blocked numbers, prefixes and contacts (`SQLite`)
//! - **Spam Oracle** - pluggable spam classification with a built-in list
//! - **Decision Engine** - ordered, first-match-wins rule evaluation
//! - **Decision Log** - audit trail of blocked calls
//! - **Screening** - per-call entry point that fails open on infrastructure errors
//! - **Call History** - turning recent device calls into blocking rules

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod call_log;
pub mod config;
pub mod decision;
mod error;
pub mod history;
pub mod rules;
pub mod screening;
pub mod spam;

pub use call_log::{CallHistorySource, CallKind, DeviceCallEntry, JsonCallHistory};
pub use config::ScreeningConfig;
pub use decision::{BlockDecision, BlockReason, evaluate, normalize};
pub use error::{Error, Result};
pub use history::{DecisionLog, DecisionLogEntry};
pub use rules::{
    BlockedContact, BlockedNumber, BlockedPrefix, RuleId, RuleRepository, RuleSnapshot,
    RuleSummary,
};
pub use screening::{CallResponse, CallScreener, IncomingCall};
pub use spam::{SpamList, SpamListData, SpamOracle};
