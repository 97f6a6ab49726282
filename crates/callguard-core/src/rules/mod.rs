//! Blocking rules: exact numbers, number prefixes and blocked contacts.
//!
//! Rules are added by an administrator and read by the decision engine on
//! every incoming call. Each kind lives in its own table; within a kind,
//! entries are unique by their normalized form, so re-adding a number that
//! only differs in spacing is reported as "not added" instead of failing.
//!
//! # Example
//!
//! ```ignore
//! use callguard_core::rules::RuleRepository;
//!
//! let rules = RuleRepository::new("callguard.db").await?;
//! rules.add_prefix("+1900").await?;
//!
//! let snapshot = rules.snapshot().await?;
//! assert_eq!(snapshot.prefixes, vec!["+1900"]);
//! ```

mod model;
mod repository;

pub use model::{BlockedContact, BlockedNumber, BlockedPrefix, RuleId, RuleSnapshot, RuleSummary};
pub use repository::RuleRepository;
