//! Screening entry point: turns an incoming call into exactly one response.
//!
//! A call moves through two steps. While *evaluating*, the number is pulled
//! out of the call handle and checked against the rules and the spam
//! oracle. While *responding*, the decision becomes a [`CallResponse`] and,
//! for blocks only, an entry in the decision log.
//!
//! # Example
//!
//! ```ignore
//! use callguard_core::{CallScreener, IncomingCall, ScreeningConfig};
//!
//! let screener = CallScreener::from_config(&ScreeningConfig::default()).await?;
//! let response = screener.screen(&IncomingCall::new("tel:+14085550123")).await;
//! if response.is_blocking() {
//!     // reject the call
//! }
//! ```

mod model;
mod screener;

pub use model::{CallResponse, IncomingCall};
pub use screener::{CallScreener, DEFAULT_SPAM_LOOKUP_LIMIT};
