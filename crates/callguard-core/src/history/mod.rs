//! Decision log: which calls were blocked, when, and why.
//!
//! Only enforced blocks are recorded; allowed calls leave no trace.

mod model;
mod repository;

pub use model::DecisionLogEntry;
pub use repository::DecisionLog;
