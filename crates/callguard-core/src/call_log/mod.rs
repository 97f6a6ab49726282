//! Device call history, used to turn a recent caller into a blocking rule.
//!
//! The history itself belongs to the device; this module only defines the
//! reader boundary and what happens when it is unavailable (an empty list,
//! never an error for the caller).

mod model;

use std::path::{Path, PathBuf};

use tracing::warn;

pub use model::{CallKind, DeviceCallEntry};

use crate::rules::RuleRepository;
use crate::{Error, Result};

/// Maximum number of history entries offered to the administrator.
pub const RECENT_CALL_LIMIT: usize = 50;

/// A readable source of device call history.
pub trait CallHistorySource: Send + Sync {
    /// Read call history entries, in any order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CallHistory`] if the history cannot be read, for
    /// instance because permission was not granted.
    fn read_calls(&self) -> Result<Vec<DeviceCallEntry>>;
}

/// Read the most recent calls, newest first, capped at [`RECENT_CALL_LIMIT`].
///
/// An unreadable source yields an empty list.
#[must_use]
pub fn recent_calls(source: &dyn CallHistorySource) -> Vec<DeviceCallEntry> {
    let mut calls = match source.read_calls() {
        Ok(calls) => calls,
        Err(e) => {
            warn!("Call history unavailable, showing no entries: {e}");
            return Vec::new();
        }
    };

    calls.retain(|call| !call.number.trim().is_empty());
    calls.sort_by(|a, b| b.timestamp_millis.cmp(&a.timestamp_millis));
    calls.truncate(RECENT_CALL_LIMIT);
    calls
}

/// Block the number of a history entry.
///
/// Returns `false` if the number was blank or already blocked.
///
/// # Errors
///
/// Returns an error if the rule store fails.
pub async fn block_caller(rules: &RuleRepository, call: &DeviceCallEntry) -> Result<bool> {
    rules.add_number(&call.number).await
}

/// Call history exported to a JSON file as an array of entries.
#[derive(Debug, Clone)]
pub struct JsonCallHistory {
    path: PathBuf,
}

impl JsonCallHistory {
    /// Create a source reading from `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl CallHistorySource for JsonCallHistory {
    fn read_calls(&self) -> Result<Vec<DeviceCallEntry>> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::CallHistory(format!("{}: {e}", self.path.display())))?;
        let calls = serde_json::from_str(&content)?;
        Ok(calls)
    }
}
