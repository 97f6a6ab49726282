//! Decision log data models.

use chrono::{DateTime, Utc};

use crate::decision::BlockReason;

/// A record of one enforced block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionLogEntry {
    /// Unique identifier.
    pub id: i64,
    /// Number of the blocked caller, as received.
    pub phone_number: String,
    /// Why the call was blocked.
    pub reason: String,
    /// When the call was blocked, in milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
}

impl DecisionLogEntry {
    /// When the call was blocked.
    ///
    /// Returns `None` if the stored timestamp is out of range.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_millis)
    }

    /// The typed reason, if the stored text is one the engine produces.
    #[must_use]
    pub fn block_reason(&self) -> Option<BlockReason> {
        BlockReason::parse(&self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_conversion() {
        let entry = DecisionLogEntry {
            id: 1,
            phone_number: "+15550100".to_string(),
            reason: "Blocked prefix".to_string(),
            timestamp_millis: 1_700_000_000_123,
        };

        let ts = entry.timestamp();
        assert_eq!(ts.map(|t| t.timestamp_millis()), Some(1_700_000_000_123));
        assert_eq!(entry.block_reason(), Some(BlockReason::Prefix));
    }

    #[test]
    fn test_unknown_reason() {
        let entry = DecisionLogEntry {
            id: 1,
            phone_number: "+15550100".to_string(),
            reason: "Unknown".to_string(),
            timestamp_millis: 0,
        };
        assert_eq!(entry.block_reason(), None);
    }
}
