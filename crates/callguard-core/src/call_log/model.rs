//! Device call history models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Direction/outcome of a call in the device history.
///
/// Maps the platform's integer call types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// Answered incoming call.
    Incoming,
    /// Outgoing call.
    Outgoing,
    /// Unanswered incoming call.
    Missed,
    /// Call that went to voicemail.
    Voicemail,
    /// Call rejected by the user.
    Rejected,
    /// Call blocked automatically.
    Blocked,
    /// Any other platform code.
    #[default]
    Unknown,
}

impl CallKind {
    /// Parse a platform call type code.
    #[must_use]
    pub const fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Incoming,
            2 => Self::Outgoing,
            3 => Self::Missed,
            4 => Self::Voicemail,
            5 => Self::Rejected,
            6 => Self::Blocked,
            _ => Self::Unknown,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Incoming => "Incoming",
            Self::Outgoing => "Outgoing",
            Self::Missed => "Missed",
            Self::Voicemail => "Voicemail",
            Self::Rejected => "Rejected",
            Self::Blocked => "Blocked",
            Self::Unknown => "Unknown",
        }
    }
}

/// Accepts either a kind name (`"missed"`) or a platform code (`3`).
fn deserialize_kind<'de, D>(deserializer: D) -> Result<CallKind, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Code(i32),
        Name(CallKind),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Code(code) => CallKind::from_code(code),
        Repr::Name(kind) => kind,
    })
}

/// One entry of the device call history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCallEntry {
    /// Remote number.
    pub number: String,
    /// Cached contact name, if the platform had one.
    #[serde(default)]
    pub name: Option<String>,
    /// Call direction/outcome, as a name or a platform code.
    #[serde(default, deserialize_with = "deserialize_kind")]
    pub kind: CallKind,
    /// Call start, in milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
    /// Call duration in seconds.
    #[serde(default)]
    pub duration_secs: u64,
}

impl DeviceCallEntry {
    /// When the call started.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_millis)
    }

    /// Name if known, otherwise the number.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.number)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_call_kind_codes() {
        assert_eq!(CallKind::from_code(1), CallKind::Incoming);
        assert_eq!(CallKind::from_code(3), CallKind::Missed);
        assert_eq!(CallKind::from_code(6), CallKind::Blocked);
        assert_eq!(CallKind::from_code(42), CallKind::Unknown);
    }

    #[test]
    fn test_label() {
        let mut entry = DeviceCallEntry {
            number: "+15550100".to_string(),
            name: Some("Alice".to_string()),
            kind: CallKind::Incoming,
            timestamp_millis: 0,
            duration_secs: 12,
        };
        assert_eq!(entry.label(), "Alice");

        entry.name = Some(String::new());
        assert_eq!(entry.label(), "+15550100");
    }

    #[test]
    fn test_deserialize_kind_code() {
        let entry: DeviceCallEntry = serde_json::from_str(
            r#"{"number": "+15550100", "kind": 5, "timestamp_millis": 5}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, CallKind::Rejected);

        let entry: DeviceCallEntry = serde_json::from_str(
            r#"{"number": "+15550100", "kind": 99, "timestamp_millis": 5}"#,
        )
        .unwrap();
        assert_eq!(entry.kind, CallKind::Unknown);
    }

    #[test]
    fn test_deserialize_defaults() {
        let entry: DeviceCallEntry =
            serde_json::from_str(r#"{"number": "+15550100", "timestamp_millis": 5}"#).unwrap();
        assert_eq!(entry.kind, CallKind::Unknown);
        assert_eq!(entry.name, None);
        assert_eq!(entry.duration_secs, 0);
    }
}
