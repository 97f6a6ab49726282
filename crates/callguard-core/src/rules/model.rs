//! Blocking rule data models.

use std::fmt;

/// Unique identifier of a stored rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub i64);

impl RuleId {
    /// Create a new rule ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An exact phone number that is always blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedNumber {
    /// Unique identifier.
    pub id: RuleId,
    /// Phone number as entered by the administrator (trimmed).
    pub phone_number: String,
}

/// A number prefix; any caller whose number starts with it is blocked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedPrefix {
    /// Unique identifier.
    pub id: RuleId,
    /// Prefix as entered by the administrator (trimmed).
    pub prefix: String,
}

/// A blocked contact: an exact number with an optional display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedContact {
    /// Unique identifier.
    pub id: RuleId,
    /// Contact display name, if one was picked.
    pub contact_name: Option<String>,
    /// Phone number of the contact (trimmed).
    pub phone_number: String,
}

impl BlockedContact {
    /// Returns a display string for the contact.
    ///
    /// If a name is present, returns "Name (number)", otherwise just the number.
    #[must_use]
    pub fn display(&self) -> String {
        match &self.contact_name {
            Some(name) => format!("{name} ({})", self.phone_number),
            None => self.phone_number.clone(),
        }
    }
}

/// Normalized rule values, read in one consistent pass.
///
/// This is what the decision engine evaluates; it carries no identities
/// because matching is existence-based.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSnapshot {
    /// Exact numbers.
    pub numbers: Vec<String>,
    /// Exact numbers of blocked contacts.
    pub contact_numbers: Vec<String>,
    /// Number prefixes.
    pub prefixes: Vec<String>,
}

impl RuleSnapshot {
    /// Returns true if there are no rules of any kind.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty() && self.contact_numbers.is_empty() && self.prefixes.is_empty()
    }
}

/// Rule counts for a one-line status display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleSummary {
    /// Number of exact number rules.
    pub numbers: u32,
    /// Number of prefix rules.
    pub prefixes: u32,
    /// Number of blocked contacts.
    pub contacts: u32,
}

impl RuleSummary {
    /// Total number of rules.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.numbers + self.prefixes + self.contacts
    }
}

fn plural(count: u32, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

impl fmt::Display for RuleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if self.numbers > 0 {
            parts.push(plural(self.numbers, "number", "numbers"));
        }
        if self.prefixes > 0 {
            parts.push(plural(self.prefixes, "prefix", "prefixes"));
        }
        if self.contacts > 0 {
            parts.push(plural(self.contacts, "contact", "contacts"));
        }

        if parts.is_empty() {
            f.write_str("No blocking rules configured")
        } else {
            write!(f, "{} blocked", parts.join(" \u{2022} "))
        }
    }
}
