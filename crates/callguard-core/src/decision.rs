//! The call-screening decision engine.
//!
//! Evaluation is a pure function over a [`RuleSnapshot`] and a
//! [`SpamOracle`]. Checks run in a fixed order and the first match wins:
//!
//! 1. exact blocked number
//! 2. blocked contact number
//! 3. blocked prefix
//! 4. spam oracle
//!
//! The order decides which reason is recorded when several rules would
//! match the same caller.

use std::fmt;

use crate::rules::RuleSnapshot;
use crate::spam::SpamOracle;

/// Normalize a phone number or prefix for comparison.
///
/// Only ASCII spaces are removed. Punctuation such as `-` or `(` is kept.
#[must_use]
pub fn normalize(number: &str) -> String {
    number.chars().filter(|&c| c != ' ').collect()
}

/// Why a call was blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// The number is on the exact-number list.
    Number,
    /// The number belongs to a blocked contact.
    Contact,
    /// The number starts with a blocked prefix.
    Prefix,
    /// The spam oracle flagged the number.
    Spam,
}

impl BlockReason {
    /// Human-readable reason, as stored in the decision log.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "Blocked number",
            Self::Contact => "Blocked contact",
            Self::Prefix => "Blocked prefix",
            Self::Spam => "Public spam database",
        }
    }

    /// Parse a stored reason. Returns `None` for unknown text.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Blocked number" => Some(Self::Number),
            "Blocked contact" => Some(Self::Contact),
            "Blocked prefix" => Some(Self::Prefix),
            "Public spam database" => Some(Self::Spam),
            _ => None,
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of evaluating a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockDecision {
    /// Whether the call should be blocked.
    pub should_block: bool,
    /// Why, when blocking.
    pub reason: Option<BlockReason>,
}

impl BlockDecision {
    /// Let the call through.
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            should_block: false,
            reason: None,
        }
    }

    /// Block the call for the given reason.
    #[must_use]
    pub const fn block(reason: BlockReason) -> Self {
        Self {
            should_block: true,
            reason: Some(reason),
        }
    }
}

/// Check an already normalized number against the stored rules only.
///
/// Returns the reason of the first matching rule kind, or `None` if the
/// spam oracle would have to be consulted.
#[must_use]
pub fn match_rules(normalized: &str, rules: &RuleSnapshot) -> Option<BlockReason> {
    let exact = |list: &[String]| list.iter().any(|entry| normalize(entry) == normalized);

    if exact(&rules.numbers) {
        return Some(BlockReason::Number);
    }

    if exact(&rules.contact_numbers) {
        return Some(BlockReason::Contact);
    }

    if rules
        .prefixes
        .iter()
        .any(|prefix| normalized.starts_with(normalize(prefix).as_str()))
    {
        return Some(BlockReason::Prefix);
    }

    None
}

/// Decide whether to block a raw, unnormalized number.
#[must_use]
pub fn evaluate(raw_number: &str, rules: &RuleSnapshot, oracle: &dyn SpamOracle) -> BlockDecision {
    let normalized = normalize(raw_number);

    if let Some(reason) = match_rules(&normalized, rules) {
        return BlockDecision::block(reason);
    }

    if oracle.is_spam(&normalized) {
        return BlockDecision::block(BlockReason::Spam);
    }

    BlockDecision::allow()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use proptest::prelude::*;

    use super::*;

    fn never_spam(_: &str) -> bool {
        false
    }

    fn always_spam(_: &str) -> bool {
        true
    }

    fn rules(numbers: &[&str], contacts: &[&str], prefixes: &[&str]) -> RuleSnapshot {
        let owned = |list: &[&str]| list.iter().map(ToString::to_string).collect();
        RuleSnapshot {
            numbers: owned(numbers),
            contact_numbers: owned(contacts),
            prefixes: owned(prefixes),
        }
    }

    #[test]
    fn test_normalize_strips_spaces_only() {
        assert_eq!(normalize("+1 408 555 0123"), "+14085550123");
        assert_eq!(normalize("(408) 555-0123"), "(408)555-0123");
        assert_eq!(normalize("\t+1408"), "\t+1408");
    }

    #[test]
    fn test_reason_roundtrip() {
        for reason in [
            BlockReason::Number,
            BlockReason::Contact,
            BlockReason::Prefix,
            BlockReason::Spam,
        ] {
            assert_eq!(BlockReason::parse(reason.as_str()), Some(reason));
        }
        assert_eq!(BlockReason::parse("Unknown"), None);
    }

    #[test]
    fn test_blocked_number() {
        let snapshot = rules(&["+15550100"], &[], &[]);
        assert_eq!(
            evaluate("+15550100", &snapshot, &never_spam),
            BlockDecision::block(BlockReason::Number)
        );
    }

    #[test]
    fn test_blocked_contact() {
        let snapshot = rules(&[], &["+15550100"], &[]);
        assert_eq!(
            evaluate("+15550100", &snapshot, &never_spam),
            BlockDecision::block(BlockReason::Contact)
        );
    }

    #[test]
    fn test_prefix_scenario() {
        let snapshot = rules(&[], &[], &["+1408"]);

        assert_eq!(
            evaluate("+14085551234", &snapshot, &never_spam),
            BlockDecision::block(BlockReason::Prefix)
        );
        assert_eq!(
            evaluate("+19995551234", &snapshot, &never_spam),
            BlockDecision {
                should_block: false,
                reason: None
            }
        );
    }

    #[test]
    fn test_spam_oracle() {
        let snapshot = RuleSnapshot::default();
        assert_eq!(
            evaluate("+15550100", &snapshot, &always_spam),
            BlockDecision::block(BlockReason::Spam)
        );
    }

    #[test]
    fn test_precedence_number_over_contact_and_prefix() {
        let snapshot = rules(&["+15550100"], &["+15550100"], &["+1555"]);
        assert_eq!(
            evaluate("+15550100", &snapshot, &always_spam).reason,
            Some(BlockReason::Number)
        );
    }

    #[test]
    fn test_precedence_contact_over_prefix() {
        let snapshot = rules(&[], &["+15550100"], &["+1555"]);
        assert_eq!(
            evaluate("+15550100", &snapshot, &always_spam).reason,
            Some(BlockReason::Contact)
        );
    }

    #[test]
    fn test_oracle_not_consulted_when_rule_matches() {
        let calls = AtomicUsize::new(0);
        let counting = |_: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            true
        };

        let snapshot = rules(&[], &[], &["+1"]);
        evaluate("+15550100", &snapshot, &counting);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        evaluate("+445550100", &snapshot, &counting);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_oracle_receives_normalized_number() {
        let oracle = |number: &str| number == "+18775550000";
        assert!(evaluate("+1 877 555 0000", &RuleSnapshot::default(), &oracle).should_block);
    }

    #[test]
    fn test_stored_entries_are_normalized_before_comparison() {
        let snapshot = rules(&["+1 555 0100"], &[], &["+1 900"]);

        assert_eq!(
            evaluate("+15550100", &snapshot, &never_spam).reason,
            Some(BlockReason::Number)
        );
        assert_eq!(
            evaluate("+19005550000", &snapshot, &never_spam).reason,
            Some(BlockReason::Prefix)
        );
    }

    #[test]
    fn test_punctuation_is_significant() {
        let snapshot = rules(&["+1-555-0100"], &[], &[]);
        assert!(!evaluate("+15550100", &snapshot, &never_spam).should_block);
    }

    proptest! {
        #[test]
        fn prop_spaces_are_insignificant(
            digits in "\\+?[0-9]{4,12}",
            spaces in proptest::collection::vec(0usize..4, 0..12),
            prefix_len in 1usize..4,
        ) {
            let mut spaced = String::new();
            for (i, c) in digits.chars().enumerate() {
                spaced.push(c);
                for _ in 0..spaces.get(i).copied().unwrap_or(0) {
                    spaced.push(' ');
                }
            }

            let prefix: String = digits.chars().take(prefix_len).collect();
            let snapshot = rules(&[], &[], &[prefix.as_str()]);

            prop_assert_eq!(
                evaluate(&spaced, &snapshot, &never_spam),
                evaluate(&digits, &snapshot, &never_spam)
            );
        }

        #[test]
        fn prop_number_rule_always_wins(
            number in "\\+[0-9]{6,12}",
            prefix_len in 1usize..6,
        ) {
            let prefix: String = number.chars().take(prefix_len).collect();
            let snapshot = rules(&[number.as_str()], &[number.as_str()], &[prefix.as_str()]);

            prop_assert_eq!(
                evaluate(&number, &snapshot, &always_spam),
                BlockDecision::block(BlockReason::Number)
            );
        }
    }
}
