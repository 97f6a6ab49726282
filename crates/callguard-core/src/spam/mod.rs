//! Spam classification.
//!
//! The decision engine only needs a yes/no answer for a normalized number,
//! so the oracle is a single-method trait. [`SpamList`] is the shipped
//! implementation: a set of exact numbers plus a list of prefixes that can be
//! swapped out at runtime when a fresher list is available.
//!
//! The contract has no error channel. An implementation backed by something
//! that can fail must decide for itself what a failed lookup means; the
//! screener additionally treats an oracle that does not answer in time as
//! "not spam".

mod list;

pub use list::{SpamList, SpamListData};

/// Classifies a normalized phone number as spam or not.
pub trait SpamOracle: Send + Sync {
    /// Returns true if `normalized_number` is known spam.
    fn is_spam(&self, normalized_number: &str) -> bool;
}

impl<F> SpamOracle for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_spam(&self, normalized_number: &str) -> bool {
        self(normalized_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_oracle() {
        let oracle = |number: &str| number.ends_with("666");
        assert!(oracle.is_spam("+15550666"));
        assert!(!oracle.is_spam("+15550100"));
    }
}
