//! Call source boundary types.

use std::borrow::Cow;

/// A call waiting to be screened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingCall {
    /// Address handle of the remote party, usually a `tel:` URI.
    pub handle: Option<String>,
}

impl IncomingCall {
    /// A call from the given handle.
    #[must_use]
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: Some(handle.into()),
        }
    }

    /// A call without any handle (e.g. a withheld number).
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { handle: None }
    }

    /// Extract the phone number from the handle.
    ///
    /// The number is the part after the URI scheme (`tel:+1408...` gives
    /// `+1408...`), percent-decoded. A handle without a scheme is taken as
    /// the number itself. Returns `None` if there is no handle or nothing is
    /// left after extraction.
    #[must_use]
    pub fn number(&self) -> Option<String> {
        let handle = self.handle.as_deref()?.trim();
        let raw = match handle.split_once(':') {
            Some((scheme, rest)) if is_scheme(scheme) => rest,
            _ => handle,
        };

        let decoded = urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw));
        let number = decoded.trim();
        if number.is_empty() {
            None
        } else {
            Some(number.to_string())
        }
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// How the call source must treat a screened call.
#[allow(clippy::struct_excessive_bools)] // Mirrors the telecom response flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallResponse {
    /// Do not let the call ring.
    pub disallow_call: bool,
    /// Reject the call as if the user declined it.
    pub reject_call: bool,
    /// Keep the call out of the device call history.
    pub skip_call_log: bool,
    /// Suppress the missed-call notification.
    pub skip_notification: bool,
}

impl CallResponse {
    /// Let the call through with no restrictions.
    #[must_use]
    pub const fn allow() -> Self {
        Self {
            disallow_call: false,
            reject_call: false,
            skip_call_log: false,
            skip_notification: false,
        }
    }

    /// Disallow and reject the call, keeping it visible in the call history
    /// and notifications.
    #[must_use]
    pub const fn block() -> Self {
        Self {
            disallow_call: true,
            reject_call: true,
            skip_call_log: false,
            skip_notification: false,
        }
    }

    /// Returns true if this response stops the call.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        self.disallow_call
    }
}
