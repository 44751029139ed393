//! # Diagnostics Collector
//!
//! Advisory messages that should reach the user without halting the run
//! (low free-reflection counts, undefined CC* values, and similar
//! data-quality notes).
//!
//! The collector is an explicit value passed by the caller - there is no
//! process-wide registry. Messages are grouped under a category key and
//! deduplicated: recording the same message under the same key twice is a
//! no-op, so a warning repeated for every shell surfaces once per wording.

use std::collections::BTreeMap;

/// Well-known category key for low free-reflection-count advisories.
pub const KEY_NFREE: &str = "nfree";

/// Well-known category key for undefined CC-half advisories.
pub const KEY_CC_HALF: &str = "cc_half";

/// Well-known category key for undefined CC* advisories.
pub const KEY_CC_STAR: &str = "cc_star";

/// Append-once-per-key advisory collector.
///
/// Uses `BTreeMap` so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: BTreeMap<String, Vec<String>>,
}

impl Diagnostics {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` under `key` unless that exact message is already
    /// present under the key. Returns `true` when the message was new.
    pub fn record(&mut self, key: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        let messages = self.entries.entry(key.to_string()).or_default();
        if messages.iter().any(|m| *m == message) {
            return false;
        }
        messages.push(message);
        true
    }

    /// Messages recorded under `key`, in recording order.
    #[must_use]
    pub fn messages(&self, key: &str) -> &[String] {
        self.entries.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, messages)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

// =============================================================================
// TESTS
// =============================================================================
