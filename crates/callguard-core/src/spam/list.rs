//! List-backed spam oracle.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::SpamOracle;
use crate::Result;
use crate::decision::normalize;

/// Known spam prefixes shipped with the application.
const BUILTIN_PREFIXES: &[&str] = &["+1408", "+1877", "+1888"];

/// Known spam numbers shipped with the application.
const BUILTIN_NUMBERS: &[&str] = &["+14085550123"];

/// Serialized form of a spam list.
///
/// ```json
/// { "numbers": ["+14085550123"], "prefixes": ["+1877"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpamListData {
    /// Exact spam numbers.
    #[serde(default)]
    pub numbers: Vec<String>,
    /// Spam number prefixes.
    #[serde(default)]
    pub prefixes: Vec<String>,
}

#[derive(Debug, Default)]
struct Entries {
    numbers: HashSet<String>,
    prefixes: Vec<String>,
}

impl From<SpamListData> for Entries {
    fn from(data: SpamListData) -> Self {
        let numbers = data
            .numbers
            .iter()
            .map(|n| normalize(n.trim()))
            .filter(|n| !n.is_empty())
            .collect();
        let prefixes = data
            .prefixes
            .iter()
            .map(|p| normalize(p.trim()))
            .filter(|p| !p.is_empty())
            .collect();
        Self { numbers, prefixes }
    }
}

/// Spam oracle backed by an exact-number set and a prefix list.
///
/// The list can be replaced while calls are being screened; a lookup sees
/// either the old list or the new one, never a mix.
#[derive(Debug)]
pub struct SpamList {
    entries: RwLock<Entries>,
}

impl SpamList {
    /// Create a list from explicit numbers and prefixes.
    #[must_use]
    pub fn new(data: SpamListData) -> Self {
        Self {
            entries: RwLock::new(data.into()),
        }
    }

    /// The list shipped with the application.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(SpamListData {
            numbers: BUILTIN_NUMBERS.iter().map(ToString::to_string).collect(),
            prefixes: BUILTIN_PREFIXES.iter().map(ToString::to_string).collect(),
        })
    }

    /// Load a list from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid list.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let list = Self::new(SpamListData::default());
        list.reload_from(path)?;
        Ok(list)
    }

    /// Atomically replace the list contents.
    pub fn replace(&self, data: SpamListData) {
        let entries = Entries::from(data);
        info!(
            numbers = entries.numbers.len(),
            prefixes = entries.prefixes.len(),
            "Spam list replaced"
        );
        *self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner) = entries;
    }

    /// Re-read the list from a JSON file and replace the current contents.
    ///
    /// On error the current contents are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid list.
    pub fn reload_from(&self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let data: SpamListData = serde_json::from_str(&content)?;
        self.replace(data);
        Ok(())
    }

    /// Number of exact numbers and prefixes currently loaded.
    #[must_use]
    pub fn counts(&self) -> (usize, usize) {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        (entries.numbers.len(), entries.prefixes.len())
    }

    /// Returns true if the list holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts() == (0, 0)
    }
}

impl Default for SpamList {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SpamOracle for SpamList {
    fn is_spam(&self, normalized_number: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.numbers.contains(normalized_number)
            || entries
                .prefixes
                .iter()
                .any(|prefix| normalized_number.starts_with(prefix.as_str()))
    }
}
