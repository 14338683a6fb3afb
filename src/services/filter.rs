//! Instrument exclusion list

use serde::{Deserialize, Serialize};

/// Instruments containing any of these substrings are skipped before any
/// indicator work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionFilter {
    substrings: Vec<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            substrings: substrings
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
        }
    }

    /// Parse a comma separated list, ignoring blanks
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(',').map(str::trim))
    }

    pub fn is_excluded(&self, instrument: &str) -> bool {
        self.substrings.iter().any(|s| instrument.contains(s.as_str()))
    }

    pub fn substrings(&self) -> &[String] {
        &self.substrings
    }
}
