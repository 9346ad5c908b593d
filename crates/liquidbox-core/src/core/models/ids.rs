use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const ENTRY_PREFIX: &str = "entry-";

/// Position of a box in the generated box-spec list.
///
/// Its directory name is the zero-padded `entry-0042`; parsing accepts any
/// number of digits so indices past 9999 still round-trip.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(pub usize);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("'{0}' is not an entry directory name")]
pub struct EntryIdParseError(pub String);

impl EntryId {
    pub fn index(&self) -> usize {
        self.0
    }

    pub fn directory_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", ENTRY_PREFIX, self.0)
    }
}

impl FromStr for EntryId {
    type Err = EntryIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(ENTRY_PREFIX)
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .map(EntryId)
            .ok_or_else(|| EntryIdParseError(s.to_string()))
    }
}

impl From<usize> for EntryId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_names_are_zero_padded() {
        assert_eq!(EntryId(7).directory_name(), "entry-0007");
        assert_eq!(EntryId(12345).to_string(), "entry-12345");
    }

    #[test]
    fn parses_any_digit_count() {
        assert_eq!("entry-0007".parse(), Ok(EntryId(7)));
        assert_eq!("entry-12345".parse(), Ok(EntryId(12345)));
        assert_eq!("entry-1".parse(), Ok(EntryId(1)));
    }

    #[test]
    fn rejects_other_names() {
        for name in ["entry-", "entry-1a", "entry--1", "logs", "entry-+3", "Entry-0001"] {
            assert!(name.parse::<EntryId>().is_err(), "{} parsed", name);
        }
    }
}
