//! Nickname case-mapping.
//!
//! IRC treats nicknames case-insensitively. Servers advertise the folding
//! rules they use through the `CASEMAPPING` ISUPPORT token; the two common
//! values are supported here.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A nickname case-mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseMapping {
    /// Only `A`-`Z` fold to `a`-`z`.
    #[default]
    Ascii,
    /// ASCII folding plus `[]\~` to `{}|^`.
    Rfc1459,
}

impl CaseMapping {
    /// Fold a single character.
    #[inline]
    #[must_use]
    pub const fn fold_char(self, c: char) -> char {
        match (self, c) {
            (CaseMapping::Rfc1459, '[') => '{',
            (CaseMapping::Rfc1459, ']') => '}',
            (CaseMapping::Rfc1459, '\\') => '|',
            (CaseMapping::Rfc1459, '~') => '^',
            (_, 'A'..='Z') => c.to_ascii_lowercase(),
            _ => c,
        }
    }

    /// Normalize a nickname to its canonical lookup key.
    #[must_use]
    pub fn normalize(self, nick: &str) -> String {
        nick.chars().map(|c| self.fold_char(c)).collect()
    }

    /// Compare two nicknames under this mapping.
    #[must_use]
    pub fn nick_eq(self, a: &str, b: &str) -> bool {
        a.len() == b.len()
            && a
                .chars()
                .zip(b.chars())
                .all(|(ca, cb)| self.fold_char(ca) == self.fold_char(cb))
    }

    /// The ISUPPORT token name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CaseMapping::Ascii => "ascii",
            CaseMapping::Rfc1459 => "rfc1459",
        }
    }
}

impl fmt::Display for CaseMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseMapping {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(CaseMapping::Ascii),
            "rfc1459" => Ok(CaseMapping::Rfc1459),
            _ => Err("Unknown casemapping"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_normalize() {
        assert_eq!(CaseMapping::Ascii.normalize("Alice"), "alice");
        assert_eq!(CaseMapping::Ascii.normalize("Nick[1]"), "nick[1]");
    }

    #[test]
    fn test_rfc1459_normalize() {
        assert_eq!(CaseMapping::Rfc1459.normalize("Nick[1]"), "nick{1}");
        assert_eq!(CaseMapping::Rfc1459.normalize("Away\\Now~"), "away|now^");
    }

    #[test]
    fn test_nick_eq() {
        assert!(CaseMapping::Ascii.nick_eq("GaWeL", "gawel"));
        assert!(!CaseMapping::Ascii.nick_eq("a[", "a{"));
        assert!(CaseMapping::Rfc1459.nick_eq("a[", "A{"));
        assert!(!CaseMapping::Rfc1459.nick_eq("abc", "abcd"));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("RFC1459".parse::<CaseMapping>(), Ok(CaseMapping::Rfc1459));
        assert_eq!("ascii".parse::<CaseMapping>(), Ok(CaseMapping::Ascii));
        assert!("strict-rfc1459".parse::<CaseMapping>().is_err());
    }
}
