//! # Principals
//!
//! An account on the ledger. Stacks-style strings such as
//! `ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM` or contract principals like
//! `ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM.quest2earn`.
//!
//! Validation is structural only. Signatures are out of scope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::MAX_PRINCIPAL_LENGTH;

/// Errors produced when parsing a principal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrincipalError {
    /// The principal string was empty.
    #[error("principal is empty")]
    Empty,

    /// The principal string exceeded the maximum length.
    #[error("principal too long: {len} > {max}")]
    TooLong {
        /// Actual length.
        len: usize,
        /// Allowed length.
        max: usize,
    },

    /// The principal contained a character outside the allowed set.
    #[error("invalid character {0:?} in principal")]
    InvalidCharacter(char),
}

/// An account identifier.
///
/// Cheap to compare and hash. Ordering is lexicographic, which keeps
/// `BTreeMap`-keyed balances in a stable order for receipts and dumps.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    /// Parses and validates a principal.
    ///
    /// # Errors
    ///
    /// Returns `PrincipalError` if the string is empty, too long, or contains
    /// characters other than ASCII alphanumerics, `.`, `-` and `_`.
    pub fn new(raw: impl Into<String>) -> Result<Self, PrincipalError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(PrincipalError::Empty);
        }
        if raw.len() > MAX_PRINCIPAL_LENGTH {
            return Err(PrincipalError::TooLong {
                len: raw.len(),
                max: MAX_PRINCIPAL_LENGTH,
            });
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')))
        {
            return Err(PrincipalError::InvalidCharacter(bad));
        }
        Ok(Self(raw))
    }

    /// Returns the principal as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for contract principals (`<address>.<contract>`).
    #[inline]
    #[must_use]
    pub fn is_contract(&self) -> bool {
        self.0.contains('.')
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Principal {
    type Error = PrincipalError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(value: Principal) -> Self {
        value.0
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_principal() {
        let p: Principal = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM".parse().unwrap();
        assert_eq!(p.as_str(), "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM");
        assert!(!p.is_contract());
    }

    #[test]
    fn test_parse_contract_principal() {
        let p = Principal::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM.quest2earn").unwrap();
        assert!(p.is_contract());
    }

    #[test]
    fn test_reject_empty_and_bad_chars() {
        assert_eq!(Principal::new(""), Err(PrincipalError::Empty));
        assert_eq!(
            Principal::new("ST1 SPACE"),
            Err(PrincipalError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_reject_too_long() {
        let raw = "A".repeat(MAX_PRINCIPAL_LENGTH + 1);
        assert!(matches!(Principal::new(raw), Err(PrincipalError::TooLong { .. })));
    }

    #[test]
    fn test_serde_validates() {
        let ok: Principal = serde_json::from_str("\"ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG\"").unwrap();
        assert_eq!(ok.to_string(), "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG");

        let bad: Result<Principal, _> = serde_json::from_str("\"bad principal\"");
        assert!(bad.is_err());
    }
}
