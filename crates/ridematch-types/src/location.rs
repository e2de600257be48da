//! Location identifiers.
//!
//! A [`Location`] is an opaque, externally defined identifier for a
//! geographic point (typically a place reference such as
//! `place_id:ChIJfdcUqp1AwFQRvsC9Io-ADdc`). The engine never interprets it;
//! it only compares identifiers and hands them to the distance oracle.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{RidematchError, Result, constants};

/// A validated, opaque location identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location(String);

impl Location {
    /// Validate and wrap an identifier.
    ///
    /// # Errors
    /// `InvalidLocation` if the identifier is empty, longer than
    /// [`constants::MAX_LOCATION_LEN`], padded with whitespace, or contains
    /// control characters.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(RidematchError::InvalidLocation {
                reason: "identifier is empty".to_string(),
            });
        }
        if id.len() > constants::MAX_LOCATION_LEN {
            return Err(RidematchError::InvalidLocation {
                reason: format!(
                    "identifier is {} bytes, limit is {}",
                    id.len(),
                    constants::MAX_LOCATION_LEN
                ),
            });
        }
        if id.trim() != id {
            return Err(RidematchError::InvalidLocation {
                reason: format!("identifier {id:?} has surrounding whitespace"),
            });
        }
        if id.chars().any(char::is_control) {
            return Err(RidematchError::InvalidLocation {
                reason: format!("identifier {id:?} contains control characters"),
            });
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Location {
    type Error = RidematchError;

    fn try_from(id: String) -> Result<Self> {
        Self::new(id)
    }
}

impl TryFrom<&str> for Location {
    type Error = RidematchError;

    fn try_from(id: &str) -> Result<Self> {
        Self::new(id)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.0
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Position of a location in the registry, and therefore its row/column in
/// the distance matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct LocationIndex(pub usize);

impl fmt::Display for LocationIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loc#{}", self.0)
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Location {
    /// Build a location from a known-good literal.
    ///
    /// # Panics
    /// Panics if the literal is not a valid identifier.
    pub fn dummy(id: &str) -> Self {
        Self::new(id).expect("dummy location must be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_place_reference() {
        let loc = Location::new("place_id:ChIJfdcUqp1AwFQRvsC9Io-ADdc").unwrap();
        assert_eq!(loc.as_str(), "place_id:ChIJfdcUqp1AwFQRvsC9Io-ADdc");
        assert_eq!(loc.to_string(), loc.as_str());
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(matches!(
            Location::new(""),
            Err(RidematchError::InvalidLocation { .. })
        ));
        assert!(matches!(
            Location::new("   "),
            Err(RidematchError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn rejects_padding_and_control_chars() {
        assert!(Location::new(" place_id:abc").is_err());
        assert!(Location::new("place_id:abc\n").is_err());
        assert!(Location::new("place\u{0007}id").is_err());
    }

    #[test]
    fn rejects_overlong_identifier() {
        let long = "x".repeat(constants::MAX_LOCATION_LEN + 1);
        assert!(Location::new(long).is_err());
        let max = "x".repeat(constants::MAX_LOCATION_LEN);
        assert!(Location::new(max).is_ok());
    }

    #[test]
    fn deserialize_validates() {
        let ok: Location = serde_json::from_str("\"place_id:abc\"").unwrap();
        assert_eq!(ok.as_str(), "place_id:abc");
        assert!(serde_json::from_str::<Location>("\"\"").is_err());
    }
}
