use std::{borrow::Borrow, fmt, str::FromStr};
use thiserror::Error;

/// The base-32 alphabet of geohash strings (no `a`, `i`, `l` or `o`).
pub const BASE32_ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Look up the 5-bit value of a geohash character.
pub fn base32_index(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    BASE32_ALPHABET
        .iter()
        .position(|&b| b == c as u8)
        .map(|idx| idx as u8)
}

/// A geohash cell identifier.
///
/// The number of characters is the precision of the cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Geohash(String);

impl Geohash {
    /// The caller is responsible to only pass
    /// non-empty strings over [`BASE32_ALPHABET`].
    pub fn new_unchecked(hash: String) -> Self {
        debug_assert!(is_valid_geohash(&hash));
        Self(hash)
    }

    pub fn precision(&self) -> usize {
        self.0.len()
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

pub fn is_valid_geohash(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| base32_index(c).is_some())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeohashParseError {
    #[error("Geohash cannot be empty")]
    Empty,
    #[error("Invalid geohash character '{0}'")]
    InvalidCharacter(char),
}

impl FromStr for Geohash {
    type Err = GeohashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(GeohashParseError::Empty);
        }
        if let Some(c) = s.chars().find(|&c| base32_index(c).is_none()) {
            return Err(GeohashParseError::InvalidCharacter(c));
        }
        Ok(Self(s.to_owned()))
    }
}

impl AsRef<str> for Geohash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for Geohash {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl From<Geohash> for String {
    fn from(from: Geohash) -> Self {
        from.0
    }
}

impl fmt::Display for Geohash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
