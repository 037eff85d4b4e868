use std::fmt;
use std::str::FromStr;

use crate::error::TaggaiError;

/// Which images of a group a video listing draws from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DerivationFilter {
    /// Every image in the group
    #[default]
    All,
    /// Only the source image (no derivation)
    Source,
    /// Only the image with this derivation code
    Derivation(String),
}

impl DerivationFilter {
    /// Interpret an optional request parameter; a missing value means `All`.
    pub fn from_query(value: Option<&str>) -> Result<Self, TaggaiError> {
        value.map_or(Ok(Self::All), str::parse)
    }
}

impl FromStr for DerivationFilter {
    type Err = TaggaiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        if s.eq_ignore_ascii_case("source") {
            return Ok(Self::Source);
        }

        Ok(Self::Derivation(s.to_lowercase()))
    }
}

impl fmt::Display for DerivationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Source => f.write_str("source"),
            Self::Derivation(code) => f.write_str(code),
        }
    }
}
