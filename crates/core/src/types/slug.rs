//! URL slug identifying a salon (`/salon/{slug}/...`).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug cannot be empty")]
    Empty,
    #[error("slug must be at most {max} characters")]
    TooLong { max: usize },
    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidCharacter,
    #[error("slug cannot start or end with a hyphen")]
    EdgeHyphen,
}

/// A lowercase, hyphen-separated salon slug such as `demo` or `the-fade-room`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    pub const MAX_LENGTH: usize = 64;

    /// Parse a slug. Surrounding whitespace is trimmed; case is not folded.
    ///
    /// # Errors
    ///
    /// Returns an error if the slug is empty, too long, contains anything
    /// other than `[a-z0-9-]`, or starts/ends with a hyphen.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(SlugError::InvalidCharacter);
        }
        if s.starts_with('-') || s.ends_with('-') {
            return Err(SlugError::EdgeHyphen);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = SlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert!(Slug::parse("demo").is_ok());
        assert!(Slug::parse("the-fade-room").is_ok());
        assert!(Slug::parse("salon42").is_ok());
    }

    #[test]
    fn test_invalid_slugs() {
        assert_eq!(Slug::parse(""), Err(SlugError::Empty));
        assert_eq!(Slug::parse("Demo"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("demo salon"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::parse("-demo"), Err(SlugError::EdgeHyphen));
        assert!(matches!(
            Slug::parse(&"a".repeat(65)),
            Err(SlugError::TooLong { max: 64 })
        ));
    }
}
