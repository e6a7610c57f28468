//! Product identifier newtype.
//!
//! Product IDs arrive as opaque strings from the page (the `data-id` of an
//! add-to-cart control) and are compared byte for byte.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ProductId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductIdError {
    /// The input string is empty or only whitespace.
    #[error("product id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("product id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A stable product identifier, unique within a cart.
///
/// ## Examples
///
/// ```
/// use cartstore_core::ProductId;
///
/// let id = ProductId::parse(" sku-42 ").unwrap();
/// assert_eq!(id.as_str(), "sku-42");
///
/// assert!(ProductId::parse("").is_err());
/// assert!(ProductId::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Maximum length of a product ID.
    pub const MAX_LENGTH: usize = 255;

    /// Parse a `ProductId` from user-supplied input, trimming whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or longer than
    /// [`Self::MAX_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, ProductIdError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ProductIdError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(ProductIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
