//! Domain identifier types with validation
//!
//! Newtype wrappers keep product identifiers from being mixed up with the
//! other free-form strings a listing carries (seller ids, category ids, urls).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product identifier newtype wrapper
///
/// Either the marketplace's own listing id (e.g. `MLA123456789`) or a
/// 40-character SHA-1 hex digest derived from the listing content.
///
/// # Examples
///
/// ```
/// use meli_etl::domain::ids::ProductId;
/// use std::str::FromStr;
///
/// let id = ProductId::from_str("MLA123456789").unwrap();
/// assert_eq!(id.as_str(), "MLA123456789");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new ProductId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(ProductId)` if the ID is non-blank, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Product ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the product ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
