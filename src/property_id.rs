//! Property identifier module.
//!
//! Provides the `PropertyId` type, an interned string identifier for
//! properties and combine nodes. Uses `Arc<str>` for memory efficiency
//! and fast comparison.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Interned string identifier for properties.
///
/// Cheap to clone; multiple `PropertyId` instances created from the same
/// handle share the underlying allocation.
///
/// # Examples
///
/// ```rust
/// use modstat::PropertyId;
///
/// let hp = PropertyId::from_str("HP");
/// let hp2: PropertyId = "HP".into();
/// let hp3: PropertyId = String::from("HP").into();
///
/// assert_eq!(hp, hp2);
/// assert_eq!(hp, hp3);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct PropertyId(Arc<str>);

impl Serialize for PropertyId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(PropertyId::from(s))
    }
}

impl PropertyId {
    /// Create a new `PropertyId` from a string slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use modstat::PropertyId;
    ///
    /// let id = PropertyId::from_str("ATK");
    /// assert_eq!(id.as_str(), "ATK");
    /// ```
    pub fn from_str(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the string representation of this `PropertyId`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PropertyId {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for PropertyId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl std::borrow::Borrow<str> for PropertyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
