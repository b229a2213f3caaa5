//! Pet identifiers.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// PetId is a simple string wrapper owned by the pet-management subsystem.
///
/// Any string is accepted.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct PetId(pub String);

impl PetId {
    /// Create a new PetId from any string
    pub fn new(id: impl Into<String>) -> Self {
        PetId(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PetId {
    fn from(s: String) -> Self {
        PetId(s)
    }
}

impl From<&str> for PetId {
    fn from(s: &str) -> Self {
        PetId(s.to_string())
    }
}

impl AsRef<str> for PetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PetId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PetId(s.to_string()))
    }
}
