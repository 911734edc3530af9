//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Identifier of a tracked account.
///
/// Always a positive integer. Zero and negative values are reserved for
/// sentinel events and never name a real account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct AccountId(i32);

impl AccountId {
    /// Creates an AccountId, rejecting zero and negative values.
    pub fn new(value: i32) -> Result<Self, ValidationError> {
        if value < 1 {
            return Err(ValidationError::invalid_format(
                "account_id",
                format!("{} is not a positive integer", value),
            ));
        }
        Ok(Self(value))
    }

    /// Returns the raw integer value.
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::empty_field("account_id"));
        }
        let value: i32 = s.parse().map_err(|_| {
            ValidationError::invalid_format("account_id", format!("{:?} is not an integer", s))
        })?;
        Self::new(value)
    }
}

impl TryFrom<i32> for AccountId {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccountId> for i32 {
    fn from(id: AccountId) -> Self {
        id.0
    }
}
