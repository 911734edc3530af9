//! Account record as held by the account store.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, ValidationError};

/// Maximum account name length accepted by the store schema.
pub const MAX_NAME_LEN: usize = 255;

/// A tracked account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub is_active: bool,
}

/// Validated input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    name: String,
    is_active: bool,
}

impl NewAccount {
    /// Validates the name: trimmed, non-empty, at most [`MAX_NAME_LEN`] chars.
    pub fn new(name: impl Into<String>, is_active: bool) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(ValidationError::invalid_format(
                "name",
                format!("must be at most {} characters", MAX_NAME_LEN),
            ));
        }
        Ok(Self { name, is_active })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Builds the stored account once the store has assigned an ID.
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            name: self.name,
            is_active: self.is_active,
        }
    }
}
