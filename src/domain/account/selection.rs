//! Operator selection of accounts to watch.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::foundation::AccountId;

/// A selection token that is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSelectionToken {
    pub token: String,
}

impl fmt::Display for InvalidSelectionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} should be a positive number", self.token)
    }
}

impl std::error::Error for InvalidSelectionToken {}

/// Outcome of applying a selection command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    /// Full selection after the command, ascending.
    pub selected: Vec<AccountId>,
    /// Tokens that were skipped, in the order given.
    pub rejected: Vec<InvalidSelectionToken>,
}

/// Set of account IDs an operator has chosen to observe.
///
/// Lives for one client process; never persisted. Membership is
/// order-independent, enumeration is always ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<AccountId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every token that parses as a positive integer.
    ///
    /// Invalid tokens are reported one by one and skipped; they never
    /// prevent the valid ones from being applied.
    pub fn select<I, S>(&mut self, tokens: I) -> SelectionReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rejected = Vec::new();
        for token in tokens {
            let token = token.as_ref();
            match token.parse::<AccountId>() {
                Ok(id) => {
                    self.ids.insert(id);
                }
                Err(_) => rejected.push(InvalidSelectionToken {
                    token: token.to_string(),
                }),
            }
        }

        SelectionReport {
            selected: self.ids(),
            rejected,
        }
    }

    /// Removes every selected account.
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: AccountId) -> bool {
        self.ids.contains(&id)
    }

    /// True when `raw` names a selected account. Non-positive IDs never match.
    pub fn contains_raw(&self, raw: i32) -> bool {
        AccountId::new(raw).map(|id| self.contains(id)).unwrap_or(false)
    }

    /// Selected IDs in ascending order.
    pub fn ids(&self) -> Vec<AccountId> {
        self.ids.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}
