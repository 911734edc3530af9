//! Topic key policy.
//!
//! Decides which broker channel an account's events are published on and
//! which channels a subscriber listens to.

use serde::Deserialize;

use crate::domain::foundation::AccountId;

/// Default channel for the shared policy.
pub const DEFAULT_CHANNEL: &str = "events";

/// Default channel prefix for the per-account policy.
pub const DEFAULT_ACCOUNT_PREFIX: &str = "account.";

/// How events are routed to broker channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicPolicy {
    /// Every account publishes on one channel; subscribers receive all
    /// events and filter locally.
    Shared { channel: String },

    /// Each account has its own channel `<prefix><id>`; the broker fans out
    /// only the accounts a subscriber asked for.
    PerAccount { prefix: String },
}

/// Configuration-level selector for [`TopicPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicPolicyKind {
    #[default]
    Shared,
    PerAccount,
}

impl TopicPolicy {
    /// The shared policy on the default channel.
    pub fn shared() -> Self {
        TopicPolicy::Shared {
            channel: DEFAULT_CHANNEL.to_string(),
        }
    }

    /// The per-account policy with the default prefix.
    pub fn per_account() -> Self {
        TopicPolicy::PerAccount {
            prefix: DEFAULT_ACCOUNT_PREFIX.to_string(),
        }
    }

    /// Topic an event for `account_id` is published on.
    pub fn publish_topic(&self, account_id: AccountId) -> String {
        match self {
            TopicPolicy::Shared { channel } => channel.clone(),
            TopicPolicy::PerAccount { prefix } => format!("{}{}", prefix, account_id),
        }
    }

    /// Topics a subscriber interested in `accounts` must listen to.
    ///
    /// The shared policy always yields its single channel. The per-account
    /// policy yields one channel per distinct account, in ascending order,
    /// and an empty list when no accounts were given.
    pub fn subscribe_topics(&self, accounts: &[AccountId]) -> Vec<String> {
        match self {
            TopicPolicy::Shared { channel } => vec![channel.clone()],
            TopicPolicy::PerAccount { .. } => {
                let mut ids = accounts.to_vec();
                ids.sort();
                ids.dedup();
                ids.into_iter().map(|id| self.publish_topic(id)).collect()
            }
        }
    }

    /// True when subscribers receive every account's events.
    pub fn is_shared(&self) -> bool {
        matches!(self, TopicPolicy::Shared { .. })
    }
}

impl Default for TopicPolicy {
    fn default() -> Self {
        Self::shared()
    }
}
