//! Event bus configuration

use serde::Deserialize;

use crate::domain::event::{TopicPolicy, TopicPolicyKind, DEFAULT_ACCOUNT_PREFIX, DEFAULT_CHANNEL};

use super::error::ValidationError;

/// Topic routing and delivery settings shared by the server and the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// `shared` (one channel, clients filter) or `per_account`
    #[serde(default)]
    pub topic_policy: TopicPolicyKind,

    /// Channel used by the shared policy
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Channel prefix used by the per-account policy
    #[serde(default = "default_account_prefix")]
    pub account_prefix: String,

    /// Tag appended to every published payload, e.g. the host name
    pub origin_tag: Option<String>,

    /// Events buffered per subscription before delivery waits
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,
}

impl BusConfig {
    pub fn topic_policy(&self) -> TopicPolicy {
        match self.topic_policy {
            TopicPolicyKind::Shared => TopicPolicy::Shared {
                channel: self.channel.clone(),
            },
            TopicPolicyKind::PerAccount => TopicPolicy::PerAccount {
                prefix: self.account_prefix.clone(),
            },
        }
    }

    /// Validate bus configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.topic_policy == TopicPolicyKind::Shared && self.channel.trim().is_empty() {
            return Err(ValidationError::EmptyChannel);
        }
        if self.subscriber_buffer == 0 {
            return Err(ValidationError::InvalidSubscriberBuffer);
        }
        Ok(())
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            topic_policy: TopicPolicyKind::default(),
            channel: default_channel(),
            account_prefix: default_account_prefix(),
            origin_tag: None,
            subscriber_buffer: default_subscriber_buffer(),
        }
    }
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

fn default_account_prefix() -> String {
    DEFAULT_ACCOUNT_PREFIX.to_string()
}

fn default_subscriber_buffer() -> usize {
    crate::adapters::events::DEFAULT_SUBSCRIBER_BUFFER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_use_shared_channel() {
        let config = BusConfig::default();
        assert_eq!(config.topic_policy(), TopicPolicy::shared());
        assert!(config.origin_tag.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_per_account_policy_uses_prefix() {
        let config = BusConfig {
            topic_policy: TopicPolicyKind::PerAccount,
            account_prefix: "acct:".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.topic_policy(),
            TopicPolicy::PerAccount {
                prefix: "acct:".to_string()
            }
        );
    }

    #[test]
    fn test_validation_empty_channel() {
        let config = BusConfig {
            channel: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::EmptyChannel)));
    }

    #[test]
    fn test_validation_zero_buffer() {
        let config = BusConfig {
            subscriber_buffer: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
