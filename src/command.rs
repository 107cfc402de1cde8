//! Request and message types passed between the pipeline stages.

use serde::{Deserialize, Deserializer, Serialize};

/// Where a result has to be delivered.
///
/// Opaque to the processor; only a [`DeliveryChannel`] interprets it.
///
/// [`DeliveryChannel`]: crate::delivery::DeliveryChannel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTarget {
    pub channel:      Option<String>,
    pub user:         Option<String>,
    pub thread_ts:    Option<String>,
    /// Callback address supplied with the command
    pub response_url: Option<String>
}

/// Slash command payload as received by the webhook.
///
/// Both the slash command form (`channel_id`, `user_id`) and the event
/// style (`channel`, `user`) are accepted; the `_id` form wins when a body
/// carries both. A `null` text reads as an empty one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlashCommand {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text:         String,
    #[serde(default)]
    pub channel:      Option<String>,
    #[serde(default)]
    pub channel_id:   Option<String>,
    #[serde(default)]
    pub user:         Option<String>,
    #[serde(default)]
    pub user_id:      Option<String>,
    #[serde(default)]
    pub thread_ts:    Option<String>,
    #[serde(default)]
    pub response_url: Option<String>
}

impl SlashCommand {
    pub fn target(&self) -> DeliveryTarget {
        DeliveryTarget {
            channel:      non_empty(&self.channel_id).or_else(|| non_empty(&self.channel)),
            user:         non_empty(&self.user_id).or_else(|| non_empty(&self.user)),
            thread_ts:    non_empty(&self.thread_ts),
            response_url: non_empty(&self.response_url)
        }
    }
}

/// One accepted query, owned by the task that processes it.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    query:  String,
    target: DeliveryTarget
}

impl CommandRequest {
    pub fn new(query: impl Into<String>, target: DeliveryTarget) -> Self {
        Self {
            query: query.into(),
            target
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn target(&self) -> &DeliveryTarget {
        &self.target
    }

    pub fn callback_url(&self) -> Option<&str> {
        self.target.response_url.as_deref()
    }

    pub fn into_target(self) -> DeliveryTarget {
        self.target
    }
}

/// Final message handed to the delivery channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub target: DeliveryTarget,
    pub text:   String
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
