//! Out-of-band delivery of results back to the chat.
//!
//! The webhook response is long gone by the time a result is ready, so the
//! result travels on a separate path:
//!
//! | Target has | Request |
//! |------------|---------|
//! | `response_url` | `POST {response_url}` with `{"text": ...}` |
//! | `channel` or `user` | `POST {api_base}/chat.postMessage` with bearer token |
//!
//! `response_url` wins when both are present. Failures are returned to the
//! caller and never retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    command::OutboundMessage,
    config::DeliveryConfig,
    error::{AppResult, delivery_error, http_error}
};

/// Posts a finished message back to whoever asked.
#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    async fn deliver(&self, message: &OutboundMessage) -> AppResult<()>;
}

#[derive(Serialize)]
struct ResponseUrlBody<'a> {
    text: &'a str
}

#[derive(Serialize)]
struct PostMessageBody<'a> {
    channel:   &'a str,
    text:      &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread_ts: Option<&'a str>
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok:    bool,
    #[serde(default)]
    error: Option<String>
}

/// HTTP delivery through `response_url` or the Slack Web API.
pub struct HttpDelivery {
    client:    reqwest::Client,
    bot_token: Option<String>,
    api_base:  String
}

impl HttpDelivery {
    pub fn new(bot_token: Option<String>, api_base: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            bot_token,
            api_base: api_base.into()
        }
    }

    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::new(
            config.bot_token.clone(),
            config.api_base.clone(),
            Duration::from_secs(config.timeout_secs)
        )
    }

    async fn post_to_response_url(&self, url: &str, text: &str) -> AppResult<()> {
        let response = self
            .client
            .post(url)
            .json(&ResponseUrlBody {
                text
            })
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(delivery_error(format!(
                "response_url returned {}: {}",
                status, body
            )));
        }
        Ok(())
    }

    async fn post_message(
        &self,
        channel: &str,
        thread_ts: Option<&str>,
        text: &str
    ) -> AppResult<()> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or_else(|| delivery_error("no bot token configured for chat.postMessage"))?;
        let url = format!("{}/chat.postMessage", self.api_base.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&PostMessageBody {
                channel,
                text,
                thread_ts
            })
            .send()
            .await
            .map_err(http_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(delivery_error(format!(
                "chat.postMessage returned {}: {}",
                status, body
            )));
        }
        // Slack reports API errors with 200 and `ok: false`
        let result: PostMessageResponse = response.json().await.map_err(http_error)?;
        if !result.ok {
            return Err(delivery_error(format!(
                "chat.postMessage rejected: {}",
                result.error.as_deref().unwrap_or("unknown error")
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl DeliveryChannel for HttpDelivery {
    async fn deliver(&self, message: &OutboundMessage) -> AppResult<()> {
        let target = &message.target;
        if let Some(url) = target.response_url.as_deref() {
            return self.post_to_response_url(url, &message.text).await;
        }
        // A user id works as a channel for direct messages
        match target.channel.as_deref().or(target.user.as_deref()) {
            Some(channel) => {
                self.post_message(channel, target.thread_ts.as_deref(), &message.text)
                    .await
            }
            None => Err(delivery_error("target has neither response_url nor channel"))
        }
    }
}
