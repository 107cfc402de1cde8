//! HTTP boundary: the slash command webhook and a health probe.
//!
//! | Route | Method | Purpose |
//! |-------|--------|---------|
//! | `/slack/command` | POST | Slash command intake (form or JSON body) |
//! | `/health` | GET | Liveness probe |
//!
//! The webhook always answers from [`Intake::submit`] without waiting for
//! analysis, keeping well inside Slack's three second deadline.

pub mod signature;

use std::{
    net::SocketAddr,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH}
};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post}
};
use serde_json::{Map, Value, json};
use tokio::net::TcpListener;

use crate::{
    command::SlashCommand,
    error::{AppError, AppResult},
    intake::Intake
};

/// Shared state of the HTTP handlers
#[derive(Clone)]
pub struct AppState {
    intake:         Arc<Intake>,
    signing_secret: Option<Arc<str>>
}

impl AppState {
    pub fn new(intake: Arc<Intake>, signing_secret: Option<String>) -> Self {
        Self {
            intake,
            signing_secret: signing_secret
                .filter(|s| !s.is_empty())
                .map(Arc::from)
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/slack/command", post(slash_command))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> AppResult<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(event = "server.listening", addr = %addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!(event = "server.shutdown");
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))
}

async fn health() -> &'static str {
    "ok"
}

async fn slash_command(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(secret) = state.signing_secret.as_deref()
        && !signature::verify(&headers, &body, secret, unix_now())
    {
        tracing::warn!(event = "webhook.bad_signature");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid signature" }))
        )
            .into_response();
    }

    let command = match decode_command(&headers, &body) {
        Ok(command) => command,
        Err(reason) => {
            tracing::warn!(event = "webhook.bad_payload", reason = %reason);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid payload" }))
            )
                .into_response();
        }
    };

    let ack = state.intake.submit(command);
    Json(json!({
        "response_type": "ephemeral",
        "text": ack.text()
    }))
    .into_response()
}

/// Decode a JSON body, or a form body for anything else
pub fn decode_command(headers: &HeaderMap, body: &[u8]) -> Result<SlashCommand, String> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if is_json {
        return serde_json::from_slice(body).map_err(|e| e.to_string());
    }

    let fields: Map<String, Value> = url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect();
    serde_json::from_value(Value::Object(fields)).map_err(|e| e.to_string())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn content_type(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_decode_form_body() {
        let body = b"text=select+*+from+users&channel_id=C1&user_id=U1&response_url=https%3A%2F%2Fhooks.example%2F1";
        let command =
            decode_command(&content_type("application/x-www-form-urlencoded"), body).unwrap();
        assert_eq!(command.text, "select * from users");
        let target = command.target();
        assert_eq!(target.channel.as_deref(), Some("C1"));
        assert_eq!(target.user.as_deref(), Some("U1"));
        assert_eq!(
            command.response_url.as_deref(),
            Some("https://hooks.example/1")
        );
    }

    #[test]
    fn test_decode_json_body() {
        let body = br#"{"text":"SELECT 1","channel":"C9","thread_ts":"1.2"}"#;
        let command = decode_command(&content_type("application/json"), body).unwrap();
        assert_eq!(command.text, "SELECT 1");
        assert_eq!(command.target().channel.as_deref(), Some("C9"));
        assert_eq!(command.thread_ts.as_deref(), Some("1.2"));
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(decode_command(&content_type("application/json"), b"{not json").is_err());
    }

    #[test]
    fn test_decode_json_null_text() {
        let body = br#"{"text": null, "channel": "C1"}"#;
        let command = decode_command(&content_type("application/json"), body).unwrap();
        assert!(command.text.is_empty());
    }

    #[test]
    fn test_decode_form_with_both_channel_fields() {
        let command = decode_command(&HeaderMap::new(), b"text=SELECT+1&channel=C1&channel_id=C2")
            .unwrap();
        assert_eq!(command.target().channel.as_deref(), Some("C2"));
    }

    #[test]
    fn test_decode_form_without_text() {
        let command = decode_command(&HeaderMap::new(), b"channel_id=C1").unwrap();
        assert!(command.text.is_empty());
    }
}
