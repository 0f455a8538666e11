// Summary clients.
//
// `EndpointClient` posts the report to an external `/summary` service and
// reads back `{"summary": "..."}`. `ClaudeClient` streams a summary from the
// Anthropic Messages API using reqwest-eventsource. `SummaryClient` selects
// one from config, or is disabled.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use bigboard_core::config::{Config, SummaryProvider};
use bigboard_core::report::ScoutingReport;

use crate::prompt;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("summary generation is not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Transport(String),

    #[error("summary service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid summary response: {0}")]
    InvalidResponse(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("summary was empty")]
    Empty,
}

// ---------------------------------------------------------------------------
// SummaryService
// ---------------------------------------------------------------------------

/// Anything that can turn a report into a summary paragraph.
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn summarize(&self, report: &ScoutingReport) -> Result<String, SummaryError>;
}

// ---------------------------------------------------------------------------
// EndpointClient
// ---------------------------------------------------------------------------

/// Client for a summary service exposing `POST {base}/summary`.
pub struct EndpointClient {
    http: reqwest::Client,
    base_url: String,
}

impl EndpointClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    fn summary_url(&self) -> String {
        format!("{}/summary", self.base_url.trim_end_matches('/'))
    }

    /// Send the full report as JSON. A 2xx reply must carry a non-empty
    /// `summary` string; any other status is an error, with the service's
    /// `error` message when it sent one.
    pub async fn request_summary(&self, report: &ScoutingReport) -> Result<String, SummaryError> {
        let url = self.summary_url();
        debug!(%url, report_id = %report.id, "requesting summary");

        let response = self
            .http
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|e| SummaryError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SummaryError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error")?.as_str().map(str::to_string))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(SummaryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        parse_summary_body(&body)
    }
}

/// Extract `summary` from a `{"summary": "..."}` reply body.
pub(crate) fn parse_summary_body(body: &str) -> Result<String, SummaryError> {
    let v: Value =
        serde_json::from_str(body).map_err(|e| SummaryError::InvalidResponse(e.to_string()))?;
    let summary = v
        .get("summary")
        .and_then(Value::as_str)
        .ok_or_else(|| SummaryError::InvalidResponse("missing `summary` field".to_string()))?
        .trim();
    if summary.is_empty() {
        return Err(SummaryError::Empty);
    }
    Ok(summary.to_string())
}

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Streaming Claude Messages API client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String, max_tokens: u32) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: ANTHROPIC_API_URL.to_string(),
            api_key,
            model,
            max_tokens,
        }
    }

    /// Point the client at a different Messages endpoint.
    pub fn with_api_url(mut self, api_url: String) -> Self {
        self.api_url = api_url;
        self
    }

    /// Stream one message and return the full text.
    ///
    /// Each text delta is also forwarded to `tokens` when given; a dropped
    /// receiver is ignored and the stream runs to completion.
    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        tokens: Option<&mpsc::Sender<String>>,
    ) -> Result<String, SummaryError> {
        if self.api_key.is_empty() {
            return Err(SummaryError::NotConfigured);
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let request = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = request
            .eventsource()
            .map_err(|e| SummaryError::Stream(format!("failed to create event source: {e}")))?;

        let mut full_text = String::new();
        let mut input_tokens: u32 = 0;
        let mut output_tokens: u32 = 0;

        while let Some(event) = es.next().await {
            match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                }
                Ok(Event::Message(msg)) => match msg.event.as_str() {
                    "message_start" => {
                        match parse_input_tokens(&msg.data) {
                            Some(n) => input_tokens = n,
                            None => warn!("failed to parse input_tokens from message_start"),
                        }
                    }
                    "content_block_delta" => {
                        if let Some(text) = parse_delta_text(&msg.data) {
                            full_text.push_str(&text);
                            if let Some(tx) = tokens {
                                let _ = tx.send(text).await;
                            }
                        }
                    }
                    "message_delta" => {
                        if let Some(n) = parse_output_tokens(&msg.data) {
                            output_tokens = n;
                        }
                    }
                    "message_stop" => {
                        es.close();
                        break;
                    }
                    "error" => {
                        es.close();
                        return Err(SummaryError::Stream(
                            parse_stream_error(&msg.data)
                                .unwrap_or_else(|| "unknown stream error".to_string()),
                        ));
                    }
                    other => {
                        debug!(event_type = other, "ignoring SSE event");
                    }
                },
                Err(err) => {
                    es.close();
                    return Err(map_stream_error(err));
                }
            }
        }

        debug!(input_tokens, output_tokens, "summary stream finished");

        let text = full_text.trim();
        if text.is_empty() {
            return Err(SummaryError::Empty);
        }
        Ok(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// SummaryClient
// ---------------------------------------------------------------------------

/// The configured summary collaborator.
pub enum SummaryClient {
    Endpoint(EndpointClient),
    Claude(ClaudeClient),
    /// Only local summaries are produced.
    Disabled,
}

impl SummaryClient {
    pub fn from_config(config: &Config) -> Self {
        let summary = &config.summary;
        match summary.provider {
            SummaryProvider::Endpoint => match summary.endpoint.as_deref() {
                Some(url) if !url.trim().is_empty() => {
                    info!("Summary endpoint: {url}");
                    SummaryClient::Endpoint(EndpointClient::new(url.to_string()))
                }
                _ => {
                    warn!("Summary provider is \"endpoint\" but no endpoint is set; using local summaries");
                    SummaryClient::Disabled
                }
            },
            SummaryProvider::Claude => match &config.credentials.anthropic_api_key {
                Some(key) if !key.is_empty() => {
                    info!("Summary provider: Claude ({})", summary.model);
                    SummaryClient::Claude(ClaudeClient::new(
                        key.clone(),
                        summary.model.clone(),
                        summary.max_tokens,
                    ))
                }
                _ => {
                    warn!("No Anthropic API key configured; using local summaries");
                    SummaryClient::Disabled
                }
            },
            SummaryProvider::Local => SummaryClient::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, SummaryClient::Disabled)
    }
}

#[async_trait]
impl SummaryService for SummaryClient {
    async fn summarize(&self, report: &ScoutingReport) -> Result<String, SummaryError> {
        match self {
            SummaryClient::Endpoint(client) => client.request_summary(report).await,
            SummaryClient::Claude(client) => {
                let user = prompt::build_summary_prompt(report);
                client
                    .stream_message(&prompt::system_prompt(), &user, None)
                    .await
            }
            SummaryClient::Disabled => Err(SummaryError::NotConfigured),
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// `{ "message": { "usage": { "input_tokens": N } } }`
pub(crate) fn parse_input_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("message")?
        .get("usage")?
        .get("input_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// `{ "delta": { "type": "text_delta", "text": "..." } }`
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?.get("text")?.as_str().map(|s| s.to_string())
}

/// `{ "usage": { "output_tokens": N } }`
pub(crate) fn parse_output_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("usage")?
        .get("output_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// `{ "type": "error", "error": { "message": "..." } }`
pub(crate) fn parse_stream_error(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

fn map_stream_error(err: reqwest_eventsource::Error) -> SummaryError {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => SummaryError::Status {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown").to_string(),
        },
        reqwest_eventsource::Error::Transport(e) => SummaryError::Transport(e.to_string()),
        other => SummaryError::Stream(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
