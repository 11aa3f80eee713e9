//! Hosted completion API, used by the `llm` evaluator backend to turn a
//! prompt into one JSON object.
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
/// Model used for CV evaluation.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 2048;
const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// The assistant turn is opened with this, so the answer continues an object.
const JSON_PREFILL: &str = "{";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("completion was cut off ({0})")]
    Truncated(String),

    #[error("completion holds no JSON object")]
    NoJsonObject,

    #[error("completion is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Rate limits, overload, server faults and dropped connections are worth another go.
    fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            LlmError::Api { status, .. } => *status == 429 || *status == 529 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: [Turn<'a>; 2],
}

#[derive(Serialize)]
struct Turn<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct Reply {
    content: Vec<Block>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorReply {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl Reply {
    fn text(self) -> Result<String, LlmError> {
        if self.stop_reason.as_deref() == Some("max_tokens") {
            return Err(LlmError::Truncated("max_tokens".to_string()));
        }
        Ok(self.content.into_iter().filter_map(|b| b.text).collect())
    }
}

fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF * 2u32.pow(attempt.saturating_sub(1))
}

/// Pulls the outermost `{...}` out of `text` and decodes it.
fn parse_object(text: &str) -> Result<Value, LlmError> {
    let start = text.find('{').ok_or(LlmError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(LlmError::NoJsonObject)?;
    if end < start {
        return Err(LlmError::NoJsonObject);
    }
    match serde_json::from_str::<Value>(&text[start..=end])? {
        value @ Value::Object(_) => Ok(value),
        _ => Err(LlmError::NoJsonObject),
    }
}

#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            api_key,
        })
    }

    /// Asks for a single JSON object answering `prompt`.
    pub async fn json_object(&self, system: &str, prompt: &str) -> Result<Value, LlmError> {
        let request = Request {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: 0.0,
            system,
            messages: [
                Turn {
                    role: "user",
                    content: prompt,
                },
                Turn {
                    role: "assistant",
                    content: JSON_PREFILL,
                },
            ],
        };
        let continuation = self.send(&request).await?;
        parse_object(&format!("{JSON_PREFILL}{continuation}"))
    }

    async fn send(&self, request: &Request<'_>) -> Result<String, LlmError> {
        let mut attempt = 1;
        loop {
            match self.send_once(request).await {
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    let delay = backoff(attempt);
                    warn!("Completion attempt {attempt} failed ({e}), retrying in {delay:?}");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn send_once(&self, request: &Request<'_>) -> Result<String, LlmError> {
        let response = self
            .http
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorReply>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: Reply = response.json().await?;
        debug!("Completion stop_reason={:?}", reply.stop_reason);
        reply.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_millis(500));
        assert_eq!(backoff(2), Duration::from_millis(1000));
        assert_eq!(backoff(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_only_overload_and_server_faults_retry() {
        let api = |status| LlmError::Api {
            status,
            message: String::new(),
        };
        assert!(api(429).is_transient());
        assert!(api(529).is_transient());
        assert!(api(502).is_transient());
        assert!(!api(400).is_transient());
        assert!(!api(401).is_transient());
        assert!(!LlmError::NoJsonObject.is_transient());
    }

    #[test]
    fn test_prefilled_object_is_recovered_from_chatter() {
        let text = format!("{JSON_PREFILL}\"eligible\": true}}\nHope this helps!");
        assert_eq!(parse_object(&text).unwrap()["eligible"], true);
        assert_eq!(
            parse_object("Sure: {\"a\": {\"b\": 1}} done").unwrap()["a"]["b"],
            1
        );
    }

    #[test]
    fn test_missing_or_broken_object_is_an_error() {
        assert!(matches!(parse_object("no json here"), Err(LlmError::NoJsonObject)));
        assert!(matches!(parse_object("} backwards {"), Err(LlmError::NoJsonObject)));
        assert!(matches!(parse_object("{\"a\": }"), Err(LlmError::Json(_))));
    }

    #[test]
    fn test_cut_off_reply_is_rejected() {
        let reply: Reply = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"\"eligible\": tr"}],"stop_reason":"max_tokens"}"#,
        )
        .unwrap();
        assert!(matches!(reply.text(), Err(LlmError::Truncated(_))));
    }

    #[test]
    fn test_reply_text_joins_text_blocks() {
        let reply: Reply = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"\"a\": "},{"type":"text","text":"1}"}],
                "stop_reason":"end_turn"}"#,
        )
        .unwrap();
        assert_eq!(reply.text().unwrap(), "\"a\": 1}");
    }
}
