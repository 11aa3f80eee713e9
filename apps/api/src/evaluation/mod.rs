//! AI collaborator that judges a stored CV against a job description.
//!
//! Backends return a strict [`Verdict`]; anything that does not decode into
//! one is an [`EvaluationError`]. The intake pipeline downgrades every error
//! to a `pending` candidate, so nothing here reaches the HTTP boundary.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::llm_client::LlmError;

pub mod llm;
pub mod prompts;
pub mod remote;

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("CV download failed: {0}")]
    Download(String),

    #[error("evaluator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("evaluator returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("evaluator response does not match schema: {0}")]
    Schema(String),

    #[error("could not extract CV text: {0}")]
    Extraction(String),

    #[error("completion failed: {0}")]
    Llm(#[from] LlmError),

    #[error("evaluation timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait CvEvaluator: Send + Sync {
    async fn evaluate(&self, cv_url: &str, job_description: &str)
        -> Result<Verdict, EvaluationError>;
}

/// Full scoring of a candidate who met every explicit criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub candidate_name: String,
    pub degree: Option<String>,
    pub course: Option<String>,
    pub cgpa: Option<String>,
    pub ats_score: i32,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub feedback: String,
    pub detailed_feedback: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Eligible(Assessment),
    Ineligible {
        candidate_name: String,
        reason: String,
    },
}

/// Exact number of strengths and of weaknesses an assessment carries.
pub const LIST_LEN: usize = 2;

#[derive(Debug, Deserialize)]
struct RawVerdict {
    eligible: bool,
    candidate_name: Option<String>,
    reason: Option<String>,
    degree: Option<String>,
    course: Option<String>,
    cgpa: Option<Value>,
    ats_score: Option<i64>,
    strengths: Option<Vec<String>>,
    weaknesses: Option<Vec<String>>,
    feedback: Option<String>,
    detailed_feedback: Option<String>,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, EvaluationError> {
    match value.map(|s| s.trim().to_string()) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(EvaluationError::Schema(format!("missing {field}"))),
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn exact_list(value: Option<Vec<String>>, field: &str) -> Result<Vec<String>, EvaluationError> {
    let list = value.ok_or_else(|| EvaluationError::Schema(format!("missing {field}")))?;
    if list.len() != LIST_LEN || list.iter().any(|s| s.trim().is_empty()) {
        return Err(EvaluationError::Schema(format!(
            "{field} must hold exactly {LIST_LEN} non-empty entries"
        )));
    }
    Ok(list.into_iter().map(|s| s.trim().to_string()).collect())
}

/// CGPA may be reported as a string ("8.4/10", "76%") or a bare number.
fn cgpa_text(value: Option<Value>) -> Result<Option<String>, EvaluationError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(optional_text(Some(s))),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(EvaluationError::Schema(format!("unexpected cgpa {other}"))),
    }
}

impl Verdict {
    /// Decodes an untrusted evaluator answer.
    pub fn from_value(value: Value) -> Result<Self, EvaluationError> {
        let raw: RawVerdict =
            serde_json::from_value(value).map_err(|e| EvaluationError::Schema(e.to_string()))?;
        let candidate_name = required_text(raw.candidate_name, "candidate_name")?;

        if !raw.eligible {
            return Ok(Verdict::Ineligible {
                candidate_name,
                reason: required_text(raw.reason, "reason")?,
            });
        }

        let ats_score = raw
            .ats_score
            .ok_or_else(|| EvaluationError::Schema("missing ats_score".to_string()))?;
        if !(0..=100).contains(&ats_score) {
            return Err(EvaluationError::Schema(format!(
                "ats_score {ats_score} outside 0-100"
            )));
        }

        Ok(Verdict::Eligible(Assessment {
            candidate_name,
            degree: optional_text(raw.degree),
            course: optional_text(raw.course),
            cgpa: cgpa_text(raw.cgpa)?,
            ats_score: ats_score as i32,
            strengths: exact_list(raw.strengths, "strengths")?,
            weaknesses: exact_list(raw.weaknesses, "weaknesses")?,
            feedback: required_text(raw.feedback, "feedback")?,
            detailed_feedback: required_text(raw.detailed_feedback, "detailed_feedback")?,
        }))
    }
}

/// Fetches a stored CV, bounded by `timeout`.
pub async fn download_cv(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<(Bytes, Option<String>), EvaluationError> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| EvaluationError::Download(e.to_string()))?;

    if !response.status().is_success() {
        return Err(EvaluationError::Download(format!(
            "status {}",
            response.status().as_u16()
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response
        .bytes()
        .await
        .map_err(|e| EvaluationError::Download(e.to_string()))?;
    Ok((body, content_type))
}

/// Last path segment of a URL, used as the multipart file name.
pub fn file_name_from_url(url: &str) -> String {
    url.split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("cv.pdf")
        .to_string()
}
