use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use crate::evaluation::prompts::{build_evaluation_prompt, EVALUATION_SYSTEM};
use crate::evaluation::{download_cv, CvEvaluator, EvaluationError, Verdict};
use crate::llm_client::LlmClient;

/// CV text beyond this many characters is dropped before prompting.
const MAX_CV_CHARS: usize = 40_000;

/// Extracts CV text locally and asks the hosted completion API for a verdict.
/// Only PDF CVs can be read; DOC/DOCX uploads end up `pending`.
#[derive(Clone)]
pub struct LlmEvaluator {
    http: Client,
    llm: LlmClient,
    download_timeout: Duration,
}

impl LlmEvaluator {
    pub fn new(llm: LlmClient, download_timeout: Duration) -> Result<Self, EvaluationError> {
        Ok(Self {
            http: Client::builder().build()?,
            llm,
            download_timeout,
        })
    }
}

fn looks_like_pdf(body: &[u8], content_type: Option<&str>) -> bool {
    body.starts_with(b"%PDF") || content_type.is_some_and(|ct| ct.contains("pdf"))
}

async fn extract_pdf_text(body: Bytes) -> Result<String, EvaluationError> {
    tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&body))
        .await
        .map_err(|e| EvaluationError::Extraction(e.to_string()))?
        .map_err(|e| EvaluationError::Extraction(e.to_string()))
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl CvEvaluator for LlmEvaluator {
    async fn evaluate(
        &self,
        cv_url: &str,
        job_description: &str,
    ) -> Result<Verdict, EvaluationError> {
        let (body, content_type) = download_cv(&self.http, cv_url, self.download_timeout).await?;
        if !looks_like_pdf(&body, content_type.as_deref()) {
            return Err(EvaluationError::Extraction(
                "only PDF CVs can be read".to_string(),
            ));
        }

        let text = extract_pdf_text(body).await?;
        if text.trim().is_empty() {
            return Err(EvaluationError::Extraction("CV has no text layer".to_string()));
        }

        let prompt = build_evaluation_prompt(job_description, truncate_chars(&text, MAX_CV_CHARS));
        let value = self.llm.json_object(EVALUATION_SYSTEM, &prompt).await?;
        Verdict::from_value(value)
    }
}
