use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use serde_json::Value;
use tracing::debug;

use crate::evaluation::{
    download_cv, file_name_from_url, CvEvaluator, EvaluationError, Verdict,
};

/// Posts the CV and job description to the AI server as multipart
/// `{cv, jd}` and decodes its JSON answer.
#[derive(Clone)]
pub struct RemoteEvaluator {
    client: Client,
    endpoint: String,
    download_timeout: Duration,
    request_timeout: Duration,
}

impl RemoteEvaluator {
    pub fn new(
        endpoint: String,
        download_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, EvaluationError> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
            download_timeout,
            request_timeout,
        })
    }
}

#[async_trait]
impl CvEvaluator for RemoteEvaluator {
    async fn evaluate(
        &self,
        cv_url: &str,
        job_description: &str,
    ) -> Result<Verdict, EvaluationError> {
        let (body, content_type) = download_cv(&self.client, cv_url, self.download_timeout).await?;

        let part = multipart::Part::bytes(body.to_vec())
            .file_name(file_name_from_url(cv_url))
            .mime_str(content_type.as_deref().unwrap_or("application/pdf"))?;
        let form = multipart::Form::new()
            .part("cv", part)
            .text("jd", job_description.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.request_timeout)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EvaluationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| EvaluationError::Schema(e.to_string()))?;
        debug!("AI server answered for {cv_url}");
        Verdict::from_value(value)
    }
}
