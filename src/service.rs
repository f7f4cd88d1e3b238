//! External service collaborators.
//!
//! The orchestrator only ever sees the narrow [`TranslationService`]
//! trait; [`HttpTranslator`] is the production implementation speaking a
//! small JSON envelope. [`CaptionService`] is the image-captioning
//! collaborator whose output the caller merges into the source resource.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::resource::PropertyMap;
use crate::retry::{with_retry_if, RetryConfig};

/// Narrow contract the orchestrator calls. Languages travel as display
/// names ("German (Austria)"), matching what the service expects.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate(
        &self,
        content: &PropertyMap,
        source_language: &str,
        target_language: &str,
    ) -> Result<PropertyMap>;
}

/// Image-captioning collaborator: produces key-value caption entries for
/// merging into a source resource via `include`.
#[async_trait]
pub trait CaptionService: Send + Sync {
    async fn caption_images(&self, images: &[PathBuf]) -> Result<Vec<(String, String)>>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    source_language: &'a str,
    target_language: &'a str,
    entries: Vec<EntryDto>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryDto {
    key: String,
    text: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    entries: Vec<EntryDto>,
}

/// HTTP translation client with bearer auth and retry on transient errors.
pub struct HttpTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    retry: RetryConfig,
}

impl HttpTranslator {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.translator_api_url.clone(),
            api_key: config.translator_api_key.clone(),
            retry: RetryConfig::service_call(),
        })
    }

    #[cfg(test)]
    fn with_fast_retry(mut self) -> Self {
        self.retry = RetryConfig::new(3, Duration::from_millis(1));
        self
    }

    async fn send_request(&self, request: &TranslateRequest<'_>) -> Result<TranslateResponse> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .context("failed to send request to translation service")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            anyhow::bail!("translation service error ({}): {}", status, body);
        }

        response
            .json()
            .await
            .context("failed to parse translation service response")
    }
}

#[async_trait]
impl TranslationService for HttpTranslator {
    async fn translate(
        &self,
        content: &PropertyMap,
        source_language: &str,
        target_language: &str,
    ) -> Result<PropertyMap> {
        let request = TranslateRequest {
            source_language,
            target_language,
            entries: content
                .iter()
                .map(|(key, text)| EntryDto {
                    key: key.to_string(),
                    text: text.to_string(),
                })
                .collect(),
        };

        let response = with_retry_if(
            &self.retry,
            &format!("Translation to {}", target_language),
            || self.send_request(&request),
            is_retryable_error,
        )
        .await?;

        // The service may reorder entries; restore the request order.
        let mut translated: HashMap<String, String> = response
            .entries
            .into_iter()
            .map(|e| (e.key, e.text))
            .collect();

        let mut result = PropertyMap::new();
        for (key, _) in content.iter() {
            if let Some(text) = translated.remove(key) {
                result.insert(key, &text);
            }
        }
        Ok(result)
    }
}

/// Determine if an error is retryable (5xx errors, 429 rate limit, network
/// errors). Other 4xx client errors should not be retried.
fn is_retryable_error(error: &anyhow::Error) -> bool {
    let error_str = error.to_string();

    // Error format: "translation service error (400 Bad Request): ..."
    if error_str.contains("translation service error") {
        if let Some(start) = error_str.find('(') {
            if let Some(end) = error_str[start..].find(')') {
                let status_str = &error_str[start + 1..start + end];
                let status_num = status_str.split_whitespace().next().unwrap_or("");
                if let Ok(status) = status_num.parse::<u16>() {
                    return status == 429 || status >= 500;
                }
            }
        }
    }

    // Network errors, timeouts, and other transient failures
    true
}

/// Whether a failed translation attempt ran out of service quota.
pub fn is_quota_error(error: &anyhow::Error) -> bool {
    error.to_string().contains("(429")
}
