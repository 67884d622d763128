//! HTTP client for the external speech-to-text service
//!
//! Audio conversion and recognition run in a separate service; the core
//! only ships bytes over and takes the transcript back.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};

const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the transcription service
#[derive(Clone)]
pub struct SpeechClient {
    http_client: Client,
    base_url: String,
}

/// Response from the transcription service
#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    success: bool,
    #[serde(default)]
    text: String,
    #[serde(default)]
    error: Option<String>,
}

impl SpeechClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create from environment variables (SPEECH_SERVICE_URL)
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("SPEECH_SERVICE_URL").ok()?;
        Some(Self::new(&base_url))
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }

    /// Transcribe raw audio bytes into text
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String> {
        if audio.is_empty() {
            return Err(Error::Validation("上传的文件为空".to_string()));
        }

        let response = self
            .http_client
            .post(format!("{}/transcribe", self.base_url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .timeout(TRANSCRIBE_TIMEOUT)
            .body(audio)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Service(format!(
                "transcription service returned {}",
                status
            )));
        }

        let body: TranscribeResponse = response.json().await?;
        if !body.success {
            return Err(Error::Service(
                body.error
                    .unwrap_or_else(|| "transcription failed".to_string()),
            ));
        }
        Ok(body.text)
    }
}
