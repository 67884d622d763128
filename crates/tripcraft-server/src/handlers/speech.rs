//! Speech transcription handler

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;
use tracing::warn;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/speech/transcribe - Transcribe an audio clip to text
pub async fn transcribe(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TranscribeResponse>, AppError> {
    let speech = state
        .speech
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("Transcription service not configured"))?;

    if body.is_empty() {
        return Err(AppError::bad_request("上传的文件为空"));
    }
    if body.len() > MAX_UPLOAD_SIZE {
        return Err(AppError::bad_request("Audio upload too large"));
    }

    match speech.transcribe(body.to_vec()).await {
        Ok(text) => Ok(Json(TranscribeResponse {
            success: true,
            text: Some(text),
            error: None,
        })),
        Err(err) => {
            warn!(error = %err, "transcription failed");
            Ok(Json(TranscribeResponse {
                success: false,
                text: None,
                error: Some(err.to_string()),
            }))
        }
    }
}
