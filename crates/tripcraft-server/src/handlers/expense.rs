//! Auto-categorization and voice expense handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use tripcraft_core::ai::AIBackend;
use tripcraft_core::ledger::VoiceExpense;
use tripcraft_core::models::NewExpense;

#[derive(Debug, Deserialize)]
pub struct AutoCategorizeRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AutoCategorizeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/expense/auto-categorize - Classify a free-text description
///
/// Delegates to the generation AI; no retry and no local fallback. A
/// service failure passes the service's message through unchanged.
pub async fn auto_categorize(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AutoCategorizeRequest>,
) -> Result<Json<AutoCategorizeResponse>, AppError> {
    if body.text.trim().is_empty() {
        return Err(AppError::bad_request("缺少描述文本"));
    }
    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("AI backend not configured"))?;

    match ai.parse_expense(&body.text).await {
        Ok(parsed) => Ok(Json(AutoCategorizeResponse {
            success: true,
            category: Some(parsed.category),
            amount: Some(parsed.amount),
            error: None,
        })),
        Err(err) => {
            warn!(error = %err, "expense classification failed");
            Ok(Json(AutoCategorizeResponse {
                success: false,
                category: None,
                amount: None,
                error: Some(err.to_string()),
            }))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceAddResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<VoiceExpense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/expense/voice-add - Record an expense from an audio clip
///
/// Transcribes the audio, classifies the transcript, and persists the
/// entry. The response is already committed: clients merge it into visible
/// state for display and must not re-submit it.
pub async fn voice_add_expense(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<VoiceAddResponse>, AppError> {
    let speech = state
        .speech
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("Transcription service not configured"))?;
    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("AI backend not configured"))?;

    let mut username = String::from("guest");
    let mut plan_id = None;
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::bad_request("Invalid multipart body"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("username") => {
                username = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Invalid username field"))?;
            }
            Some("plan_id") => {
                plan_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| AppError::bad_request("Invalid plan_id field"))?,
                );
            }
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Invalid audio upload"))?;
                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request("Audio upload too large"));
                }
                audio = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let plan_id = plan_id.ok_or_else(|| AppError::bad_request("缺少 plan_id 参数"))?;
    let audio = audio.ok_or_else(|| AppError::bad_request("上传的文件为空"))?;

    let text = match speech.transcribe(audio).await {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "voice transcription failed");
            return Ok(Json(VoiceAddResponse {
                success: false,
                data: None,
                error: Some(err.to_string()),
            }));
        }
    };

    let parsed = match ai.parse_expense(&text).await {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, transcript = %text, "voice expense classification failed");
            return Ok(Json(VoiceAddResponse {
                success: false,
                data: None,
                error: Some("无法识别支出结构".to_string()),
            }));
        }
    };

    state
        .ledger
        .add(NewExpense {
            username,
            plan_id,
            category: parsed.category.clone(),
            amount: parsed.amount,
            description: Some(text.clone()),
        })
        .await?;

    Ok(Json(VoiceAddResponse {
        success: true,
        data: Some(VoiceExpense {
            category: parsed.category,
            amount: parsed.amount,
            text,
        }),
        error: None,
    }))
}
