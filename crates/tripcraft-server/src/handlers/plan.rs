//! Plan generation and retrieval handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{AppError, AppState};
use tripcraft_core::ai::AIBackend;
use tripcraft_core::models::PlanSummary;
use tripcraft_core::Error as CoreError;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub user: Option<String>,
}

/// Envelope for plan generation results
///
/// `raw_data` is present exactly when the generation service answered but
/// its output could not be parsed, so clients can show a more specific
/// message than a plain failure.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<String>,
}

impl GenerateResponse {
    fn failure(error: String, raw_data: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            plan_id: None,
            error: Some(error),
            raw_data,
        }
    }
}

/// POST /api/plan/generate - Generate an itinerary and save it
pub async fn generate_plan(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    if body.query.trim().is_empty() {
        return Err(AppError::bad_request("缺少 query 参数"));
    }
    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| AppError::service_unavailable("AI backend not configured"))?;
    let user = body.user.as_deref().unwrap_or("guest");

    let plan = match ai.generate_plan(&body.query).await {
        Ok(plan) => plan,
        Err(CoreError::MalformedPlan { message, raw }) => {
            warn!(error = %message, "generation output unparseable");
            return Ok(Json(GenerateResponse::failure(
                "AI output could not be parsed".to_string(),
                Some(raw),
            )));
        }
        Err(err) => {
            warn!(error = %err, "plan generation failed");
            return Ok(Json(GenerateResponse::failure(err.to_string(), None)));
        }
    };

    let plan_id = state.store.save_plan(user, &plan).await?;

    let mut data = serde_json::to_value(&plan).map_err(|e| {
        AppError::internal(&format!("failed to serialize generated plan: {}", e))
    })?;
    data["plan_id"] = Value::String(plan_id.clone());

    Ok(Json(GenerateResponse {
        success: true,
        data: Some(data),
        plan_id: Some(plan_id),
        error: None,
        raw_data: None,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    pub user: String,
}

#[derive(Debug, Serialize)]
pub struct ListPlansResponse {
    pub success: bool,
    pub data: Vec<PlanSummary>,
}

/// GET /api/plan/list?user= - List a user's saved plans
pub async fn list_plans(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPlansQuery>,
) -> Result<Json<ListPlansResponse>, AppError> {
    let plans = state.store.list_plans(&params.user).await?;
    Ok(Json(ListPlansResponse {
        success: true,
        data: plans,
    }))
}

#[derive(Debug, Serialize)]
pub struct PlanDetailResponse {
    pub success: bool,
    pub data: tripcraft_core::models::PlanRecord,
}

/// GET /api/plan/:id - Fetch a saved plan
pub async fn get_plan_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PlanDetailResponse>, AppError> {
    let record = state.store.get_plan(&id).await?;
    Ok(Json(PlanDetailResponse {
        success: true,
        data: record,
    }))
}
