//! Intent parsing handlers
//!
//! The form view round-trips through these: a transcript parses into form
//! fields, and a filled form renders back into the generation prompt.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use tripcraft_core::intent::render_query;
use tripcraft_core::models::TravelRequest;

#[derive(Debug, Deserialize)]
pub struct ParseIntentRequest {
    #[serde(default)]
    pub text: String,
}

/// POST /api/intent/parse - Extract a travel request from free text
pub async fn parse_intent(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ParseIntentRequest>,
) -> Json<TravelRequest> {
    Json(state.intent.parse(&body.text))
}

#[derive(Debug, Serialize)]
pub struct RenderIntentResponse {
    pub success: bool,
    pub query: String,
}

/// POST /api/intent/render - Render form fields into a generation prompt
///
/// An entirely empty request is a 400 ("nothing to submit"); partial input
/// renders fine.
pub async fn render_intent(
    Json(body): Json<TravelRequest>,
) -> Result<Json<RenderIntentResponse>, AppError> {
    let query = render_query(&body)?;
    Ok(Json(RenderIntentResponse {
        success: true,
        query,
    }))
}
