//! Tripcraft Web Server
//!
//! Axum-based REST API for the Tripcraft trip planner. Exposes plan
//! generation, plan listing/detail, the expense ledger, auto-categorization,
//! voice expenses, speech transcription, and intent parsing.
//!
//! Authentication and session storage live in the fronting proxy; this
//! server trusts the username carried in request bodies and query strings
//! the way the original deployment does.

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use tripcraft_core::ai::{AIBackend, AIClient};
use tripcraft_core::intent::IntentParser;
use tripcraft_core::ledger::ExpenseLedger;
use tripcraft_core::speech::SpeechClient;
use tripcraft_core::store::StoreClient;
use tripcraft_core::Error as CoreError;

mod handlers;

/// Maximum voice upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub store: StoreClient,
    pub ledger: ExpenseLedger,
    pub ai: Option<AIClient>,
    pub speech: Option<SpeechClient>,
    pub intent: IntentParser,
}

/// Create the application router
pub fn create_router(
    store: StoreClient,
    ai: Option<AIClient>,
    speech: Option<SpeechClient>,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<Router> {
    match ai {
        Some(ref client) => {
            info!(
                "AI backend configured: {} (model: {})",
                client.host(),
                client.model()
            );
        }
        None => {
            info!("ℹ️  AI backend not configured (set DASHSCOPE_API_KEY to enable generation)");
        }
    }
    match speech {
        Some(ref client) => info!("Transcription service configured: {}", client.host()),
        None => {
            info!("ℹ️  Transcription service not configured (set SPEECH_SERVICE_URL to enable)")
        }
    }

    let state = Arc::new(AppState {
        ledger: ExpenseLedger::new(store.clone()),
        store,
        ai,
        speech,
        intent: IntentParser::new()?,
    });

    let api_routes = Router::new()
        // Plans
        .route("/plan/generate", post(handlers::generate_plan))
        .route("/plan/list", get(handlers::list_plans))
        .route("/plan/:id", get(handlers::get_plan_detail))
        // Expense ledger
        .route("/budget/add", post(handlers::add_expense))
        .route(
            "/budget/:id",
            put(handlers::update_expense).delete(handlers::delete_expense),
        )
        .route("/budget/summary/:plan_id", get(handlers::budget_summary))
        .route(
            "/budget/reconcile/:plan_id",
            get(handlers::reconcile_budget),
        )
        // Auto-categorization and voice expenses
        .route(
            "/expense/auto-categorize",
            post(handlers::auto_categorize),
        )
        .route("/expense/voice-add", post(handlers::voice_add_expense))
        // Speech
        .route("/speech/transcribe", post(handlers::transcribe))
        // Intent
        .route("/intent/parse", post(handlers::parse_intent))
        .route("/intent/render", post(handlers::render_intent))
        .with_state(state);

    let cors = if config.allowed_origins.is_empty() {
        CorsLayer::new()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([axum::http::header::CONTENT_TYPE])
    };

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    Ok(app)
}

/// Start the server on the given address
pub async fn serve(
    host: &str,
    port: u16,
    store: StoreClient,
    ai: Option<AIClient>,
    speech: Option<SpeechClient>,
    static_dir: Option<&str>,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let app = create_router(store, ai, speech, static_dir, config)?;

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Tripcraft server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "success": false,
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::bad_request(&msg),
            CoreError::NotFound(msg) => Self::not_found(&msg),
            CoreError::Service(msg) => Self {
                status: StatusCode::BAD_GATEWAY,
                message: msg,
                internal: None,
            },
            CoreError::MalformedPlan { message, .. } => Self {
                status: StatusCode::BAD_GATEWAY,
                message,
                internal: None,
            },
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client
                message: "An internal error occurred".to_string(),
                // Keep full error for logging
                internal: Some(other.into()),
            },
        }
    }
}

#[cfg(test)]
mod tests;
