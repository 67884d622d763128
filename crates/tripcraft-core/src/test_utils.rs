//! Test utilities for tripcraft-core
//!
//! This module provides testing infrastructure: a mock plan/expense store,
//! a mock generation service, and a mock transcription service, all usable
//! for development and integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

// ============================================================================
// Mock store server
// ============================================================================

#[derive(Default)]
struct StoreState {
    plans: Vec<(String, Value)>,
    expenses: Vec<Value>,
    next_plan: u64,
    next_expense: i64,
}

/// In-memory mock of the plan/expense store REST API
pub struct MockStoreServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    state: Arc<Mutex<StoreState>>,
}

impl MockStoreServer {
    /// Start the mock store on an available port
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(StoreState::default()));

        let app = Router::new()
            .route("/plans", post(insert_plan).get(list_plans))
            .route("/plans/:id", get(get_plan))
            .route("/expenses", post(insert_expense).get(list_expenses))
            .route(
                "/expenses/:id",
                axum::routing::put(update_expense).delete(delete_expense),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            state,
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of expenses currently stored (for asserting write counts)
    pub fn expense_count(&self) -> usize {
        self.state.lock().unwrap().expenses.len()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockStoreServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": message })),
    )
        .into_response()
}

async fn insert_plan(
    State(state): State<Arc<Mutex<StoreState>>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.next_plan += 1;
    let id = format!("plan-{}", state.next_plan);
    let mut record = body;
    record["id"] = json!(id);
    record["created_at"] = json!(chrono::Utc::now());
    state.plans.push((id.clone(), record));
    Json(json!({ "id": id }))
}

async fn list_plans(
    State(state): State<Arc<Mutex<StoreState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let state = state.lock().unwrap();
    let username = params.get("username").cloned().unwrap_or_default();
    let mut summaries: Vec<Value> = state
        .plans
        .iter()
        .filter(|(_, p)| p["username"] == json!(username))
        .map(|(id, p)| {
            json!({
                "id": id,
                "destination": p["destination"],
                "summary": p["summary"],
                "days": p["days"],
                "created_at": p["created_at"],
            })
        })
        .collect();
    summaries.reverse();
    Json(Value::Array(summaries))
}

async fn get_plan(
    State(state): State<Arc<Mutex<StoreState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.lock().unwrap();
    match state.plans.iter().find(|(plan_id, _)| *plan_id == id) {
        Some((_, plan)) => Json(plan.clone()).into_response(),
        None => not_found("plan not found"),
    }
}

#[derive(Deserialize)]
struct ExpenseBody {
    username: String,
    plan_id: String,
    category: String,
    amount: f64,
    #[serde(default)]
    description: Option<String>,
}

async fn insert_expense(
    State(state): State<Arc<Mutex<StoreState>>>,
    Json(body): Json<ExpenseBody>,
) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.next_expense += 1;
    let entry = json!({
        "id": state.next_expense,
        "username": body.username,
        "plan_id": body.plan_id,
        "category": body.category,
        "amount": body.amount,
        "description": body.description,
        "created_at": chrono::Utc::now(),
    });
    state.expenses.push(entry.clone());
    Json(entry)
}

async fn update_expense(
    State(state): State<Arc<Mutex<StoreState>>>,
    Path(id): Path<i64>,
    Json(body): Json<ExpenseBody>,
) -> Response {
    let mut state = state.lock().unwrap();
    match state
        .expenses
        .iter_mut()
        .find(|e| e["id"] == json!(id))
    {
        Some(entry) => {
            entry["username"] = json!(body.username);
            entry["plan_id"] = json!(body.plan_id);
            entry["category"] = json!(body.category);
            entry["amount"] = json!(body.amount);
            entry["description"] = json!(body.description);
            Json(entry.clone()).into_response()
        }
        None => not_found("expense not found"),
    }
}

async fn delete_expense(
    State(state): State<Arc<Mutex<StoreState>>>,
    Path(id): Path<i64>,
) -> Response {
    let mut state = state.lock().unwrap();
    let before = state.expenses.len();
    state.expenses.retain(|e| e["id"] != json!(id));
    if state.expenses.len() == before {
        not_found("expense not found")
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

async fn list_expenses(
    State(state): State<Arc<Mutex<StoreState>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let state = state.lock().unwrap();
    let plan_id = params.get("plan_id").cloned().unwrap_or_default();
    let entries: Vec<Value> = state
        .expenses
        .iter()
        .filter(|e| e["plan_id"] == json!(plan_id))
        .cloned()
        .collect();
    Json(Value::Array(entries))
}

// ============================================================================
// Mock generation server
// ============================================================================

/// Mock DashScope-shaped generation service
///
/// Answers the text-generation endpoint with a canned itinerary (wrapped in
/// markdown fences, to exercise the fence stripping in the parser) or a
/// canned expense classification, keyed off the prompt content.
pub struct MockAiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Clone, Copy)]
enum AiMode {
    Normal,
    /// Always answer with prose that contains no JSON object
    Malformed,
}

impl MockAiServer {
    /// Start the mock generation service on an available port
    pub async fn start() -> Self {
        Self::start_with(AiMode::Normal).await
    }

    /// Start a variant that always returns unparseable output
    pub async fn start_malformed() -> Self {
        Self::start_with(AiMode::Malformed).await
    }

    async fn start_with(mode: AiMode) -> Self {
        let app = Router::new()
            .route(
                "/api/v1/services/aigc/text-generation/generation",
                post(handle_generation),
            )
            .with_state(mode);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// Mock transcription server
// ============================================================================

/// Mock speech-to-text service
///
/// Always transcribes to a fixed expense sentence, which the mock
/// generation service classifies as 交通/200.
pub struct MockSpeechServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockSpeechServer {
    /// Start the mock transcription service on an available port
    pub async fn start() -> Self {
        let app = Router::new().route("/transcribe", post(handle_transcribe));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockSpeechServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_transcribe(body: axum::body::Bytes) -> Response {
    if body.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "empty audio" })),
        )
            .into_response();
    }
    Json(json!({ "success": true, "text": "我花了200元打车去机场" })).into_response()
}

#[derive(Deserialize)]
struct GenerationRequest {
    input: GenerationInput,
}

#[derive(Deserialize)]
struct GenerationInput {
    prompt: String,
}

async fn handle_generation(
    State(mode): State<AiMode>,
    Json(request): Json<GenerationRequest>,
) -> Json<Value> {
    let text = match mode {
        AiMode::Malformed => "抱歉，我无法生成行程。".to_string(),
        AiMode::Normal if request.input.prompt.contains("理财助手") => {
            r#"{"category": "交通", "amount": 200}"#.to_string()
        }
        AiMode::Normal => format!("```json\n{}\n```", canned_plan_json()),
    };
    Json(json!({ "output": { "text": text } }))
}

fn canned_plan_json() -> Value {
    json!({
        "destination": "东京",
        "days": 2,
        "summary": "都市美食观光之旅",
        "plan": {
            "day_1": [
                {"type": "交通", "name": "成田机场 → 新宿酒店", "time": "08:00-09:30", "estimated_cost": 3000, "location": {"lat": 35.7719, "lng": 140.3929}},
                {"type": "景点", "name": "浅草寺", "time": "10:00-11:30", "estimated_cost": 0, "location": {"lat": 35.7148, "lng": 139.7967}},
                {"type": "餐饮", "name": "一兰拉面新宿店", "time": "12:00-13:00", "estimated_cost": 1500, "location": {"lat": 35.6920, "lng": 139.7006}},
                {"type": "住宿", "name": "东京希尔顿酒店", "time": "20:00", "estimated_cost": 15000, "location": {"lat": 35.6940, "lng": 139.6920}}
            ],
            "day_2": [
                {"type": "景点", "name": "明治神宫", "estimated_cost": 0, "location": {"lat": 35.6764, "lng": 139.6993}},
                {"type": "交通", "name": "酒店 → 成田机场", "estimated_cost": 3000, "location": {"lat": 35.7719, "lng": 140.3929}}
            ]
        },
        "daily_budget": [
            {"day": 1, "estimated_total": 19500},
            {"day": 2, "estimated_total": 3000}
        ],
        "budget": {"currency": "JPY", "total": 22500, "transport": 6000, "hotel": 15000, "food": 1500},
        "personalized_tips": ["推荐购买东京地铁一日通票节省出行费用。"]
    })
}
