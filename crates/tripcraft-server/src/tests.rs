//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use tripcraft_core::test_utils::{MockAiServer, MockSpeechServer, MockStoreServer};

struct TestEnv {
    app: Router,
    store: MockStoreServer,
    _ai: MockAiServer,
    _speech: MockSpeechServer,
}

async fn setup_test_env() -> TestEnv {
    let store = MockStoreServer::start().await;
    let ai = MockAiServer::start().await;
    let speech = MockSpeechServer::start().await;

    let app = create_router(
        StoreClient::new(&store.url()),
        Some(AIClient::dashscope(&ai.url(), "test-key", "qwen-plus")),
        Some(SpeechClient::new(&speech.url())),
        None,
        ServerConfig::default(),
    )
    .unwrap();

    TestEnv {
        app,
        store,
        _ai: ai,
        _speech: speech,
    }
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn generate_plan(env: &TestEnv) -> String {
    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/plan/generate",
            serde_json::json!({"query": "去东京玩2天，预算8000元", "user": "meng"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    json["plan_id"].as_str().unwrap().to_string()
}

// ========== Plan API Tests ==========

#[tokio::test]
async fn test_generate_saves_and_returns_plan() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/plan/generate",
            serde_json::json!({"query": "去东京玩2天", "user": "meng"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["destination"], "东京");
    assert_eq!(json["data"]["plan_id"], json["plan_id"]);
    assert!(json["data"]["plan"]["day_1"].is_array());
}

#[tokio::test]
async fn test_generate_requires_query() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/plan/generate",
            serde_json::json!({"query": "  "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_malformed_output_carries_raw_data() {
    let store = MockStoreServer::start().await;
    let ai = MockAiServer::start_malformed().await;
    let app = create_router(
        StoreClient::new(&store.url()),
        Some(AIClient::dashscope(&ai.url(), "test-key", "qwen-plus")),
        None,
        None,
        ServerConfig::default(),
    )
    .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/plan/generate",
            serde_json::json!({"query": "去东京"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "AI output could not be parsed");
    assert!(json["raw_data"].is_string());
}

#[tokio::test]
async fn test_list_and_detail() {
    let env = setup_test_env().await;
    let plan_id = generate_plan(&env).await;

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/plan/list?user=meng")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], plan_id.as_str());

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/plan/{}", plan_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["data"]["destination"], "东京");
    assert_eq!(json["data"]["username"], "meng");
}

#[tokio::test]
async fn test_unknown_plan_is_404() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/plan/no-such-plan")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ========== Ledger API Tests ==========

#[tokio::test]
async fn test_expense_crud_and_summary() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/budget/add",
            serde_json::json!({"user": "meng", "plan_id": "p1", "category": "交通", "amount": 100.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    let id = json["data"]["id"].as_i64().unwrap();

    for (category, amount) in [("交通", 50.0), ("餐饮", 30.0)] {
        let response = env
            .app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/budget/add",
                serde_json::json!({"username": "meng", "plan_id": "p1", "category": category, "amount": amount}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/budget/summary/p1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
    assert_eq!(json["summary"]["交通"], 150.0);
    assert_eq!(json["summary"]["餐饮"], 30.0);
    assert_eq!(json["total"], 180.0);

    // Update the first entry
    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/budget/{}", id),
            serde_json::json!({"user": "meng", "plan_id": "p1", "category": "购物", "amount": 80.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Delete it, then the id is gone
    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/budget/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/budget/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expense_validation_is_local_400() {
    let env = setup_test_env().await;

    for body in [
        serde_json::json!({"plan_id": "p1", "category": "交通", "amount": 0.0}),
        serde_json::json!({"plan_id": "p1", "category": "交通", "amount": -5.0}),
        serde_json::json!({"plan_id": "p1", "category": "", "amount": 10.0}),
    ] {
        let response = env
            .app
            .clone()
            .oneshot(json_request("POST", "/api/budget/add", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // Nothing reached the store
    assert_eq!(env.store.expense_count(), 0);
}

#[tokio::test]
async fn test_reconcile_endpoint() {
    let env = setup_test_env().await;
    let plan_id = generate_plan(&env).await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/budget/add",
            serde_json::json!({"user": "meng", "plan_id": plan_id, "category": "交通", "amount": 5500.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/budget/reconcile/{}", plan_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["total_estimated"], 22500.0);
    assert_eq!(json["data"]["total_actual"], 5500.0);
    assert_eq!(json["data"]["per_category"][0]["category"], "交通");
    assert_eq!(json["data"]["per_category"][0]["estimated"], 6000.0);
    assert_eq!(json["data"]["per_category"][0]["actual"], 5500.0);
}

// ========== Auto-Categorization Tests ==========

#[tokio::test]
async fn test_auto_categorize() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/expense/auto-categorize",
            serde_json::json!({"text": "我花了200元打车去机场"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["category"], "交通");
    assert_eq!(json["amount"], 200.0);
}

#[tokio::test]
async fn test_auto_categorize_requires_text() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/expense/auto-categorize",
            serde_json::json!({"text": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Voice Expense Tests ==========

#[tokio::test]
async fn test_voice_add_persists_and_returns_committed_data() {
    let env = setup_test_env().await;

    let boundary = "X-TRIPCRAFT-TEST-BOUNDARY";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"username\"\r\n\r\nmeng\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"plan_id\"\r\n\r\np1\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"clip.wav\"\r\n\
         Content-Type: audio/wav\r\n\r\nRIFFfakeaudio\r\n--{b}--\r\n",
        b = boundary
    );

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/expense/voice-add")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["category"], "交通");
    assert_eq!(json["data"]["amount"], 200.0);
    assert_eq!(json["data"]["text"], "我花了200元打车去机场");

    // The entry was persisted server-side exactly once
    assert_eq!(env.store.expense_count(), 1);
}

// ========== Speech Tests ==========

#[tokio::test]
async fn test_transcribe() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/speech/transcribe")
                .header("content-type", "application/octet-stream")
                .body(Body::from("RIFFfakeaudio"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["text"], "我花了200元打车去机场");
}

#[tokio::test]
async fn test_transcribe_rejects_empty_body() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/speech/transcribe")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Intent Tests ==========

#[tokio::test]
async fn test_parse_intent() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/intent/parse",
            serde_json::json!({"text": "去东京玩5天预算8000喜欢美食"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["destination"], "东京");
    assert_eq!(json["days"], 5);
    assert_eq!(json["budget"], 8000.0);
    assert_eq!(json["preferences"][0], "美食");
}

#[tokio::test]
async fn test_render_intent() {
    let env = setup_test_env().await;

    let response = env
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/intent/render",
            serde_json::json!({"destination": "东京", "days": 5, "budget": 8000.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["query"], "去东京，玩5天，预算8000元");

    // Empty form has nothing to submit
    let response = env
        .app
        .clone()
        .oneshot(json_request("POST", "/api/intent/render", serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
