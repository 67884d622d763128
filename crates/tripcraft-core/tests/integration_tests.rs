//! Integration tests for tripcraft-core
//!
//! These tests exercise the full generate → save → record-expense →
//! reconcile workflow against the mock generation and store servers.

use tripcraft_core::ai::{AIBackend, AIClient};
use tripcraft_core::ledger::ExpenseLedger;
use tripcraft_core::models::NewExpense;
use tripcraft_core::reconcile::reconcile;
use tripcraft_core::schedule::organize_plan;
use tripcraft_core::store::StoreClient;
use tripcraft_core::test_utils::{MockAiServer, MockStoreServer};
use tripcraft_core::Error;

fn new_expense(plan_id: &str, category: &str, amount: f64) -> NewExpense {
    NewExpense {
        username: "meng".to_string(),
        plan_id: plan_id.to_string(),
        category: category.to_string(),
        amount,
        description: None,
    }
}

// =============================================================================
// Generation Client Integration Tests
// =============================================================================

#[tokio::test]
async fn test_generate_plan_against_mock_service() {
    let server = MockAiServer::start().await;
    let client = AIClient::dashscope(&server.url(), "test-key", "qwen-plus");

    let plan = client.generate_plan("去东京玩2天，预算8000元").await.unwrap();

    assert_eq!(plan.destination, "东京");
    assert_eq!(plan.days, 2);
    assert_eq!(plan.plan.len(), 2);
    assert_eq!(plan.plan.first_day_key(), Some("day_1"));
    assert_eq!(plan.daily_budget.len(), 2);
    assert_eq!(plan.budget.total, 22500.0);

    // The mock wraps its payload in markdown fences; arriving here means
    // fence stripping worked end to end
    let day_1 = plan.plan.get("day_1").unwrap();
    assert!(day_1[0].kind.is_transport());
}

#[tokio::test]
async fn test_generate_plan_malformed_output() {
    let server = MockAiServer::start_malformed().await;
    let client = AIClient::dashscope(&server.url(), "test-key", "qwen-plus");

    match client.generate_plan("去东京").await {
        Err(Error::MalformedPlan { raw, .. }) => assert!(!raw.is_empty()),
        other => panic!("expected MalformedPlan, got {:?}", other.map(|p| p.destination)),
    }
}

#[tokio::test]
async fn test_expense_classification_against_mock_service() {
    let server = MockAiServer::start().await;
    let client = AIClient::dashscope(&server.url(), "test-key", "qwen-plus");

    let result = client.parse_expense("我花了200元打车去机场").await.unwrap();
    assert_eq!(result.category, "交通");
    assert_eq!(result.amount, 200.0);
}

// =============================================================================
// Store Client Integration Tests
// =============================================================================

#[tokio::test]
async fn test_plan_save_list_get_roundtrip() {
    let store_server = MockStoreServer::start().await;
    let ai_server = MockAiServer::start().await;
    let store = StoreClient::new(&store_server.url());
    let ai = AIClient::dashscope(&ai_server.url(), "test-key", "qwen-plus");

    let plan = ai.generate_plan("去东京玩2天").await.unwrap();
    let id = store.save_plan("meng", &plan).await.unwrap();

    let listed = store.list_plans("meng").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].destination, "东京");
    assert_eq!(listed[0].days, 2);

    // Listing is scoped to the user
    assert!(store.list_plans("stranger").await.unwrap().is_empty());

    let record = store.get_plan(&id).await.unwrap();
    assert_eq!(record.username, "meng");
    assert_eq!(record.plan.destination, "东京");
    assert_eq!(record.plan.plan.len(), 2);
    assert_eq!(record.plan.budget.total, 22500.0);
}

#[tokio::test]
async fn test_get_unknown_plan_is_not_found() {
    let store_server = MockStoreServer::start().await;
    let store = StoreClient::new(&store_server.url());

    assert!(matches!(
        store.get_plan("no-such-plan").await,
        Err(Error::NotFound(_))
    ));
}

// =============================================================================
// Ledger Integration Tests
// =============================================================================

#[tokio::test]
async fn test_ledger_crud_and_summary() {
    let store_server = MockStoreServer::start().await;
    let ledger = ExpenseLedger::new(StoreClient::new(&store_server.url()));

    let first = ledger.add(new_expense("p1", "交通", 100.0)).await.unwrap();
    ledger.add(new_expense("p1", "交通", 50.0)).await.unwrap();
    ledger.add(new_expense("p1", "餐饮", 30.0)).await.unwrap();

    let summary = ledger.summarize("p1").await.unwrap();
    assert_eq!(summary.items.len(), 3);
    assert_eq!(summary.summary.get("交通"), Some(150.0));
    assert_eq!(summary.summary.get("餐饮"), Some(30.0));
    assert_eq!(summary.total, 180.0);

    // Update replaces category and amount
    let mut updated = new_expense("p1", "购物", 80.0);
    updated.description = Some("纪念品".to_string());
    let entry = ledger.update(first.id, updated).await.unwrap();
    assert_eq!(entry.category, "购物");

    let summary = ledger.summarize("p1").await.unwrap();
    assert_eq!(summary.summary.get("交通"), Some(50.0));
    assert_eq!(summary.summary.get("购物"), Some(80.0));
    assert_eq!(summary.total, 160.0);

    // Remove, then the store reports the id unknown
    ledger.remove(first.id).await.unwrap();
    assert!(matches!(
        ledger.remove(first.id).await,
        Err(Error::NotFound(_))
    ));

    let summary = ledger.summarize("p1").await.unwrap();
    assert_eq!(summary.total, 80.0);
}

#[tokio::test]
async fn test_ledger_validation_never_reaches_store() {
    let store_server = MockStoreServer::start().await;
    let ledger = ExpenseLedger::new(StoreClient::new(&store_server.url()));

    assert!(matches!(
        ledger.add(new_expense("p1", "交通", 0.0)).await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        ledger.add(new_expense("p1", "交通", -5.0)).await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        ledger.add(new_expense("p1", "", 10.0)).await,
        Err(Error::Validation(_))
    ));

    assert_eq!(store_server.expense_count(), 0);
}

#[tokio::test]
async fn test_update_unknown_expense_is_not_found() {
    let store_server = MockStoreServer::start().await;
    let ledger = ExpenseLedger::new(StoreClient::new(&store_server.url()));

    assert!(matches!(
        ledger.update(999, new_expense("p1", "交通", 10.0)).await,
        Err(Error::NotFound(_))
    ));
}

// =============================================================================
// Full Workflow
// =============================================================================

#[tokio::test]
async fn test_generate_record_reconcile_workflow() {
    let store_server = MockStoreServer::start().await;
    let ai_server = MockAiServer::start().await;
    let store = StoreClient::new(&store_server.url());
    let ai = AIClient::dashscope(&ai_server.url(), "test-key", "qwen-plus");
    let ledger = ExpenseLedger::new(store.clone());

    // Generate and save
    let plan = ai.generate_plan("去东京玩2天，预算8000元").await.unwrap();
    let plan_id = store.save_plan("meng", &plan).await.unwrap();

    // The presentation form nests transport under the following activity
    let organized = organize_plan(&plan.plan);
    let day_1 = organized.get("day_1").unwrap();
    assert_eq!(day_1.len(), 3);
    assert!(day_1[0].transport.is_some());

    // Record actual spend
    ledger.add(new_expense(&plan_id, "交通", 5500.0)).await.unwrap();
    ledger.add(new_expense(&plan_id, "餐饮", 1200.0)).await.unwrap();
    ledger.add(new_expense(&plan_id, "小费", 300.0)).await.unwrap();

    // Reconcile estimate against actuals
    let summary = ledger.summarize(&plan_id).await.unwrap();
    let record = store.get_plan(&plan_id).await.unwrap();
    let comparison = reconcile(&record.plan.budget, &summary.summary);

    assert_eq!(comparison.total_estimated, 22500.0);
    assert_eq!(comparison.total_actual, 7000.0);

    let names: Vec<&str> = comparison
        .per_category
        .iter()
        .map(|c| c.category.as_str())
        .collect();
    assert_eq!(names, vec!["交通", "住宿", "餐饮", "小费"]);
    assert_eq!(comparison.per_category[0].estimated, 6000.0);
    assert_eq!(comparison.per_category[0].actual, 5500.0);
    assert_eq!(comparison.per_category[1].actual, 0.0);
    assert_eq!(comparison.per_category[3].estimated, 0.0);
    assert_eq!(comparison.per_category[3].actual, 300.0);
}
