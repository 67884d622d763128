//! Expense ledger handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use tripcraft_core::ledger::LedgerSummary;
use tripcraft_core::models::{ExpenseEntry, NewExpense};
use tripcraft_core::reconcile::{reconcile, BudgetComparison};

#[derive(Debug, Deserialize)]
pub struct ExpenseRequest {
    /// Some clients send `user`, others `username`
    #[serde(default, alias = "username")]
    pub user: Option<String>,
    pub plan_id: String,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl ExpenseRequest {
    fn into_new_expense(self) -> NewExpense {
        NewExpense {
            username: self.user.unwrap_or_else(|| "guest".to_string()),
            plan_id: self.plan_id,
            category: self.category,
            amount: self.amount,
            description: self.description.filter(|d| !d.trim().is_empty()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenseResponse {
    pub success: bool,
    pub data: ExpenseEntry,
}

/// POST /api/budget/add - Record an expense
pub async fn add_expense(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ExpenseRequest>,
) -> Result<Json<ExpenseResponse>, AppError> {
    let entry = state.ledger.add(body.into_new_expense()).await?;
    Ok(Json(ExpenseResponse {
        success: true,
        data: entry,
    }))
}

/// PUT /api/budget/:id - Update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<ExpenseRequest>,
) -> Result<Json<ExpenseResponse>, AppError> {
    let entry = state.ledger.update(id, body.into_new_expense()).await?;
    Ok(Json(ExpenseResponse {
        success: true,
        data: entry,
    }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// DELETE /api/budget/:id - Delete an expense
///
/// An unknown id is the store's NotFound, surfaced as 404 rather than
/// swallowed.
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    state.ledger.remove(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    #[serde(flatten)]
    pub ledger: LedgerSummary,
}

/// GET /api/budget/summary/:plan_id - Items plus category summary and total
pub async fn budget_summary(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let ledger = state.ledger.summarize(&plan_id).await?;
    Ok(Json(SummaryResponse {
        success: true,
        ledger,
    }))
}

#[derive(Debug, Serialize)]
pub struct ReconcileResponse {
    pub success: bool,
    pub data: BudgetComparison,
}

/// GET /api/budget/reconcile/:plan_id - AI estimate vs. actual spend
pub async fn reconcile_budget(
    State(state): State<Arc<AppState>>,
    Path(plan_id): Path<String>,
) -> Result<Json<ReconcileResponse>, AppError> {
    let record = state.store.get_plan(&plan_id).await?;
    let summary = state.ledger.summarize(&plan_id).await?;
    let comparison = reconcile(&record.plan.budget, &summary.summary);
    Ok(Json(ReconcileResponse {
        success: true,
        data: comparison,
    }))
}
