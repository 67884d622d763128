//! AI backend response types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::{Deserialize, Serialize};

/// Result of expense classification
///
/// The category is one of the closed ledger set when the model follows its
/// prompt; it is carried as a string because the external service, not this
/// core, owns the classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseClassification {
    /// Expense category (餐饮/交通/门票/住宿/购物/其他)
    pub category: String,
    /// Amount extracted from the description
    pub amount: f64,
}
