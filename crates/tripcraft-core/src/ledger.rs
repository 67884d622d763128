//! Expense ledger
//!
//! The append/update/delete log of actual expenses for a plan. Entries live
//! in the external store; this module owns local validation (bad input never
//! reaches the network), the pure category aggregation, and the pending
//! expense that the auto-categorizer and voice flows merge into.

use serde::{Deserialize, Serialize};

use crate::ai::ExpenseClassification;
use crate::error::{Error, Result};
use crate::models::{CategorySummary, ExpenseEntry, NewExpense};
use crate::store::StoreClient;

/// Expense ledger for a plan, backed by the external store
#[derive(Clone)]
pub struct ExpenseLedger {
    store: StoreClient,
}

/// A plan's expense items with their derived category summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub items: Vec<ExpenseEntry>,
    pub summary: CategorySummary,
    pub total: f64,
}

impl ExpenseLedger {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    /// Record a new expense
    ///
    /// Validation failures are local and never contact the store.
    pub async fn add(&self, expense: NewExpense) -> Result<ExpenseEntry> {
        validate_expense(&expense.category, expense.amount)?;
        self.store.insert_expense(&expense).await
    }

    /// Update an existing expense by id
    ///
    /// Fails with NotFound when the id does not correspond to an entry.
    pub async fn update(&self, id: i64, expense: NewExpense) -> Result<ExpenseEntry> {
        validate_expense(&expense.category, expense.amount)?;
        self.store.update_expense(id, &expense).await
    }

    /// Remove an expense by id; the store's NotFound on an unknown id is
    /// surfaced, not swallowed
    pub async fn remove(&self, id: i64) -> Result<()> {
        self.store.delete_expense(id).await
    }

    /// Fetch a plan's expenses and aggregate them by category
    ///
    /// Pure aggregation over the currently-known entries: an empty ledger
    /// summarizes to zero categories and total 0, never null.
    pub async fn summarize(&self, plan_id: &str) -> Result<LedgerSummary> {
        let items = self.store.list_expenses(plan_id).await?;
        let (summary, total) = summarize_entries(&items);
        Ok(LedgerSummary {
            items,
            summary,
            total,
        })
    }
}

/// Validate expense input before any network call
pub fn validate_expense(category: &str, amount: f64) -> Result<()> {
    if category.trim().is_empty() {
        return Err(Error::Validation("expense category must not be empty".to_string()));
    }
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::Validation(
            "expense amount must be a positive number".to_string(),
        ));
    }
    Ok(())
}

/// Aggregate entries into a first-seen-ordered category summary and total
pub fn summarize_entries(entries: &[ExpenseEntry]) -> (CategorySummary, f64) {
    let mut summary = CategorySummary::new();
    let mut total = 0.0;
    for entry in entries {
        summary.add(&entry.category, entry.amount);
        total += entry.amount;
    }
    (summary, total)
}

/// A voice-expense result from the speech pipeline
///
/// Already persisted by the time the client sees it; it is merged into
/// visible state for display and must never be re-submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceExpense {
    pub category: String,
    pub amount: f64,
    pub text: String,
}

/// Uncommitted expense input being assembled by the user
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingExpense {
    pub category: String,
    pub amount: Option<f64>,
    pub description: String,
}

impl PendingExpense {
    /// Merge an on-demand classification result
    ///
    /// Both category and amount are overwritten: a classification the user
    /// explicitly requested is authoritative over whatever was typed.
    pub fn apply_classification(&mut self, classification: &ExpenseClassification) {
        self.category = classification.category.clone();
        self.amount = Some(classification.amount);
    }

    /// Merge an already-committed voice result for display
    ///
    /// Fields missing from the voice result keep their current values. No
    /// store write happens here: the voice pipeline persisted the entry.
    pub fn apply_voice_result(&mut self, voice: &VoiceExpense) {
        if !voice.category.is_empty() {
            self.category = voice.category.clone();
        }
        if voice.amount > 0.0 {
            self.amount = Some(voice.amount);
        }
        if !voice.text.is_empty() {
            self.description = voice.text.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(category: &str, amount: f64) -> ExpenseEntry {
        ExpenseEntry {
            id: 0,
            plan_id: "p1".to_string(),
            username: "meng".to_string(),
            category: category.to_string(),
            amount,
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(
            validate_expense("", 10.0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_expense("  ", 10.0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_expense("交通", 0.0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_expense("交通", -5.0),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_expense("交通", f64::NAN),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            validate_expense("交通", f64::INFINITY),
            Err(Error::Validation(_))
        ));
        assert!(validate_expense("交通", 100.0).is_ok());
    }

    #[test]
    fn test_summarize_empty_ledger() {
        let (summary, total) = summarize_entries(&[]);
        assert!(summary.is_empty());
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_summarize_accumulates_by_category() {
        let entries = vec![entry("交通", 100.0), entry("交通", 50.0), entry("餐饮", 30.0)];
        let (summary, total) = summarize_entries(&entries);
        assert_eq!(summary.get("交通"), Some(150.0));
        assert_eq!(summary.get("餐饮"), Some(30.0));
        assert_eq!(summary.len(), 2);
        assert_eq!(total, 180.0);
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let entries = vec![entry("交通", 100.0), entry("购物", 20.0)];
        let first = summarize_entries(&entries);
        let second = summarize_entries(&entries);
        assert_eq!(first, second);
    }

    #[test]
    fn test_classification_overwrites_pending() {
        let mut pending = PendingExpense {
            category: "其他".to_string(),
            amount: Some(1.0),
            description: "在某某餐厅用餐".to_string(),
        };
        pending.apply_classification(&ExpenseClassification {
            category: "餐饮".to_string(),
            amount: 350.0,
        });
        assert_eq!(pending.category, "餐饮");
        assert_eq!(pending.amount, Some(350.0));
        assert_eq!(pending.description, "在某某餐厅用餐");
    }

    #[test]
    fn test_voice_result_merges_without_clobbering() {
        let mut pending = PendingExpense {
            category: "交通".to_string(),
            amount: Some(80.0),
            description: String::new(),
        };
        pending.apply_voice_result(&VoiceExpense {
            category: String::new(),
            amount: 0.0,
            text: "打车去机场".to_string(),
        });
        assert_eq!(pending.category, "交通");
        assert_eq!(pending.amount, Some(80.0));
        assert_eq!(pending.description, "打车去机场");

        pending.apply_voice_result(&VoiceExpense {
            category: "餐饮".to_string(),
            amount: 350.0,
            text: "吃饭花了350块".to_string(),
        });
        assert_eq!(pending.category, "餐饮");
        assert_eq!(pending.amount, Some(350.0));
    }
}
