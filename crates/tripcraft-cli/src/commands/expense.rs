//! Ledger command implementations

use anyhow::Result;

use tripcraft_core::ai::AIBackend;
use tripcraft_core::ledger::ExpenseLedger;
use tripcraft_core::models::NewExpense;

use super::{open_ai, open_store};

/// Record an expense against a plan
pub async fn cmd_expense_add(
    user: &str,
    plan_id: &str,
    category: &str,
    amount: f64,
    description: Option<String>,
) -> Result<()> {
    let ledger = ExpenseLedger::new(open_store()?);
    let entry = ledger
        .add(NewExpense {
            username: user.to_string(),
            plan_id: plan_id.to_string(),
            category: category.to_string(),
            amount,
            description,
        })
        .await?;

    println!("✅ Recorded expense {} — {} {:.2}", entry.id, entry.category, entry.amount);
    Ok(())
}

/// Update an expense by id
pub async fn cmd_expense_update(
    user: &str,
    id: i64,
    plan_id: &str,
    category: &str,
    amount: f64,
    description: Option<String>,
) -> Result<()> {
    let ledger = ExpenseLedger::new(open_store()?);
    let entry = ledger
        .update(
            id,
            NewExpense {
                username: user.to_string(),
                plan_id: plan_id.to_string(),
                category: category.to_string(),
                amount,
                description,
            },
        )
        .await?;

    println!("✅ Updated expense {} — {} {:.2}", entry.id, entry.category, entry.amount);
    Ok(())
}

/// Remove an expense by id
pub async fn cmd_expense_remove(id: i64) -> Result<()> {
    let ledger = ExpenseLedger::new(open_store()?);
    ledger.remove(id).await?;
    println!("🗑️  Removed expense {}", id);
    Ok(())
}

/// List a plan's expenses
pub async fn cmd_expense_list(plan_id: &str) -> Result<()> {
    let ledger = ExpenseLedger::new(open_store()?);
    let summary = ledger.summarize(plan_id).await?;

    if summary.items.is_empty() {
        println!("No expenses recorded for {}", plan_id);
        return Ok(());
    }

    println!("{:<6} {:<8} {:>10}  {:<19} {}", "ID", "CATEGORY", "AMOUNT", "CREATED", "DESCRIPTION");
    for entry in &summary.items {
        println!(
            "{:<6} {:<8} {:>10.2}  {:<19} {}",
            entry.id,
            entry.category,
            entry.amount,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Show a plan's category summary and total
pub async fn cmd_expense_summary(plan_id: &str) -> Result<()> {
    let ledger = ExpenseLedger::new(open_store()?);
    let summary = ledger.summarize(plan_id).await?;

    for (category, sum) in summary.summary.iter() {
        println!("{:<8} {:>10.2}", category, sum);
    }
    println!("{:<8} {:>10.2}", "TOTAL", summary.total);
    Ok(())
}

/// Classify a free-text description into category and amount
pub async fn cmd_expense_classify(text: &str) -> Result<()> {
    let ai = open_ai()?;
    let parsed = ai.parse_expense(text).await?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
