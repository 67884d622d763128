//! Plan command implementations

use anyhow::Result;

use tripcraft_core::ai::AIBackend;
use tripcraft_core::ledger::ExpenseLedger;
use tripcraft_core::models::{ItineraryPlan, TransportLeg};
use tripcraft_core::reconcile::reconcile;
use tripcraft_core::schedule::organize_plan;

use super::{open_ai, open_store};

/// Generate an itinerary from a travel request and save it
pub async fn cmd_plan_generate(user: &str, query: &str) -> Result<()> {
    let ai = open_ai()?;
    let store = open_store()?;

    println!("🧠 Generating itinerary for: {}", query);
    let plan = ai.generate_plan(query).await?;
    let plan_id = store.save_plan(user, &plan).await?;

    println!("✅ Saved plan {} — {} ({}天)", plan_id, plan.destination, plan.days);
    print_plan(&plan);
    Ok(())
}

/// List saved plans
pub async fn cmd_plan_list(user: &str) -> Result<()> {
    let store = open_store()?;
    let plans = store.list_plans(user).await?;

    if plans.is_empty() {
        println!("No saved plans for {}", user);
        return Ok(());
    }

    println!("{:<12} {:<12} {:>5}  {}", "ID", "DESTINATION", "DAYS", "SUMMARY");
    for plan in plans {
        println!(
            "{:<12} {:<12} {:>5}  {}",
            plan.id, plan.destination, plan.days, plan.summary
        );
    }
    Ok(())
}

/// Show a saved plan
pub async fn cmd_plan_show(plan_id: &str, organized: bool) -> Result<()> {
    let store = open_store()?;
    let record = store.get_plan(plan_id).await?;

    let plan = if organized {
        ItineraryPlan {
            plan: organize_plan(&record.plan.plan),
            ..record.plan
        }
    } else {
        record.plan
    };

    println!("📍 {} ({}天) — {}", plan.destination, plan.days, plan.summary);
    print_plan(&plan);
    Ok(())
}

/// Compare a plan's AI budget estimate against actual spend
pub async fn cmd_reconcile(plan_id: &str) -> Result<()> {
    let store = open_store()?;
    let ledger = ExpenseLedger::new(store.clone());

    let record = store.get_plan(plan_id).await?;
    let summary = ledger.summarize(plan_id).await?;
    let comparison = reconcile(&record.plan.budget, &summary.summary);

    println!("{:<10} {:>12} {:>12}", "CATEGORY", "ESTIMATED", "ACTUAL");
    for row in &comparison.per_category {
        println!(
            "{:<10} {:>12.2} {:>12.2}",
            row.category, row.estimated, row.actual
        );
    }
    println!(
        "{:<10} {:>12.2} {:>12.2}",
        "TOTAL", comparison.total_estimated, comparison.total_actual
    );
    Ok(())
}

fn print_plan(plan: &ItineraryPlan) {
    for (idx, (day, activities)) in plan.plan.iter().enumerate() {
        let day_budget = plan
            .daily_budget
            .get(idx)
            .map(|b| b.estimated_total)
            .unwrap_or(0.0);
        println!("\n📆 {} (预计 {:.0} 元)", day, day_budget);
        for activity in activities {
            if let Some(ref leg) = activity.transport {
                match leg {
                    TransportLeg::Single(_) => println!("   🚗 {}", leg.summary()),
                    TransportLeg::Multi(_) => println!("   🧭 {}", leg.summary()),
                }
            }
            println!(
                "   {}：{}{} — 💴 {:.0}",
                activity.kind,
                activity.name,
                activity
                    .time
                    .as_ref()
                    .map(|t| format!("（{}）", t))
                    .unwrap_or_default(),
                activity.estimated_cost
            );
        }
    }

    if !plan.personalized_tips.is_empty() {
        println!("\n💡 Tips:");
        for tip in &plan.personalized_tips {
            println!("   - {}", tip);
        }
    }
}
