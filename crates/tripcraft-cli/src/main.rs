//! Tripcraft CLI - AI trip planner
//!
//! Usage:
//!   tripcraft serve --port 8000        Start the web server
//!   tripcraft parse "去东京玩5天"       Parse a travel request
//!   tripcraft plan generate "..."      Generate and save an itinerary
//!   tripcraft expense add ...          Record an expense
//!   tripcraft reconcile PLAN_ID        Compare estimate vs. actual spend

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(&host, port, static_dir.as_deref()).await,
        Commands::Parse { text, render } => commands::cmd_parse(&text, render),
        Commands::Plan { action } => match action {
            PlanAction::Generate { query } => commands::cmd_plan_generate(&cli.user, &query).await,
            PlanAction::List => commands::cmd_plan_list(&cli.user).await,
            PlanAction::Show { plan_id, organized } => {
                commands::cmd_plan_show(&plan_id, organized).await
            }
        },
        Commands::Expense { action } => match action {
            ExpenseAction::Add {
                plan,
                category,
                amount,
                description,
            } => commands::cmd_expense_add(&cli.user, &plan, &category, amount, description).await,
            ExpenseAction::Update {
                id,
                plan,
                category,
                amount,
                description,
            } => {
                commands::cmd_expense_update(&cli.user, id, &plan, &category, amount, description)
                    .await
            }
            ExpenseAction::Remove { id } => commands::cmd_expense_remove(id).await,
            ExpenseAction::List { plan } => commands::cmd_expense_list(&plan).await,
            ExpenseAction::Summary { plan } => commands::cmd_expense_summary(&plan).await,
            ExpenseAction::Classify { text } => commands::cmd_expense_classify(&text).await,
        },
        Commands::Reconcile { plan_id } => commands::cmd_reconcile(&plan_id).await,
    }
}
