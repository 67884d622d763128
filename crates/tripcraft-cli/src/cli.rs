//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use clap::{Parser, Subcommand};

/// Tripcraft - AI trip planning and expense tracking
#[derive(Parser)]
#[command(name = "tripcraft")]
#[command(about = "AI trip planner with an expense ledger and budget reconciliation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Username for store operations
    #[arg(long, default_value = "guest", global = true)]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory containing static files to serve (e.g. ui/dist)
        #[arg(long)]
        static_dir: Option<String>,
    },

    /// Parse a free-text travel request into structured fields
    Parse {
        /// The request text, e.g. "去东京玩5天预算8000喜欢美食"
        text: String,

        /// Also render the parsed fields back into a prompt
        #[arg(long)]
        render: bool,
    },

    /// Manage itinerary plans
    Plan {
        #[command(subcommand)]
        action: PlanAction,
    },

    /// Manage the expense ledger
    Expense {
        #[command(subcommand)]
        action: ExpenseAction,
    },

    /// Compare a plan's AI budget estimate against actual spend
    Reconcile {
        /// Plan id
        plan_id: String,
    },
}

#[derive(Subcommand)]
pub enum PlanAction {
    /// Generate an itinerary from a travel request and save it
    Generate {
        /// Free-text travel request
        query: String,
    },

    /// List saved plans
    List,

    /// Show a saved plan
    Show {
        /// Plan id
        plan_id: String,

        /// Nest transport legs under the activities they precede
        #[arg(long)]
        organized: bool,
    },
}

#[derive(Subcommand)]
pub enum ExpenseAction {
    /// Record an expense against a plan
    Add {
        /// Plan id
        #[arg(long)]
        plan: String,

        /// Expense category (交通/住宿/餐饮/门票/购物/其他)
        #[arg(long)]
        category: String,

        /// Amount spent
        #[arg(long)]
        amount: f64,

        /// Optional free-text description
        #[arg(long)]
        description: Option<String>,
    },

    /// Update an expense by id
    Update {
        /// Expense id
        id: i64,

        #[arg(long)]
        plan: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        amount: f64,

        #[arg(long)]
        description: Option<String>,
    },

    /// Remove an expense by id
    Remove {
        /// Expense id
        id: i64,
    },

    /// List a plan's expenses
    List {
        /// Plan id
        #[arg(long)]
        plan: String,
    },

    /// Show a plan's category summary and total
    Summary {
        /// Plan id
        #[arg(long)]
        plan: String,
    },

    /// Classify a free-text description into category and amount
    Classify {
        /// Description, e.g. "我花了200元打车去机场"
        text: String,
    },
}
