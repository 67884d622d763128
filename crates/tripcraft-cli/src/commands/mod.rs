//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `expense` - Ledger commands (add, update, remove, list, summary, classify)
//! - `intent` - Travel request parsing command
//! - `plan` - Plan commands (generate, list, show) and reconciliation
//! - `serve` - Web server command

pub mod expense;
pub mod intent;
pub mod plan;
pub mod serve;

// Re-export command functions for main.rs
pub use expense::*;
pub use intent::*;
pub use plan::*;
pub use serve::*;

use anyhow::{Context, Result};
use tripcraft_core::ai::AIClient;
use tripcraft_core::store::StoreClient;

/// Build the store client from the environment
pub fn open_store() -> Result<StoreClient> {
    StoreClient::from_env().context("STORE_URL is not set (plan/expense store URL)")
}

/// Build the AI client from the environment
pub fn open_ai() -> Result<AIClient> {
    AIClient::from_env()
        .context("AI backend not configured (set DASHSCOPE_API_KEY, or AI_BACKEND=mock)")
}
