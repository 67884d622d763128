//! Tripcraft Core Library
//!
//! Shared functionality for the Tripcraft AI trip planner:
//! - Intent normalizer for free-text travel requests
//! - Itinerary model (ordered days, transport legs, budget estimates)
//! - Day organizer (nesting transport legs under their activities)
//! - Expense ledger with local validation and category aggregation
//! - Budget reconciler (AI estimate vs. actual spend)
//! - Pluggable generation AI backends (DashScope, mock)
//! - Clients for the transcription service and the plan/expense store
//! - Two-layer settings resolution (config file + environment)

pub mod ai;
pub mod config;
pub mod error;
pub mod intent;
pub mod ledger;
pub mod models;
pub mod reconcile;
pub mod schedule;
pub mod speech;
pub mod store;

/// Test utilities including mock generation/store servers
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, DashScopeBackend, ExpenseClassification, MockBackend};
pub use config::Settings;
pub use error::{Error, Result};
pub use intent::{render_query, IntentParser};
pub use ledger::{
    summarize_entries, validate_expense, ExpenseLedger, LedgerSummary, PendingExpense,
    VoiceExpense,
};
pub use models::{
    Activity, ActivityKind, CategoryBudget, CategorySummary, DailyBudget, DaySchedule,
    ExpenseCategory, ExpenseEntry, GeoPoint, ItineraryPlan, MultiRouteLeg, NewExpense,
    PartySize, PlanRecord, PlanSummary, RouteHop, SingleRouteLeg, TransportLeg, TravelRequest,
};
pub use reconcile::{reconcile, BudgetComparison, CategoryComparison};
pub use schedule::{organize_day, organize_plan};
pub use speech::SpeechClient;
pub use store::StoreClient;
