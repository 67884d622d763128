//! Pluggable generation AI backend abstraction
//!
//! This module provides a backend-agnostic interface for the two AI
//! operations the planner needs: generating an itinerary from a
//! natural-language query, and classifying a free-text expense description
//! into a category and amount.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `DashScopeBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (dashscope, mock). Default: dashscope
//! - `DASHSCOPE_API_KEY`: API key (required for dashscope backend)
//! - `DASHSCOPE_HOST`: Service URL (default: https://dashscope.aliyuncs.com)
//! - `DASHSCOPE_MODEL`: Model name (default: qwen-plus)

mod dashscope;
mod mock;
pub mod parsing;
pub mod types;

pub use dashscope::DashScopeBackend;
pub use mock::MockBackend;
pub use types::ExpenseClassification;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ItineraryPlan;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks. No
/// backend retries internally; retry policy belongs to the caller's
/// transport layer.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Generate a day-by-day itinerary with budget estimates from a
    /// natural-language travel request
    async fn generate_plan(&self, query: &str) -> Result<ItineraryPlan>;

    /// Classify a free-text expense description into category and amount
    async fn parse_expense(&self, text: &str) -> Result<ExpenseClassification>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
/// All variants implement the same AIBackend operations.
#[derive(Clone)]
pub enum AIClient {
    /// DashScope text-generation backend (HTTP API)
    DashScope(DashScopeBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `dashscope` (default): Uses DASHSCOPE_API_KEY/HOST/MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "dashscope".to_string());

        match backend.to_lowercase().as_str() {
            "dashscope" | "qwen" => DashScopeBackend::from_env().map(AIClient::DashScope),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to dashscope");
                DashScopeBackend::from_env().map(AIClient::DashScope)
            }
        }
    }

    /// Create a DashScope backend directly
    pub fn dashscope(host: &str, api_key: &str, model: &str) -> Self {
        AIClient::DashScope(DashScopeBackend::new(host, api_key, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::DashScope(b) => AIClient::DashScope(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.with_model(model)),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn generate_plan(&self, query: &str) -> Result<ItineraryPlan> {
        match self {
            AIClient::DashScope(b) => b.generate_plan(query).await,
            AIClient::Mock(b) => b.generate_plan(query).await,
        }
    }

    async fn parse_expense(&self, text: &str) -> Result<ExpenseClassification> {
        match self {
            AIClient::DashScope(b) => b.parse_expense(text).await,
            AIClient::Mock(b) => b.parse_expense(text).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::DashScope(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::DashScope(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::DashScope(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
