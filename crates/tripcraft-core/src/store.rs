//! HTTP client for the external plan/expense store
//!
//! Persistence lives in a separate REST service; this client is the only
//! way the core touches it. The store assigns ids, orders expense listings
//! by creation time, and serializes writes per entry id. Unknown ids come
//! back as 404 and surface as [`Error::NotFound`] verbatim.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{ExpenseEntry, ItineraryPlan, NewExpense, PlanRecord, PlanSummary};

/// Client for the plan/expense store API
#[derive(Clone)]
pub struct StoreClient {
    http_client: Client,
    base_url: String,
    api_key: Option<String>,
}

/// Error body returned by the store
#[derive(Debug, Deserialize)]
struct StoreError {
    error: String,
}

/// Response to a plan insert
#[derive(Debug, Deserialize)]
struct SavedPlan {
    id: String,
}

impl StoreClient {
    /// Create a new store client
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Attach a bearer key for stores that require one
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Create from environment variables (STORE_URL, optional STORE_API_KEY)
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("STORE_URL").ok()?;
        let client = Self::new(&base_url);
        match std::env::var("STORE_API_KEY") {
            Ok(key) => Some(client.with_api_key(&key)),
            Err(_) => Some(client),
        }
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http_client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Map a non-success response onto the error taxonomy
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<StoreError>(&body).ok())
            .map(|e| e.error)
            .unwrap_or_else(|| format!("store returned {}", status));

        if status == StatusCode::NOT_FOUND {
            Err(Error::NotFound(message))
        } else {
            Err(Error::Service(message))
        }
    }

    /// Save a generated plan for a user, returning the store-assigned id
    pub async fn save_plan(&self, username: &str, plan: &ItineraryPlan) -> Result<String> {
        let mut body = serde_json::to_value(plan)?;
        body["username"] = serde_json::Value::String(username.to_string());

        let response = self
            .request(Method::POST, "/plans")
            .json(&body)
            .send()
            .await?;
        let saved: SavedPlan = Self::check(response).await?.json().await?;
        Ok(saved.id)
    }

    /// List a user's saved plans, newest first
    pub async fn list_plans(&self, username: &str) -> Result<Vec<PlanSummary>> {
        let response = self
            .request(Method::GET, "/plans")
            .query(&[("username", username)])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch a saved plan by id
    pub async fn get_plan(&self, id: &str) -> Result<PlanRecord> {
        let response = self
            .request(Method::GET, &format!("/plans/{}", id))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Insert an expense, returning the stored entry with its id
    pub async fn insert_expense(&self, expense: &NewExpense) -> Result<ExpenseEntry> {
        let response = self
            .request(Method::POST, "/expenses")
            .json(expense)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Replace an expense by id
    pub async fn update_expense(&self, id: i64, expense: &NewExpense) -> Result<ExpenseEntry> {
        let response = self
            .request(Method::PUT, &format!("/expenses/{}", id))
            .json(expense)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Delete an expense by id. The store fails unknown ids with 404, which
    /// surfaces as NotFound rather than being swallowed.
    pub async fn delete_expense(&self, id: i64) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("/expenses/{}", id))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// List a plan's expenses in creation order
    pub async fn list_expenses(&self, plan_id: &str) -> Result<Vec<ExpenseEntry>> {
        let response = self
            .request(Method::GET, "/expenses")
            .query(&[("plan_id", plan_id)])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
