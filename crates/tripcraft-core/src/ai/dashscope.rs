//! DashScope backend implementation
//!
//! HTTP client for the DashScope text-generation API (Tongyi Qianwen).
//! Carries the itinerary-generation and expense-classification prompts and
//! parses the model output via [`super::parsing`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::ItineraryPlan;

use super::parsing::{parse_expense_response, parse_plan_response};
use super::types::ExpenseClassification;
use super::AIBackend;

/// The generation service documents long tail latencies for full
/// itineraries; classification is much quicker.
const PLAN_TIMEOUT: Duration = Duration::from_secs(130);
const EXPENSE_TIMEOUT: Duration = Duration::from_secs(60);

/// Itinerary generation prompt. The model must answer with one strict JSON
/// object; every structural requirement the parser relies on is spelled out
/// here.
const PLAN_PROMPT: &str = r#"你是一位经验丰富的智能旅行规划师，擅长根据用户的偏好、预算、同行人数制定个性化、可执行的旅行计划。

请根据用户输入生成一份详细的旅行行程规划。

【输出要求】（务必严格遵循）：
1. 必须输出严格的 JSON 字符串，不能包含任何文字说明、空行或 Markdown 代码块标记。
2. JSON 结构如下（示例仅作格式参考）：

{
  "destination": "旅行目的地",
  "days": 5,
  "summary": "一句话概述行程主题",
  "plan": {
    "day_1": [
      {"type": "交通", "name": "成田机场 → 新宿酒店", "detail": "乘坐N'EX特快列车", "time": "08:00-09:30", "estimated_cost": 3000, "location": {"lat": 35.7719, "lng": 140.3929}, "note": "建议提前购买JR PASS"},
      {"type": "景点", "name": "浅草寺", "time": "10:00-11:30", "estimated_cost": 0, "location": {"lat": 35.7148, "lng": 139.7967}},
      {"type": "餐饮", "name": "一兰拉面新宿店", "time": "12:00-13:00", "estimated_cost": 1500, "location": {"lat": 35.6920, "lng": 139.7006}},
      {"type": "住宿", "name": "东京希尔顿酒店", "time": "20:00", "estimated_cost": 15000, "location": {"lat": 35.6940, "lng": 139.6920}}
    ],
    "day_2": []
  },
  "daily_budget": [{"day": 1, "estimated_total": 19500}],
  "budget": {"currency": "RMB", "total": 90000, "transport": 10000, "hotel": 40000, "food": 15000, "ticket": 15000, "other": 10000},
  "personalized_tips": ["推荐购买地铁一日通票节省出行费用。"]
}

【生成规则】：
- 每天至少包括交通、景点、餐饮、住宿四种类型。
- 交通项必须包含 name（如"东京站 → 富士山"）与 location（经纬度）。
- 所有行程项必须包含 location 字段，WGS84 坐标，lat ∈ [-90,90]，lng ∈ [-180,180]。
- 每个行程项都必须包含 estimated_cost（数字）。
- daily_budget 表示每日预估开销；budget 为整趟旅行预算汇总。
- 确保输出完整，不要截断内容。

【用户输入】：
{user_input}"#;

/// Expense classification prompt
const EXPENSE_PROMPT: &str = r#"你是一个理财助手，请将用户描述的支出语句转成结构化JSON：
格式：
{
  "category": "餐饮/交通/门票/住宿/购物/其他",
  "amount": 金额（数字）
}
示例：
输入："我花了200元打车去机场" → {"category": "交通", "amount": 200}
输入："吃饭花了350块" → {"category": "餐饮", "amount": 350}
输入："买门票120元" → {"category": "门票", "amount": 120}
只输出 JSON。
输入：{user_input}
输出："#;

/// DashScope text-generation backend
#[derive(Clone)]
pub struct DashScopeBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl DashScopeBackend {
    /// Create a new DashScope backend
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("DASHSCOPE_API_KEY").ok()?;
        let host = std::env::var("DASHSCOPE_HOST")
            .unwrap_or_else(|_| "https://dashscope.aliyuncs.com".to_string());
        let model =
            std::env::var("DASHSCOPE_MODEL").unwrap_or_else(|_| "qwen-plus".to_string());
        Some(Self::new(&host, &api_key, &model))
    }

    /// Call the text-generation endpoint with a fully rendered prompt
    async fn generate(&self, prompt: String, timeout: Duration) -> Result<String> {
        let request = GenerationRequest {
            model: self.model.clone(),
            input: GenerationInput { prompt },
        };

        let response = self
            .http_client
            .post(format!(
                "{}/api/v1/services/aigc/text-generation/generation",
                self.base_url
            ))
            .bearer_auth(&self.api_key)
            .timeout(timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GenerationError>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| format!("generation service returned {}", status));
            return Err(Error::Service(message));
        }

        let body: GenerationResponse = response.json().await?;
        debug!(model = %self.model, "DashScope response: {}", body.output.text);
        Ok(body.output.text)
    }
}

/// Request to the DashScope text-generation API
#[derive(Debug, Serialize)]
struct GenerationRequest {
    model: String,
    input: GenerationInput,
}

#[derive(Debug, Serialize)]
struct GenerationInput {
    prompt: String,
}

/// Response from the DashScope text-generation API
#[derive(Debug, Deserialize)]
struct GenerationResponse {
    output: GenerationOutput,
}

#[derive(Debug, Deserialize)]
struct GenerationOutput {
    #[serde(default)]
    text: String,
}

/// Error body from the DashScope API
#[derive(Debug, Deserialize)]
struct GenerationError {
    message: String,
}

#[async_trait]
impl AIBackend for DashScopeBackend {
    async fn generate_plan(&self, query: &str) -> Result<ItineraryPlan> {
        let prompt = PLAN_PROMPT.replace("{user_input}", query);
        let response = self.generate(prompt, PLAN_TIMEOUT).await?;
        parse_plan_response(&response)
    }

    async fn parse_expense(&self, text: &str) -> Result<ExpenseClassification> {
        let prompt = EXPENSE_PROMPT.replace("{user_input}", text);
        let response = self.generate(prompt, EXPENSE_TIMEOUT).await?;
        parse_expense_response(&response)
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(&self.base_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
