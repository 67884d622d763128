//! Mock AI backend for testing and offline development

use async_trait::async_trait;
use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{
    Activity, ActivityKind, CategoryBudget, DailyBudget, DaySchedule, GeoPoint, ItineraryPlan,
};

use super::types::ExpenseClassification;
use super::AIBackend;

/// Mock backend returning deterministic canned output
#[derive(Clone)]
pub struct MockBackend {
    model: String,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            model: "mock".to_string(),
        }
    }

    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
        }
    }
}

fn mock_activity(kind: ActivityKind, name: &str, cost: f64, lat: f64, lng: f64) -> Activity {
    Activity {
        kind,
        name: name.to_string(),
        time: None,
        estimated_cost: cost,
        detail: None,
        note: None,
        location: Some(GeoPoint { lat, lng }),
        routes: None,
        transport: None,
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn generate_plan(&self, query: &str) -> Result<ItineraryPlan> {
        // Honor the destination if the query mentions one
        let destination = if query.contains("东京") || query.is_empty() {
            "东京"
        } else {
            query.trim_start_matches("去").trim()
        };

        let mut schedule = DaySchedule::new();
        schedule.push_day(
            "day_1",
            vec![
                mock_activity(ActivityKind::Transport, "机场 → 酒店", 3000.0, 35.77, 140.39),
                mock_activity(ActivityKind::Sightseeing, "浅草寺", 0.0, 35.71, 139.79),
                mock_activity(ActivityKind::Dining, "一兰拉面", 1500.0, 35.69, 139.70),
                mock_activity(ActivityKind::Lodging, "希尔顿酒店", 15000.0, 35.69, 139.69),
            ],
        );
        schedule.push_day(
            "day_2",
            vec![
                mock_activity(ActivityKind::Sightseeing, "明治神宫", 0.0, 35.67, 139.69),
                mock_activity(ActivityKind::Transport, "酒店 → 机场", 3000.0, 35.77, 140.39),
            ],
        );

        let mut budget = CategoryBudget::new(
            22500.0,
            vec![
                ("transport".to_string(), 6000.0),
                ("hotel".to_string(), 15000.0),
                ("food".to_string(), 1500.0),
            ],
        );
        budget.currency = Some("JPY".to_string());

        Ok(ItineraryPlan {
            destination: destination.to_string(),
            days: 2,
            summary: "都市美食观光之旅".to_string(),
            plan: schedule,
            daily_budget: vec![
                DailyBudget {
                    day: 1,
                    estimated_total: 19500.0,
                },
                DailyBudget {
                    day: 2,
                    estimated_total: 3000.0,
                },
            ],
            budget,
            personalized_tips: vec!["推荐购买地铁一日通票节省出行费用。".to_string()],
        })
    }

    async fn parse_expense(&self, text: &str) -> Result<ExpenseClassification> {
        let amount_re = Regex::new(r"(\d+(?:\.\d+)?)")?;
        let amount: f64 = amount_re
            .captures(text)
            .and_then(|caps| caps[1].parse().ok())
            .ok_or_else(|| Error::Service("无法识别支出结构".to_string()))?;

        let category = if ["打车", "地铁", "高铁", "机票", "公交"]
            .iter()
            .any(|kw| text.contains(kw))
        {
            "交通"
        } else if ["吃", "餐", "饭", "面"].iter().any(|kw| text.contains(kw)) {
            "餐饮"
        } else if text.contains("门票") {
            "门票"
        } else if ["酒店", "住"].iter().any(|kw| text.contains(kw)) {
            "住宿"
        } else if text.contains("买") {
            "购物"
        } else {
            "其他"
        };

        Ok(ExpenseClassification {
            category: category.to_string(),
            amount,
        })
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_expense_classification() {
        let backend = MockBackend::new();

        let taxi = backend.parse_expense("我花了200元打车去机场").await.unwrap();
        assert_eq!(taxi.category, "交通");
        assert_eq!(taxi.amount, 200.0);

        let meal = backend.parse_expense("吃饭花了350块").await.unwrap();
        assert_eq!(meal.category, "餐饮");
        assert_eq!(meal.amount, 350.0);

        let ticket = backend.parse_expense("买门票120元").await.unwrap();
        assert_eq!(ticket.category, "门票");
        assert_eq!(ticket.amount, 120.0);
    }

    #[tokio::test]
    async fn test_mock_expense_without_amount_fails() {
        let backend = MockBackend::new();
        assert!(matches!(
            backend.parse_expense("打车去机场").await,
            Err(Error::Service(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_plan_aligns_days_and_budget() {
        let backend = MockBackend::new();
        let plan = backend.generate_plan("去东京玩2天").await.unwrap();
        assert_eq!(plan.plan.len(), plan.daily_budget.len());
        assert_eq!(plan.days as usize, plan.plan.len());
    }
}
