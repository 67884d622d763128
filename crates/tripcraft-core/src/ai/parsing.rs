//! JSON parsing helpers for AI backend responses
//!
//! Generation models often wrap their JSON payload in markdown fences or
//! surrounding prose, and long itineraries sometimes arrive truncated.
//! These helpers extract the payload, repair the common truncation shapes,
//! and deserialize into domain types. A payload that still cannot be read
//! as a plan becomes [`Error::MalformedPlan`] carrying the raw text, so
//! callers can tell "the AI answered garbage" apart from a transport
//! failure.

use tracing::warn;

use crate::error::{Error, Result};
use crate::models::ItineraryPlan;

use super::types::ExpenseClassification;

/// Tolerated difference between the budget `total` and its category sum
const BUDGET_DRIFT_TOLERANCE: f64 = 1.0;

/// Parse an itinerary plan from a generation model response
pub fn parse_plan_response(response: &str) -> Result<ItineraryPlan> {
    let json_str = extract_json(response).ok_or_else(|| Error::MalformedPlan {
        message: "no JSON object in response".to_string(),
        raw: preview(response),
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&json_str).map_err(|e| Error::MalformedPlan {
            message: format!("invalid JSON: {}", e),
            raw: preview(response),
        })?;

    if value.get("plan").is_none() {
        return Err(Error::MalformedPlan {
            message: "response JSON has no plan".to_string(),
            raw: preview(response),
        });
    }

    let plan: ItineraryPlan =
        serde_json::from_value(value).map_err(|e| Error::MalformedPlan {
            message: format!("unexpected plan structure: {}", e),
            raw: preview(response),
        })?;

    let drift = (plan.budget.total - plan.budget.category_sum()).abs();
    if drift > BUDGET_DRIFT_TOLERANCE && plan.budget.total > 0.0 {
        // Tolerated for display, never fatal
        warn!(
            total = plan.budget.total,
            category_sum = plan.budget.category_sum(),
            "budget total drifts from category sum"
        );
    }

    Ok(plan)
}

/// Parse an expense classification from a model response
pub fn parse_expense_response(response: &str) -> Result<ExpenseClassification> {
    let json_str = extract_json(response)
        .ok_or_else(|| Error::Service("无法识别支出结构".to_string()))?;

    let value: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| Error::Service("无法识别支出结构".to_string()))?;

    let category = value
        .get("category")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Service("无法识别支出结构".to_string()))?
        .to_string();

    // Models occasionally emit the amount as a string
    let amount = value
        .get("amount")
        .and_then(|v| v.as_f64().or_else(|| v.as_str()?.trim().parse().ok()))
        .ok_or_else(|| Error::Service("无法识别支出结构".to_string()))?;

    Ok(ExpenseClassification { category, amount })
}

/// Extract the first JSON object from a model response
///
/// Strips markdown code fences, then scans for a brace-balanced object
/// (string-aware, so braces inside values don't confuse the depth count).
/// A truncated object is repaired rather than rejected.
pub fn extract_json(response: &str) -> Option<String> {
    let stripped = strip_fences(response);
    let start = stripped.find('{')?;
    let body = &stripped[start..];

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(body[..=i].to_string());
                }
            }
            _ => {}
        }
    }

    // Never closed: the model was cut off mid-object
    Some(repair_truncated_json(body))
}

/// Strip common markdown wrapping around a JSON payload
fn strip_fences(response: &str) -> &str {
    let mut s = response.trim();
    for prefix in ["```json", "```"] {
        if let Some(rest) = s.strip_prefix(prefix) {
            s = rest.trim_start();
            break;
        }
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}

/// Best-effort repair of a truncated JSON object
///
/// Closes an unterminated string, drops a trailing comma or colon, and
/// closes any still-open braces and brackets in reverse opening order.
fn repair_truncated_json(body: &str) -> String {
    let mut out = body.trim_end().to_string();
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in out.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    if in_string {
        out.push('"');
    }
    while out
        .trim_end()
        .ends_with(|c: char| c == ',' || c == ':')
    {
        out.truncate(out.trim_end().len() - 1);
    }
    while let Some(closer) = stack.pop() {
        out.push(closer);
    }
    out
}

/// Truncate a raw response for error payloads
fn preview(response: &str) -> String {
    const MAX: usize = 1000;
    if response.chars().count() > MAX {
        response.chars().take(MAX).collect()
    } else {
        response.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN_JSON: &str = r#"{
        "destination": "东京",
        "days": 1,
        "summary": "美食一日游",
        "plan": {
            "day_1": [
                {"type": "交通", "name": "机场 → 酒店", "estimated_cost": 3000},
                {"type": "景点", "name": "浅草寺", "estimated_cost": 0}
            ]
        },
        "daily_budget": [{"day": 1, "estimated_total": 3000}],
        "budget": {"currency": "JPY", "total": 3000, "transport": 3000},
        "personalized_tips": ["提前购买JR PASS"]
    }"#;

    #[test]
    fn test_parse_plan_plain_json() {
        let plan = parse_plan_response(PLAN_JSON).unwrap();
        assert_eq!(plan.destination, "东京");
        assert_eq!(plan.plan.len(), 1);
        assert_eq!(plan.budget.total, 3000.0);
    }

    #[test]
    fn test_parse_plan_with_fences_and_prose() {
        let wrapped = format!("好的，这是您的行程：\n```json\n{}\n```", PLAN_JSON);
        let plan = parse_plan_response(&wrapped).unwrap();
        assert_eq!(plan.destination, "东京");
    }

    #[test]
    fn test_parse_plan_truncated() {
        // Cut mid-way through the day_1 array
        let cut = &PLAN_JSON[..PLAN_JSON.find("浅草寺").unwrap()];
        let extracted = extract_json(cut).unwrap();
        let value: serde_json::Value = serde_json::from_str(&extracted).unwrap();
        assert_eq!(value["destination"], "东京");
        assert!(value["plan"]["day_1"].is_array());
    }

    #[test]
    fn test_parse_plan_without_plan_key_is_malformed() {
        let err = parse_plan_response(r#"{"destination": "东京", "days": 1}"#).unwrap_err();
        match err {
            Error::MalformedPlan { raw, .. } => assert!(raw.contains("东京")),
            other => panic!("expected MalformedPlan, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_plan_no_json_is_malformed() {
        assert!(matches!(
            parse_plan_response("抱歉，我无法生成行程。"),
            Err(Error::MalformedPlan { .. })
        ));
    }

    #[test]
    fn test_parse_expense_response() {
        let result =
            parse_expense_response(r#"{"category": "交通", "amount": 200}"#).unwrap();
        assert_eq!(result.category, "交通");
        assert_eq!(result.amount, 200.0);
    }

    #[test]
    fn test_parse_expense_string_amount() {
        let result =
            parse_expense_response(r#"{"category": "餐饮", "amount": "350"}"#).unwrap();
        assert_eq!(result.amount, 350.0);
    }

    #[test]
    fn test_parse_expense_garbage_is_service_error() {
        assert!(matches!(
            parse_expense_response("看不懂"),
            Err(Error::Service(_))
        ));
    }

    #[test]
    fn test_extract_json_ignores_braces_in_strings() {
        let response = r#"{"name": "括号 } 在字符串里", "ok": true}"#;
        let extracted = extract_json(response).unwrap();
        let value: serde_json::Value = serde_json::from_str(&extracted).unwrap();
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_repair_unterminated_string() {
        let extracted = extract_json(r#"{"summary": "一句话概"#).unwrap();
        let value: serde_json::Value = serde_json::from_str(&extracted).unwrap();
        assert!(value["summary"].as_str().unwrap().starts_with("一句话"));
    }
}
