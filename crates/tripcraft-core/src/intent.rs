//! Intent normalizer for free-text travel requests
//!
//! Turns a spoken or typed request like "我想去日本玩5天，预算8000元，
//! 喜欢温泉和美食，带孩子" into a [`TravelRequest`], and renders a
//! structured form back into the natural-language prompt the generation
//! service expects.
//!
//! This is deliberately heuristic pattern extraction, not a grammar: every
//! field is extracted independently and best-effort, and a missing match
//! leaves that field unset rather than failing the parse.

use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{PartySize, TravelRequest};

/// Phrase that implies a family trip when no explicit head count was given
const FAMILY_PHRASE: &str = "带孩子";

/// Free-text travel request parser with precompiled extraction patterns
pub struct IntentParser {
    destination: Regex,
    days: Regex,
    budget: Regex,
    party: Regex,
    preferences: Regex,
    separators: Regex,
}

impl IntentParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // "去X" where X stops at a travel verb, whitespace, comma, or
            // period ("去东京玩5天" captures 东京, not 东京玩5天)
            destination: Regex::new(r"去([^\s,，。]+?)(?:玩|旅游|旅行|[\s,，。]|$)")?,
            days: Regex::new(r"(\d+)\s*天")?,
            budget: Regex::new(r"(?:预算|花费|大概)(\d+(?:\.\d+)?)")?,
            party: Regex::new(r"(?:带|和|一共)(\d+)(?:个人|人)")?,
            preferences: Regex::new("(?:喜欢|想去看|主要想)([^。，“”]*)")?,
            separators: Regex::new("和|、|，")?,
        })
    }

    /// Extract a [`TravelRequest`] from free text
    ///
    /// Extractions are independent; any subset of fields may populate.
    pub fn parse(&self, text: &str) -> TravelRequest {
        let mut request = TravelRequest::default();

        if let Some(caps) = self.destination.captures(text) {
            request.destination = Some(caps[1].to_string());
        }

        if let Some(caps) = self.days.captures(text) {
            request.days = caps[1].parse().ok();
        }

        if let Some(caps) = self.budget.captures(text) {
            request.budget = caps[1].parse().ok();
        }

        if let Some(caps) = self.party.captures(text) {
            request.party = caps[1].parse().ok().map(PartySize::Count);
        } else if text.contains(FAMILY_PHRASE) {
            request.party = Some(PartySize::Family);
        }

        if let Some(caps) = self.preferences.captures(text) {
            let cleaned = self.separators.replace_all(&caps[1], " ");
            request.preferences = cleaned
                .split_whitespace()
                .map(str::to_string)
                .collect();
        }

        request
    }
}

/// Render a populated form back into the generation service's prompt
///
/// Unset fields are skipped. An entirely empty request is a validation
/// error ("nothing to submit"); partial input never errors.
pub fn render_query(request: &TravelRequest) -> Result<String> {
    if request.is_empty() {
        return Err(Error::Validation("请至少填写一项旅行需求".to_string()));
    }

    let mut parts = Vec::new();

    if let Some(ref destination) = request.destination {
        parts.push(format!("去{}", destination));
    }
    if let Some(days) = request.days {
        parts.push(format!("玩{}天", days));
    }
    if let Some(budget) = request.budget {
        parts.push(format!("预算{}元", budget));
    }
    if let Some(party) = request.party {
        parts.push(party.to_string());
    }
    if !request.preferences.is_empty() {
        parts.push(format!("喜欢{}", request.preferences.join("和")));
    }

    Ok(parts.join("，"))
}
