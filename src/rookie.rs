use serde::{Deserialize, Serialize};

use crate::normalize::PlayerRecord;

/// Rookie eligibility heuristic. The source data has no rookie-season flag,
/// so a young age or an explicit rookie-award tag stands in for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RookieRule {
    pub max_age: f64,
    pub award_tag: String,
}

impl RookieRule {
    pub fn oroy_quarterback() -> Self {
        Self {
            max_age: 24.0,
            award_tag: "ORoY".to_string(),
        }
    }

    pub fn oroy_skill_position() -> Self {
        Self {
            max_age: 23.0,
            award_tag: "ORoY".to_string(),
        }
    }

    pub fn droy() -> Self {
        Self {
            max_age: 23.0,
            award_tag: "DRoY".to_string(),
        }
    }
}

pub fn is_rookie(record: &PlayerRecord, rule: &RookieRule) -> bool {
    if record.age.is_some_and(|age| age <= rule.max_age) {
        return true;
    }
    !rule.award_tag.is_empty()
        && record
            .awards
            .as_deref()
            .is_some_and(|awards| awards.contains(rule.award_tag.as_str()))
}
