use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::award::Award;
use crate::ledger::PredictionRecord;

pub const DEFAULT_LOW_ACCURACY_PCT: f64 = 40.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwardAccuracy {
    pub correct: usize,
    pub total: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracySnapshot {
    pub overall_accuracy: f64,
    pub total_predictions: usize,
    pub total_correct: usize,
    pub by_award: BTreeMap<Award, AwardAccuracy>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl AccuracySnapshot {
    pub fn has_results(&self) -> bool {
        self.total_predictions > 0
    }
}

/// Recomputes accuracy from scratch over reconciled predictions only.
pub fn compute(predictions: &[PredictionRecord], now: DateTime<Utc>) -> AccuracySnapshot {
    let mut by_award: BTreeMap<Award, AwardAccuracy> = BTreeMap::new();
    let mut total = 0usize;
    let mut correct = 0usize;

    for p in predictions {
        let Some(hit) = p.was_correct else {
            continue;
        };
        let entry = by_award.entry(p.award).or_default();
        entry.total += 1;
        total += 1;
        if hit {
            entry.correct += 1;
            correct += 1;
        }
    }

    for entry in by_award.values_mut() {
        entry.accuracy = percent(entry.correct, entry.total);
    }

    AccuracySnapshot {
        overall_accuracy: percent(correct, total),
        total_predictions: total,
        total_correct: correct,
        by_award,
        last_updated: Some(now),
    }
}

fn percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

pub fn summary_line(snapshot: &AccuracySnapshot) -> String {
    if !snapshot.has_results() {
        return "No accuracy data available".to_string();
    }
    format!(
        "{:.1}% accuracy ({}/{} predictions)",
        snapshot.overall_accuracy, snapshot.total_correct, snapshot.total_predictions
    )
}

pub fn low_accuracy_alert(snapshot: &AccuracySnapshot, threshold_pct: f64) -> Option<String> {
    if snapshot.has_results() && snapshot.overall_accuracy < threshold_pct {
        Some(format!("LOW ACCURACY ALERT: {:.1}%", snapshot.overall_accuracy))
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mistake {
    pub season: i32,
    pub award: Award,
    pub predicted: String,
    pub actual: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub award: Award,
    pub pattern: &'static str,
    pub suggestion: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternReport {
    pub mistakes: Vec<Mistake>,
    pub recommendations: Vec<Recommendation>,
}

/// Lists wrong calls and a tuning hint for every award that has at least one.
pub fn analyze_patterns(predictions: &[PredictionRecord]) -> PatternReport {
    let mistakes: Vec<Mistake> = predictions
        .iter()
        .filter(|p| p.was_correct == Some(false))
        .map(|p| Mistake {
            season: p.season,
            award: p.award,
            predicted: p.predicted_winner.clone(),
            actual: p.actual_winner.clone().unwrap_or_default(),
        })
        .collect();

    let recommendations = Award::ALL
        .iter()
        .filter(|award| mistakes.iter().any(|m| m.award == **award))
        .map(|&award| recommendation_for(award))
        .collect();

    PatternReport {
        mistakes,
        recommendations,
    }
}

fn recommendation_for(award: Award) -> Recommendation {
    match award {
        Award::Mvp => Recommendation {
            award,
            pattern: "may be overvaluing raw passing output against team success",
            suggestion: "raise the team wins weight; consider late-season performance",
        },
        Award::Oroy => Recommendation {
            award,
            pattern: "dual-threat quarterback bonus may crowd out high-volume skill players",
            suggestion: "revisit the rushing-yard bands against the linear track scale",
        },
        Award::Droy => Recommendation {
            award,
            pattern: "pass-rush bands may outweigh tackle volume and coverage play",
            suggestion: "revisit sack bands against tackles and playmaking bonuses",
        },
    }
}
