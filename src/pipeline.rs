use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::award::Award;
use crate::history::ActualWinners;
use crate::ledger::Ledger;
use crate::merge::attach_rushing;
use crate::normalize::normalize_table;
use crate::scoring::{AwardModel, Candidate, rank_droy, rank_mvp, rank_oroy};
use crate::snapshot::{SeasonSnapshot, StatCategory};

const QB_POSITION: &str = "QB";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardPredictions {
    pub season: i32,
    pub mvp: Vec<Candidate>,
    pub oroy: Vec<Candidate>,
    pub droy: Vec<Candidate>,
}

impl AwardPredictions {
    pub fn for_award(&self, award: Award) -> &[Candidate] {
        match award {
            Award::Mvp => &self.mvp,
            Award::Oroy => &self.oroy,
            Award::Droy => &self.droy,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mvp.is_empty() && self.oroy.is_empty() && self.droy.is_empty()
    }
}

/// Runs one season snapshot through normalization, merging and all three scorers.
pub fn predict_season(season: i32, snapshot: &SeasonSnapshot, model: &AwardModel) -> AwardPredictions {
    let passing = normalize_table(StatCategory::Passing, &snapshot.passing);
    let rushing = normalize_table(StatCategory::Rushing, &snapshot.rushing);
    let receiving = normalize_table(StatCategory::Receiving, &snapshot.receiving);
    let defense = normalize_table(StatCategory::Defense, &snapshot.defense);

    let quarterbacks = attach_rushing(&passing, &rushing, QB_POSITION);

    let out = AwardPredictions {
        season,
        mvp: rank_mvp(model, &quarterbacks),
        oroy: rank_oroy(model, &quarterbacks, &rushing, &receiving),
        droy: rank_droy(model, &defense),
    };
    if out.is_empty() {
        info!(season, "no usable data, empty predictions");
    }
    out
}

/// Records the top candidate of every non-empty award list. Returns the
/// awards that produced a new ledger entry.
pub fn commit_predictions(ledger: &mut Ledger, predictions: &AwardPredictions, now: DateTime<Utc>) -> Vec<Award> {
    let mut inserted = Vec::new();
    for award in Award::ALL {
        let Some(top) = predictions.for_award(award).first() else {
            continue;
        };
        if ledger.record_at(predictions.season, award, &top.player, top.score, now) {
            inserted.push(award);
        }
    }
    inserted
}

/// Reconciles every season of the winners table. Returns the number of
/// ledger records updated.
pub fn reconcile_history(ledger: &mut Ledger, winners: &ActualWinners) -> usize {
    winners
        .seasons()
        .map(|(season, results)| ledger.reconcile(season, results))
        .sum()
}
