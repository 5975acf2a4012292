use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::accuracy::{self, AccuracySnapshot};
use crate::award::Award;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub season: i32,
    pub award: Award,
    pub predicted_winner: String,
    pub predicted_score: f64,
    #[serde(default)]
    pub actual_winner: Option<String>,
    pub prediction_date: DateTime<Utc>,
    /// `None` until the actual winner is known.
    #[serde(default)]
    pub was_correct: Option<bool>,
}

/// Every prediction ever committed, plus the last computed performance snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub predictions: Vec<PredictionRecord>,
    #[serde(default)]
    pub model_performance: AccuracySnapshot,
}

impl Ledger {
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// The authoritative record for a key is the first one inserted.
    pub fn find(&self, season: i32, award: Award) -> Option<&PredictionRecord> {
        self.predictions
            .iter()
            .find(|p| p.season == season && p.award == award)
    }

    pub fn record(&mut self, season: i32, award: Award, predicted_winner: &str, predicted_score: f64) -> bool {
        self.record_at(season, award, predicted_winner, predicted_score, Utc::now())
    }

    /// Inserts a prediction unless one already exists for `(season, award)`
    /// or the score is not finite. Returns whether a record was added.
    pub fn record_at(
        &mut self,
        season: i32,
        award: Award,
        predicted_winner: &str,
        predicted_score: f64,
        prediction_date: DateTime<Utc>,
    ) -> bool {
        if !predicted_score.is_finite() {
            warn!(
                season,
                award = award.code(),
                winner = predicted_winner,
                score = predicted_score,
                "non-finite prediction score, not recorded"
            );
            return false;
        }
        if let Some(existing) = self.find(season, award) {
            info!(
                season,
                award = award.code(),
                existing = %existing.predicted_winner,
                "prediction already recorded, keeping existing"
            );
            return false;
        }
        self.predictions.push(PredictionRecord {
            season,
            award,
            predicted_winner: predicted_winner.to_string(),
            predicted_score,
            actual_winner: None,
            prediction_date,
            was_correct: None,
        });
        info!(
            season,
            award = award.code(),
            winner = predicted_winner,
            score = predicted_score,
            "recorded prediction"
        );
        true
    }

    /// Attaches actual winners to every record of `season` whose award is in
    /// `results`. Returns how many records changed hands; unknown keys are ignored.
    pub fn reconcile(&mut self, season: i32, results: &BTreeMap<Award, String>) -> usize {
        let mut updated = 0usize;
        for p in self.predictions.iter_mut().filter(|p| p.season == season) {
            let Some(actual) = results.get(&p.award) else {
                continue;
            };
            p.was_correct = Some(p.predicted_winner == *actual);
            p.actual_winner = Some(actual.clone());
            updated += 1;
        }
        info!(season, updated, "reconciled predictions");
        updated
    }

    pub fn refresh_performance(&mut self, now: DateTime<Utc>) -> &AccuracySnapshot {
        self.model_performance = accuracy::compute(&self.predictions, now);
        &self.model_performance
    }
}

/// Whole-ledger persistence. Loading never fails; saving reports errors.
pub trait LedgerStore {
    fn load(&self) -> Ledger;
    fn save(&self, ledger: &Ledger) -> Result<()>;
}

/// Load, mutate, save as one step.
pub fn update_ledger<S, T>(store: &S, f: impl FnOnce(&mut Ledger) -> T) -> Result<T>
where
    S: LedgerStore + ?Sized,
{
    let mut ledger = store.load();
    let out = f(&mut ledger);
    store.save(&ledger)?;
    Ok(out)
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> Ledger {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ledger::default(),
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ledger unreadable, starting fresh");
                return Ledger::default();
            }
        };
        match serde_json::from_str::<Ledger>(&raw) {
            Ok(ledger) => ledger,
            Err(err) => {
                warn!(path = %self.path.display(), %err, "ledger corrupt, starting fresh");
                Ledger::default()
            }
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create ledger dir {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(ledger).context("serialize ledger")?;
        fs::write(&tmp, json).with_context(|| format!("write ledger {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).context("swap ledger")?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
}

impl MemoryStore {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Ledger {
        match self.ledger.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn save(&self, ledger: &Ledger) -> Result<()> {
        let mut guard = match self.ledger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = ledger.clone();
        Ok(())
    }
}
