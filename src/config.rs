use std::env;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};

use crate::accuracy::DEFAULT_LOW_ACCURACY_PCT;
use crate::scoring::DEFAULT_TOP_N;

const APP_DIR: &str = "nfl_awards";
const LEDGER_FILE: &str = "awards_accuracy_history.json";
const MIN_TOP_N: usize = 10;
const MAX_TOP_N: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub ledger_path: PathBuf,
    pub model_path: Option<PathBuf>,
    pub top_n: usize,
    pub season: Option<i32>,
    pub low_accuracy_pct: f64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let ledger_path = opt_env("AWARDS_LEDGER_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_ledger_path);
        let model_path = opt_env("AWARDS_MODEL_PATH").map(PathBuf::from);
        let top_n = opt_env("AWARDS_TOP_N")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .map(clamp_top_n)
            .unwrap_or(DEFAULT_TOP_N);
        let season = opt_env("AWARDS_SEASON").and_then(|v| v.trim().parse::<i32>().ok());
        let low_accuracy_pct = opt_env("AWARDS_LOW_ACCURACY_PCT")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_LOW_ACCURACY_PCT)
            .clamp(0.0, 100.0);

        Self {
            ledger_path,
            model_path,
            top_n,
            season,
            low_accuracy_pct,
        }
    }
}

pub fn clamp_top_n(n: usize) -> usize {
    n.clamp(MIN_TOP_N, MAX_TOP_N)
}

/// Seasons straddle the new year; through July the latest finished season
/// is last year's.
pub fn current_season(today: NaiveDate) -> i32 {
    if today.month() <= 7 {
        today.year() - 1
    } else {
        today.year()
    }
}

pub fn default_ledger_path() -> PathBuf {
    if let Some(base) = opt_env("XDG_CACHE_HOME") {
        return PathBuf::from(base).join(APP_DIR).join(LEDGER_FILE);
    }
    match opt_env("HOME") {
        Some(home) => PathBuf::from(home).join(".cache").join(APP_DIR).join(LEDGER_FILE),
        None => PathBuf::from(LEDGER_FILE),
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|val| {
        if val.trim().is_empty() {
            None
        } else {
            Some(val)
        }
    })
}
