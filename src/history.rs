use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::award::Award;

const BUILTIN_WINNERS: &str = include_str!("../data/actual_winners.json");

/// Manually maintained `season -> award -> winner` table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActualWinners(pub BTreeMap<i32, BTreeMap<Award, String>>);

impl ActualWinners {
    pub fn builtin() -> Result<Self> {
        parse_actual_winners_json(BUILTIN_WINNERS)
    }

    pub fn season(&self, season: i32) -> Option<&BTreeMap<Award, String>> {
        self.0.get(&season)
    }

    pub fn winner(&self, season: i32, award: Award) -> Option<&str> {
        self.season(season)?.get(&award).map(String::as_str)
    }

    pub fn insert(&mut self, season: i32, award: Award, winner: &str) {
        self.0
            .entry(season)
            .or_default()
            .insert(award, winner.to_string());
    }

    pub fn seasons(&self) -> impl Iterator<Item = (i32, &BTreeMap<Award, String>)> {
        self.0.iter().map(|(season, results)| (*season, results))
    }
}

pub fn parse_actual_winners_json(raw: &str) -> Result<ActualWinners> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(ActualWinners::default());
    }
    serde_json::from_str(trimmed).context("invalid actual winners json")
}

pub fn load_actual_winners(path: &Path) -> Result<ActualWinners> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read actual winners {}", path.display()))?;
    parse_actual_winners_json(&raw)
}
