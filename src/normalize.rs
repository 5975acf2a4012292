use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::snapshot::{RawTable, StatCategory};

const PLAYER_COL: &str = "Player";
const TEAM_COLS: [&str; 2] = ["Team", "Tm"];
const POS_COL: &str = "Pos";
const AWARDS_COL: &str = "Awards";
const QB_RECORD_COL: &str = "QBrec";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatField {
    Age,
    Games,
    Wins,
    Losses,
    Attempts,
    Yards,
    Touchdowns,
    Interceptions,
    Rating,
    CompletionPct,
    YardsPerAttempt,
    Receptions,
    YardsPerReception,
    Tackles,
    CombinedTackles,
    SoloTackles,
    Sacks,
    PassDeflections,
    ForcedFumbles,
    TacklesForLoss,
    QbHits,
}

/// Columns coerced to numbers, per category, keyed by source label.
pub fn numeric_columns(category: StatCategory) -> &'static [(&'static str, StatField)] {
    match category {
        StatCategory::Passing => &[
            ("Age", StatField::Age),
            ("G", StatField::Games),
            ("W", StatField::Wins),
            ("L", StatField::Losses),
            ("Cmp%", StatField::CompletionPct),
            ("Yds", StatField::Yards),
            ("TD", StatField::Touchdowns),
            ("Int", StatField::Interceptions),
            ("Y/A", StatField::YardsPerAttempt),
            ("Rate", StatField::Rating),
        ],
        StatCategory::Rushing => &[
            ("Age", StatField::Age),
            ("G", StatField::Games),
            ("Att", StatField::Attempts),
            ("Yds", StatField::Yards),
            ("TD", StatField::Touchdowns),
            ("Y/A", StatField::YardsPerAttempt),
        ],
        StatCategory::Receiving => &[
            ("Age", StatField::Age),
            ("G", StatField::Games),
            ("Rec", StatField::Receptions),
            ("Yds", StatField::Yards),
            ("Y/R", StatField::YardsPerReception),
            ("TD", StatField::Touchdowns),
        ],
        StatCategory::Defense => &[
            ("Age", StatField::Age),
            ("G", StatField::Games),
            ("Int", StatField::Interceptions),
            ("PD", StatField::PassDeflections),
            ("FF", StatField::ForcedFumbles),
            ("Sk", StatField::Sacks),
            ("Comb", StatField::CombinedTackles),
            ("Solo", StatField::SoloTackles),
            ("Tkl", StatField::Tackles),
            ("TFL", StatField::TacklesForLoss),
            ("QBHits", StatField::QbHits),
        ],
    }
}

/// One cleaned player row. A stat is `None` when its column was absent
/// from the source table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub name: String,
    pub team: Option<String>,
    pub position: Option<String>,
    pub awards: Option<String>,
    pub age: Option<f64>,
    pub games: Option<f64>,
    pub wins: Option<f64>,
    pub losses: Option<f64>,
    pub attempts: Option<f64>,
    pub yards: Option<f64>,
    pub touchdowns: Option<f64>,
    pub interceptions: Option<f64>,
    pub rating: Option<f64>,
    pub completion_pct: Option<f64>,
    pub yards_per_attempt: Option<f64>,
    pub receptions: Option<f64>,
    pub yards_per_reception: Option<f64>,
    pub tackles: Option<f64>,
    pub combined_tackles: Option<f64>,
    pub solo_tackles: Option<f64>,
    pub sacks: Option<f64>,
    pub pass_deflections: Option<f64>,
    pub forced_fumbles: Option<f64>,
    pub tackles_for_loss: Option<f64>,
    pub qb_hits: Option<f64>,
}

impl PlayerRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn get(&self, field: StatField) -> Option<f64> {
        match field {
            StatField::Age => self.age,
            StatField::Games => self.games,
            StatField::Wins => self.wins,
            StatField::Losses => self.losses,
            StatField::Attempts => self.attempts,
            StatField::Yards => self.yards,
            StatField::Touchdowns => self.touchdowns,
            StatField::Interceptions => self.interceptions,
            StatField::Rating => self.rating,
            StatField::CompletionPct => self.completion_pct,
            StatField::YardsPerAttempt => self.yards_per_attempt,
            StatField::Receptions => self.receptions,
            StatField::YardsPerReception => self.yards_per_reception,
            StatField::Tackles => self.tackles,
            StatField::CombinedTackles => self.combined_tackles,
            StatField::SoloTackles => self.solo_tackles,
            StatField::Sacks => self.sacks,
            StatField::PassDeflections => self.pass_deflections,
            StatField::ForcedFumbles => self.forced_fumbles,
            StatField::TacklesForLoss => self.tackles_for_loss,
            StatField::QbHits => self.qb_hits,
        }
    }

    /// Stat value with the missing-column default applied.
    pub fn stat(&self, field: StatField) -> f64 {
        self.get(field).unwrap_or(0.0)
    }

    pub fn set(&mut self, field: StatField, value: Option<f64>) {
        let slot = match field {
            StatField::Age => &mut self.age,
            StatField::Games => &mut self.games,
            StatField::Wins => &mut self.wins,
            StatField::Losses => &mut self.losses,
            StatField::Attempts => &mut self.attempts,
            StatField::Yards => &mut self.yards,
            StatField::Touchdowns => &mut self.touchdowns,
            StatField::Interceptions => &mut self.interceptions,
            StatField::Rating => &mut self.rating,
            StatField::CompletionPct => &mut self.completion_pct,
            StatField::YardsPerAttempt => &mut self.yards_per_attempt,
            StatField::Receptions => &mut self.receptions,
            StatField::YardsPerReception => &mut self.yards_per_reception,
            StatField::Tackles => &mut self.tackles,
            StatField::CombinedTackles => &mut self.combined_tackles,
            StatField::SoloTackles => &mut self.solo_tackles,
            StatField::Sacks => &mut self.sacks,
            StatField::PassDeflections => &mut self.pass_deflections,
            StatField::ForcedFumbles => &mut self.forced_fumbles,
            StatField::TacklesForLoss => &mut self.tackles_for_loss,
            StatField::QbHits => &mut self.qb_hits,
        };
        *slot = value;
    }

    pub fn with(mut self, field: StatField, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }
}

/// A normalized category table. `columns` lists the labels normalization
/// recognized, in source order; `records` has unique, non-empty names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatTable {
    pub category: StatCategory,
    pub columns: Vec<String>,
    pub records: Vec<PlayerRecord>,
}

impl StatTable {
    pub fn empty(category: StatCategory) -> Self {
        Self {
            category,
            columns: Vec::new(),
            records: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Renders the table back into raw form using only the recognized columns.
    pub fn to_raw(&self) -> RawTable {
        let headers = self.columns.iter().map(|c| vec![c.clone()]).collect();
        let rows = self
            .records
            .iter()
            .map(|rec| {
                self.columns
                    .iter()
                    .map(|col| cell_for(self.category, rec, col))
                    .collect()
            })
            .collect();
        RawTable { headers, rows }
    }
}

pub fn normalize_table(category: StatCategory, raw: &RawTable) -> StatTable {
    let labels = dedupe_labels(raw.headers.iter().map(|levels| innermost_label(levels)));
    let index: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let Some(&player_idx) = index.get(PLAYER_COL) else {
        debug!(category = category.slug(), "no player column, empty table");
        return StatTable::empty(category);
    };
    let team_col = TEAM_COLS.iter().copied().find(|c| index.contains_key(c));
    let numeric = numeric_columns(category);
    let use_qb_record = category == StatCategory::Passing
        && index.contains_key(QB_RECORD_COL)
        && !index.contains_key("W")
        && !index.contains_key("L");

    let mut columns = Vec::new();
    for label in &labels {
        let l = label.as_str();
        if l == PLAYER_COL || Some(l) == team_col || l == POS_COL || l == AWARDS_COL {
            columns.push(label.clone());
        } else if l == QB_RECORD_COL && use_qb_record {
            columns.push("W".to_string());
            columns.push("L".to_string());
        } else if numeric.iter().any(|(name, _)| *name == l) {
            columns.push(label.clone());
        }
    }

    let mut records = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let (mut blank, mut header_rows, mut repeats) = (0usize, 0usize, 0usize);

    for row in &raw.rows {
        let cell = |idx: usize| -> Option<&str> {
            row.get(idx)
                .and_then(|c| c.as_deref())
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };

        let Some(name) = cell(player_idx) else {
            blank += 1;
            continue;
        };
        if name == PLAYER_COL {
            header_rows += 1;
            continue;
        }
        if !seen.insert(name.to_string()) {
            repeats += 1;
            continue;
        }

        let mut rec = PlayerRecord::named(name);
        let text = |col: &str| index.get(col).and_then(|&i| cell(i)).map(str::to_string);
        rec.team = team_col.and_then(text);
        rec.position = text(POS_COL);
        rec.awards = text(AWARDS_COL);

        for (label, field) in numeric {
            let Some(&idx) = index.get(label) else {
                continue;
            };
            let value = match field {
                StatField::Age => parse_number(cell(idx)),
                _ => Some(parse_number(cell(idx)).unwrap_or(0.0)),
            };
            rec.set(*field, value);
        }
        if use_qb_record {
            let (w, l) = index
                .get(QB_RECORD_COL)
                .and_then(|&i| cell(i))
                .and_then(parse_qb_record)
                .unwrap_or((0.0, 0.0));
            rec.wins = Some(w);
            rec.losses = Some(l);
        }

        records.push(rec);
    }

    debug!(
        category = category.slug(),
        kept = records.len(),
        blank,
        header_rows,
        repeats,
        "normalized stat table"
    );

    StatTable {
        category,
        columns,
        records,
    }
}

fn innermost_label(levels: &[String]) -> String {
    levels
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Later repeats of a label become `label_1`, `label_2`, ... so the bare
/// label always names the first occurrence. Suffixes already used by a
/// source label are skipped.
fn dedupe_labels(labels: impl Iterator<Item = String>) -> Vec<String> {
    let labels: Vec<String> = labels.collect();
    let source: HashSet<&str> = labels.iter().map(String::as_str).collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();
    let mut out = Vec::with_capacity(labels.len());
    for label in &labels {
        if taken.insert(label.clone()) {
            out.push(label.clone());
            continue;
        }
        let n = next_suffix.entry(label.as_str()).or_insert(0);
        loop {
            *n += 1;
            let candidate = format!("{label}_{n}");
            if !source.contains(candidate.as_str()) && taken.insert(candidate.clone()) {
                out.push(candidate);
                break;
            }
        }
    }
    out
}

fn parse_number(cell: Option<&str>) -> Option<f64> {
    cell?.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// "13-4-0" -> (13, 4)
fn parse_qb_record(raw: &str) -> Option<(f64, f64)> {
    let mut parts = raw.split('-').map(|p| p.trim().parse::<f64>().ok());
    let wins = parts.next()??;
    let losses = parts.next()??;
    Some((wins, losses))
}

fn cell_for(category: StatCategory, rec: &PlayerRecord, col: &str) -> Option<String> {
    match col {
        PLAYER_COL => Some(rec.name.clone()),
        POS_COL => rec.position.clone(),
        AWARDS_COL => rec.awards.clone(),
        c if TEAM_COLS.contains(&c) => rec.team.clone(),
        "W" => rec.wins.map(|v| v.to_string()),
        "L" => rec.losses.map(|v| v.to_string()),
        c => numeric_columns(category)
            .iter()
            .find(|(label, _)| *label == c)
            .and_then(|(_, field)| rec.get(*field))
            .map(|v| v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn innermost_label_skips_blank_levels() {
        let levels = vec!["Passing".to_string(), "Yds".to_string()];
        assert_eq!(innermost_label(&levels), "Yds");
        let levels = vec!["Rushing".to_string(), " ".to_string()];
        assert_eq!(innermost_label(&levels), "Rushing");
    }

    #[test]
    fn repeated_labels_get_suffixes() {
        let labels = ["Yds", "TD", "Yds", "Yds"].iter().map(|s| s.to_string());
        assert_eq!(dedupe_labels(labels), vec!["Yds", "TD", "Yds_1", "Yds_2"]);
    }

    #[test]
    fn suffixes_skip_labels_already_in_source() {
        let labels = ["Yds", "Yds_1", "Yds", "Yds"].iter().map(|s| s.to_string());
        assert_eq!(dedupe_labels(labels), vec!["Yds", "Yds_1", "Yds_2", "Yds_3"]);
        let labels = ["TD", "TD", "TD_1"].iter().map(|s| s.to_string());
        assert_eq!(dedupe_labels(labels), vec!["TD", "TD_2", "TD_1"]);
    }

    #[test]
    fn qb_record_parses_wins_and_losses() {
        assert_eq!(parse_qb_record("13-4-0"), Some((13.0, 4.0)));
        assert_eq!(parse_qb_record("7-10"), Some((7.0, 10.0)));
        assert_eq!(parse_qb_record("QBrec"), None);
    }

    #[test]
    fn numbers_reject_non_finite_text() {
        assert_eq!(parse_number(Some("101.4")), Some(101.4));
        assert_eq!(parse_number(Some("NaN")), None);
        assert_eq!(parse_number(Some("--")), None);
        assert_eq!(parse_number(None), None);
    }
}
