use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatCategory {
    Passing,
    Rushing,
    Receiving,
    Defense,
}

impl StatCategory {
    pub const ALL: [StatCategory; 4] = [
        StatCategory::Passing,
        StatCategory::Rushing,
        StatCategory::Receiving,
        StatCategory::Defense,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            StatCategory::Passing => "passing",
            StatCategory::Rushing => "rushing",
            StatCategory::Receiving => "receiving",
            StatCategory::Defense => "defense",
        }
    }
}

/// A parsed stat table exactly as the source delivered it.
///
/// `headers[i]` holds every header level of column `i`, outermost first
/// (a single-level table has one label per column). Cells keep their raw
/// text; `None` marks an empty or null cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<Vec<String>>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| vec![(*h).to_string()]).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, cells: &[&str]) {
        self.rows.push(
            cells
                .iter()
                .map(|c| if c.is_empty() { None } else { Some((*c).to_string()) })
                .collect(),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() || self.rows.is_empty()
    }
}

/// One season's worth of raw category tables. Missing categories stay empty.
#[derive(Debug, Clone, Default)]
pub struct SeasonSnapshot {
    pub passing: RawTable,
    pub rushing: RawTable,
    pub receiving: RawTable,
    pub defense: RawTable,
}

impl SeasonSnapshot {
    pub fn table(&self, category: StatCategory) -> &RawTable {
        match category {
            StatCategory::Passing => &self.passing,
            StatCategory::Rushing => &self.rushing,
            StatCategory::Receiving => &self.receiving,
            StatCategory::Defense => &self.defense,
        }
    }

    pub fn table_mut(&mut self, category: StatCategory) -> &mut RawTable {
        match category {
            StatCategory::Passing => &mut self.passing,
            StatCategory::Rushing => &mut self.rushing,
            StatCategory::Receiving => &mut self.receiving,
            StatCategory::Defense => &mut self.defense,
        }
    }

    /// Reads `<dir>/<category>.json` for every category. Unreadable or
    /// malformed files leave that category empty.
    pub fn load_dir(dir: &Path) -> Self {
        let mut out = Self::default();
        for category in StatCategory::ALL {
            let path = dir.join(format!("{}.json", category.slug()));
            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(path = %path.display(), %err, "snapshot unavailable, using empty table");
                    continue;
                }
            };
            match parse_snapshot_json(&raw) {
                Ok(table) => *out.table_mut(category) = table,
                Err(err) => {
                    warn!(path = %path.display(), err = %format!("{err:#}"), "snapshot unreadable, using empty table");
                }
            }
        }
        out
    }
}

/// Parses a snapshot of the form `{"columns": [...], "rows": [...]}`.
///
/// A column is either a label or an array of header levels. A row is either
/// an array of cells aligned with `columns` or an object keyed by the
/// innermost column label. Cells may be strings, numbers, booleans or null.
pub fn parse_snapshot_json(raw: &str) -> Result<RawTable> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(RawTable::default());
    }
    let v: Value = serde_json::from_str(trimmed).context("invalid snapshot json")?;

    let headers: Vec<Vec<String>> = v
        .get("columns")
        .and_then(|c| c.as_array())
        .map(|cols| cols.iter().map(parse_header).collect())
        .unwrap_or_default();

    let mut rows = Vec::new();
    if let Some(arr) = v.get("rows").and_then(|r| r.as_array()) {
        for row in arr {
            match row {
                Value::Array(cells) => {
                    let mut out: Vec<Option<String>> = cells.iter().map(cell_text).collect();
                    out.resize(headers.len(), None);
                    rows.push(out);
                }
                Value::Object(map) => {
                    let out = headers
                        .iter()
                        .map(|levels| {
                            levels
                                .last()
                                .and_then(|label| map.get(label))
                                .and_then(cell_text)
                        })
                        .collect();
                    rows.push(out);
                }
                _ => {}
            }
        }
    }

    Ok(RawTable { headers, rows })
}

fn parse_header(v: &Value) -> Vec<String> {
    match v {
        Value::Array(levels) => levels
            .iter()
            .filter_map(|l| l.as_str())
            .map(|s| s.to_string())
            .collect(),
        Value::String(s) => vec![s.clone()],
        other => vec![other.to_string()],
    }
}

fn cell_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}
