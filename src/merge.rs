use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::{PlayerRecord, StatField, StatTable};

/// Rushing totals borrowed from the rushing table. Unmatched players carry zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AuxiliaryStats {
    pub rush_touchdowns: f64,
    pub rush_yards: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub record: PlayerRecord,
    pub aux: AuxiliaryStats,
}

impl MergedRecord {
    pub fn standalone(record: PlayerRecord) -> Self {
        Self {
            record,
            aux: AuxiliaryStats::default(),
        }
    }

    pub fn total_touchdowns(&self) -> f64 {
        self.record.stat(StatField::Touchdowns) + self.aux.rush_touchdowns
    }
}

/// Left-joins rushing totals onto `primary` by exact player name.
///
/// Only rushing rows whose `Pos` equals `position` are considered. The join
/// does no fuzzy matching: a name spelled differently in the two tables
/// simply gets zeros.
pub fn attach_rushing(primary: &StatTable, rushing: &StatTable, position: &str) -> Vec<MergedRecord> {
    let lookup: HashMap<&str, AuxiliaryStats> = rushing
        .records
        .iter()
        .filter(|r| r.position.as_deref() == Some(position))
        .map(|r| {
            (
                r.name.as_str(),
                AuxiliaryStats {
                    rush_touchdowns: r.stat(StatField::Touchdowns),
                    rush_yards: r.stat(StatField::Yards),
                },
            )
        })
        .collect();

    let mut matched = 0usize;
    let out: Vec<MergedRecord> = primary
        .records
        .iter()
        .map(|rec| {
            let aux = match lookup.get(rec.name.as_str()) {
                Some(aux) => {
                    matched += 1;
                    *aux
                }
                None => AuxiliaryStats::default(),
            };
            MergedRecord {
                record: rec.clone(),
                aux,
            }
        })
        .collect();

    debug!(
        primary = primary.category.slug(),
        rows = out.len(),
        matched,
        position,
        "attached rushing totals"
    );
    out
}

/// Wraps every record of a table with zeroed auxiliary stats.
pub fn without_auxiliary(table: &StatTable) -> Vec<MergedRecord> {
    table
        .records
        .iter()
        .cloned()
        .map(MergedRecord::standalone)
        .collect()
}
