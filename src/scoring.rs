use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::award::Award;
use crate::merge::{MergedRecord, without_auxiliary};
use crate::normalize::{PlayerRecord, StatField, StatTable};
use crate::rookie::{RookieRule, is_rookie};

pub const DEFAULT_TOP_N: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// A band applies once the value reaches its threshold.
    AtLeast,
    /// A band applies while the value stays at or under its threshold.
    AtMost,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub threshold: f64,
    pub points: f64,
}

/// Linear fallback below the lowest `AtLeast` band: `max(0, v - offset) * per_unit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Taper {
    pub offset: f64,
    pub per_unit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bands {
    pub direction: Direction,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub taper: Option<Taper>,
}

impl Bands {
    pub fn at_least(steps: &[(f64, f64)]) -> Self {
        Self::build(Direction::AtLeast, steps)
    }

    pub fn at_most(steps: &[(f64, f64)]) -> Self {
        Self::build(Direction::AtMost, steps)
    }

    fn build(direction: Direction, steps: &[(f64, f64)]) -> Self {
        Self {
            direction,
            steps: steps
                .iter()
                .map(|&(threshold, points)| Step { threshold, points })
                .collect(),
            taper: None,
        }
    }

    pub fn with_taper(mut self, offset: f64, per_unit: f64) -> Self {
        self.taper = Some(Taper { offset, per_unit });
        self
    }

    /// Best award among the bands the value satisfies. Taking the max keeps
    /// the result monotonic in the value whatever order the steps are listed in.
    pub fn points(&self, value: f64) -> f64 {
        let hit = self
            .steps
            .iter()
            .filter(|s| match self.direction {
                Direction::AtLeast => value >= s.threshold,
                Direction::AtMost => value <= s.threshold,
            })
            .map(|s| s.points)
            .fold(None, |best: Option<f64>, p| Some(best.map_or(p, |b| b.max(p))));

        match (hit, self.taper, self.direction) {
            (Some(p), _, _) => p,
            (None, Some(t), Direction::AtLeast) => (value - t.offset).max(0.0) * t.per_unit,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    #[serde(default = "unit_weight")]
    pub weight: f64,
    pub bands: Bands,
}

fn unit_weight() -> f64 {
    1.0
}

impl Factor {
    pub fn new(bands: Bands) -> Self {
        Self { weight: 1.0, bands }
    }

    /// An unknown value contributes nothing.
    pub fn contribution(&self, value: Option<f64>) -> f64 {
        value.map_or(0.0, |v| self.weight * self.bands.points(v))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MvpModel {
    pub total_touchdowns: Factor,
    pub team_wins: Factor,
    pub passer_rating: Factor,
    pub interceptions: Factor,
    pub rushing_touchdowns: Factor,
}

impl Default for MvpModel {
    fn default() -> Self {
        Self {
            total_touchdowns: Factor::new(
                Bands::at_least(&[(40.0, 35.0), (35.0, 30.0), (30.0, 25.0), (25.0, 20.0)])
                    .with_taper(15.0, 1.5),
            ),
            team_wins: Factor::new(Bands::at_least(&[
                (13.0, 25.0),
                (11.0, 20.0),
                (9.0, 15.0),
                (7.0, 10.0),
            ])),
            passer_rating: Factor::new(Bands::at_least(&[
                (110.0, 20.0),
                (100.0, 15.0),
                (95.0, 10.0),
                (90.0, 5.0),
            ])),
            interceptions: Factor::new(Bands::at_most(&[(5.0, 10.0), (8.0, 8.0), (12.0, 5.0)])),
            rushing_touchdowns: Factor::new(Bands::at_least(&[
                (12.0, 10.0),
                (8.0, 8.0),
                (5.0, 5.0),
                (3.0, 3.0),
            ])),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuarterbackTrack {
    pub rookie: RookieRule,
    pub rushing_yards: Factor,
    pub total_touchdowns: Factor,
    pub team_wins: Factor,
    pub passer_rating: Factor,
    pub passing_yards: Factor,
    /// Candidates must score strictly above this.
    pub min_score: f64,
}

impl Default for QuarterbackTrack {
    fn default() -> Self {
        Self {
            rookie: RookieRule::oroy_quarterback(),
            rushing_yards: Factor::new(Bands::at_least(&[
                (800.0, 40.0),
                (500.0, 30.0),
                (200.0, 20.0),
            ])),
            total_touchdowns: Factor::new(Bands::at_least(&[
                (30.0, 15.0),
                (25.0, 10.0),
                (20.0, 5.0),
            ])),
            team_wins: Factor::new(Bands::at_least(&[
                (12.0, 25.0),
                (10.0, 20.0),
                (8.0, 15.0),
                (6.0, 10.0),
            ])),
            passer_rating: Factor::new(Bands::at_least(&[
                (100.0, 20.0),
                (90.0, 15.0),
                (85.0, 10.0),
            ])),
            passing_yards: Factor::new(Bands::at_least(&[
                (3500.0, 15.0),
                (3000.0, 10.0),
                (2500.0, 5.0),
            ])),
            min_score: 0.0,
        }
    }
}

/// Rushing / receiving rookie track: `yards / yards_per_point
/// + touchdowns * per_touchdown + receptions * per_reception`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTrack {
    pub position_label: String,
    pub rookie: RookieRule,
    /// Players above this age, or with no known age, are never eligible,
    /// even with an award tag.
    pub age_ceiling: Option<f64>,
    /// Only the first rows of the table (source order) are considered.
    pub scan_limit: Option<usize>,
    pub yards_per_point: f64,
    pub per_touchdown: f64,
    #[serde(default)]
    pub per_reception: f64,
}

impl LinearTrack {
    pub fn rusher() -> Self {
        Self {
            position_label: "RB".to_string(),
            rookie: RookieRule::oroy_skill_position(),
            age_ceiling: Some(25.0),
            scan_limit: Some(50),
            yards_per_point: 25.0,
            per_touchdown: 6.0,
            per_reception: 0.0,
        }
    }

    pub fn receiver() -> Self {
        Self {
            position_label: "WR/TE".to_string(),
            rookie: RookieRule::oroy_skill_position(),
            age_ceiling: Some(25.0),
            scan_limit: Some(50),
            yards_per_point: 18.0,
            per_touchdown: 5.0,
            per_reception: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OroyModel {
    pub quarterback: QuarterbackTrack,
    pub rusher: LinearTrack,
    pub receiver: LinearTrack,
}

impl Default for OroyModel {
    fn default() -> Self {
        Self {
            quarterback: QuarterbackTrack::default(),
            rusher: LinearTrack::rusher(),
            receiver: LinearTrack::receiver(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroyModel {
    pub rookie: RookieRule,
    pub sacks: Factor,
    pub qb_hits: Factor,
    pub tackles_for_loss: Factor,
    pub tackles: Factor,
    pub interceptions: Factor,
    pub pass_deflections: Factor,
    pub forced_fumbles: Factor,
    /// Substrings of `Pos` that mark an edge rusher.
    pub edge_positions: Vec<String>,
    pub edge_bonus: f64,
    /// Candidates must score strictly above this.
    pub min_score: f64,
}

impl Default for DroyModel {
    fn default() -> Self {
        Self {
            rookie: RookieRule::droy(),
            sacks: Factor::new(Bands::at_least(&[
                (10.0, 35.0),
                (8.0, 30.0),
                (6.0, 25.0),
                (4.0, 20.0),
                (2.0, 15.0),
            ])),
            qb_hits: Factor::new(Bands::at_least(&[(15.0, 10.0), (10.0, 8.0), (5.0, 5.0)])),
            tackles_for_loss: Factor::new(Bands::at_least(&[(10.0, 5.0), (5.0, 3.0)])),
            tackles: Factor::new(Bands::at_least(&[
                (80.0, 15.0),
                (60.0, 12.0),
                (40.0, 10.0),
                (20.0, 8.0),
            ])),
            interceptions: Factor::new(Bands::at_least(&[(3.0, 8.0), (1.0, 5.0)])),
            pass_deflections: Factor::new(Bands::at_least(&[(10.0, 5.0), (5.0, 3.0)])),
            forced_fumbles: Factor::new(Bands::at_least(&[(2.0, 4.0), (1.0, 2.0)])),
            edge_positions: ["EDGE", "OLB", "DE", "LB"].iter().map(|s| s.to_string()).collect(),
            edge_bonus: 10.0,
            min_score: 0.0,
        }
    }
}

/// Hand-tuned weight tables for all three awards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwardModel {
    pub mvp: MvpModel,
    pub oroy: OroyModel,
    pub droy: DroyModel,
    pub top_n: usize,
}

impl Default for AwardModel {
    fn default() -> Self {
        Self {
            mvp: MvpModel::default(),
            oroy: OroyModel::default(),
            droy: DroyModel::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AwardModel {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid award model json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read award model {}", path.display()))?;
        Self::from_json(&raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: String,
    pub value: f64,
    pub points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub player: String,
    pub team: Option<String>,
    pub position: Option<String>,
    pub award: Award,
    pub score: f64,
    pub summary: String,
    pub factors: Vec<FactorScore>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Breakdown {
    pub score: f64,
    pub factors: Vec<FactorScore>,
}

impl Breakdown {
    fn add(&mut self, name: &str, factor: &Factor, value: Option<f64>) {
        let points = factor.contribution(value);
        self.push(name, value.unwrap_or(0.0), points);
    }

    /// Non-finite points (an overflowing weight table) count as zero.
    fn push(&mut self, name: &str, value: f64, points: f64) {
        let points = if points.is_finite() { points } else { 0.0 };
        self.score += points;
        self.factors.push(FactorScore {
            factor: name.to_string(),
            value,
            points,
        });
    }

    fn floored(mut self) -> Self {
        self.score = if self.score.is_finite() {
            self.score.max(0.0)
        } else {
            0.0
        };
        self
    }
}

pub fn mvp_breakdown(model: &MvpModel, rec: &MergedRecord) -> Breakdown {
    let r = &rec.record;
    let mut out = Breakdown::default();
    out.add("total_touchdowns", &model.total_touchdowns, Some(rec.total_touchdowns()));
    // a win count without a loss column is not a team record
    out.add("team_wins", &model.team_wins, r.wins.filter(|_| r.losses.is_some()));
    out.add("passer_rating", &model.passer_rating, r.rating);
    out.add("interceptions", &model.interceptions, r.interceptions);
    out.add("rushing_touchdowns", &model.rushing_touchdowns, Some(rec.aux.rush_touchdowns));
    out.floored()
}

pub fn score_mvp(model: &MvpModel, rec: &MergedRecord) -> f64 {
    mvp_breakdown(model, rec).score
}

pub fn oroy_quarterback_breakdown(track: &QuarterbackTrack, rec: &MergedRecord) -> Breakdown {
    let r = &rec.record;
    let mut out = Breakdown::default();
    out.add("rushing_yards", &track.rushing_yards, Some(rec.aux.rush_yards));
    out.add("total_touchdowns", &track.total_touchdowns, Some(rec.total_touchdowns()));
    out.add("team_wins", &track.team_wins, r.wins);
    out.add("passer_rating", &track.passer_rating, r.rating);
    out.add("passing_yards", &track.passing_yards, r.yards);
    out.floored()
}

pub fn oroy_linear_breakdown(track: &LinearTrack, rec: &MergedRecord) -> Breakdown {
    let r = &rec.record;
    let mut out = Breakdown::default();
    if track.per_reception != 0.0 {
        let rec_count = r.stat(StatField::Receptions);
        out.push("receptions", rec_count, rec_count * track.per_reception);
    }
    let yards = r.stat(StatField::Yards);
    let yard_points = if track.yards_per_point > 0.0 {
        yards / track.yards_per_point
    } else {
        0.0
    };
    out.push("yards", yards, yard_points);
    let tds = r.stat(StatField::Touchdowns);
    out.push("touchdowns", tds, tds * track.per_touchdown);
    out.floored()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OroyTrack {
    Quarterback,
    Rusher,
    Receiver,
}

pub fn score_oroy(model: &OroyModel, track: OroyTrack, rec: &MergedRecord) -> f64 {
    match track {
        OroyTrack::Quarterback => oroy_quarterback_breakdown(&model.quarterback, rec).score,
        OroyTrack::Rusher => oroy_linear_breakdown(&model.rusher, rec).score,
        OroyTrack::Receiver => oroy_linear_breakdown(&model.receiver, rec).score,
    }
}

pub fn droy_breakdown(model: &DroyModel, rec: &MergedRecord) -> Breakdown {
    let r = &rec.record;
    let mut out = Breakdown::default();
    out.add("sacks", &model.sacks, r.sacks);
    out.add("qb_hits", &model.qb_hits, r.qb_hits);
    out.add("tackles_for_loss", &model.tackles_for_loss, r.tackles_for_loss);
    out.add("tackles", &model.tackles, total_tackles(r));
    out.add("interceptions", &model.interceptions, r.interceptions);
    out.add("pass_deflections", &model.pass_deflections, r.pass_deflections);
    out.add("forced_fumbles", &model.forced_fumbles, r.forced_fumbles);
    let edge = is_edge_rusher(model, r.position.as_deref());
    out.push("edge_position", if edge { 1.0 } else { 0.0 }, if edge { model.edge_bonus } else { 0.0 });
    out.floored()
}

pub fn score_droy(model: &DroyModel, rec: &MergedRecord) -> f64 {
    droy_breakdown(model, rec).score
}

/// Larger of `Comb` and `Tkl` among the columns present.
fn total_tackles(r: &PlayerRecord) -> Option<f64> {
    match (r.combined_tackles, r.tackles) {
        (Some(comb), Some(tkl)) => Some(comb.max(tkl)),
        (comb, tkl) => comb.or(tkl),
    }
}

fn is_edge_rusher(model: &DroyModel, position: Option<&str>) -> bool {
    let Some(pos) = position else {
        return false;
    };
    model.edge_positions.iter().any(|p| pos.contains(p.as_str()))
}

/// Orders by score, highest first. Equal scores keep their input order.
pub fn rank_candidates(mut candidates: Vec<Candidate>, top_n: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(top_n);
    candidates
}

pub fn rank_mvp(model: &AwardModel, passing: &[MergedRecord]) -> Vec<Candidate> {
    let candidates: Vec<Candidate> = passing
        .par_iter()
        .map(|rec| {
            let b = mvp_breakdown(&model.mvp, rec);
            candidate(Award::Mvp, rec, b, mvp_summary(rec))
        })
        .collect();
    finish(Award::Mvp, candidates, model.top_n)
}

pub fn rank_oroy(
    model: &AwardModel,
    quarterbacks: &[MergedRecord],
    rushing: &StatTable,
    receiving: &StatTable,
) -> Vec<Candidate> {
    let qb = &model.oroy.quarterback;
    let mut candidates: Vec<Candidate> = quarterbacks
        .par_iter()
        .filter(|rec| is_rookie(&rec.record, &qb.rookie))
        .map(|rec| {
            let b = oroy_quarterback_breakdown(qb, rec);
            let summary = format!(
                "{} Rush Yds, {} Total TDs",
                rec.aux.rush_yards,
                rec.total_touchdowns()
            );
            let mut c = candidate(Award::Oroy, rec, b, summary);
            c.position = Some("QB".to_string());
            c
        })
        .filter(|c| c.score > qb.min_score)
        .collect();

    for (track, table) in [(&model.oroy.rusher, rushing), (&model.oroy.receiver, receiving)] {
        candidates.extend(linear_track_candidates(track, table));
    }

    finish(Award::Oroy, candidates, model.top_n)
}

fn linear_track_candidates(track: &LinearTrack, table: &StatTable) -> Vec<Candidate> {
    let limit = track.scan_limit.unwrap_or(usize::MAX);
    let rows = without_auxiliary(table);
    rows.par_iter()
        .take(limit)
        .filter(|rec| is_rookie(&rec.record, &track.rookie))
        .filter(|rec| match (track.age_ceiling, rec.record.age) {
            (Some(ceiling), Some(age)) => age <= ceiling,
            (Some(_), None) => false,
            (None, _) => true,
        })
        .map(|rec| {
            let b = oroy_linear_breakdown(track, rec);
            let summary = format!(
                "{} {} Yds",
                rec.record.stat(StatField::Yards),
                table.category.slug()
            );
            let mut c = candidate(Award::Oroy, rec, b, summary);
            c.position = Some(track.position_label.clone());
            c
        })
        .collect()
}

pub fn rank_droy(model: &AwardModel, defense: &StatTable) -> Vec<Candidate> {
    let droy = &model.droy;
    let rows = without_auxiliary(defense);
    let candidates: Vec<Candidate> = rows
        .par_iter()
        .filter(|rec| is_rookie(&rec.record, &droy.rookie))
        .map(|rec| {
            let b = droy_breakdown(droy, rec);
            let summary = format!(
                "{} Sk, {} Tkl",
                rec.record.stat(StatField::Sacks),
                total_tackles(&rec.record).unwrap_or(0.0)
            );
            candidate(Award::Droy, rec, b, summary)
        })
        .filter(|c| c.score > droy.min_score)
        .collect();
    finish(Award::Droy, candidates, model.top_n)
}

fn candidate(award: Award, rec: &MergedRecord, b: Breakdown, summary: String) -> Candidate {
    Candidate {
        player: rec.record.name.clone(),
        team: rec.record.team.clone(),
        position: rec.record.position.clone(),
        award,
        score: b.score,
        summary,
        factors: b.factors,
    }
}

fn mvp_summary(rec: &MergedRecord) -> String {
    format!(
        "{} Total TDs, {} W, {} Rate",
        rec.total_touchdowns(),
        rec.record.stat(StatField::Wins),
        rec.record.stat(StatField::Rating)
    )
}

fn finish(award: Award, candidates: Vec<Candidate>, top_n: usize) -> Vec<Candidate> {
    let scored = candidates.len();
    let ranked = rank_candidates(candidates, top_n);
    match ranked.first() {
        Some(top) => info!(
            award = award.code(),
            scored,
            kept = ranked.len(),
            top = %top.player,
            score = top.score,
            "ranked award candidates"
        ),
        None => info!(award = award.code(), "no award candidates"),
    }
    ranked
}
