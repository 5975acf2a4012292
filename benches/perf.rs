use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use nfl_awards::merge::attach_rushing;
use nfl_awards::normalize::normalize_table;
use nfl_awards::pipeline::predict_season;
use nfl_awards::scoring::{AwardModel, rank_droy, rank_mvp};
use nfl_awards::snapshot::{RawTable, SeasonSnapshot, StatCategory, parse_snapshot_json};

fn push_cells(raw: &mut RawTable, cells: Vec<String>) {
    let refs: Vec<&str> = cells.iter().map(String::as_str).collect();
    raw.push_row(&refs);
}

fn synthetic_passing(rows: usize) -> RawTable {
    let mut raw = RawTable::new(&[
        "Rk", "Player", "Team", "Age", "Pos", "G", "QBrec", "Cmp%", "Yds", "TD", "Int", "Y/A", "Rate",
        "Awards",
    ]);
    for idx in 0..rows {
        let rank = (idx + 1).to_string();
        let name = format!("Passer {idx}");
        let age = (21 + idx % 15).to_string();
        let record = format!("{}-{}-0", idx % 14, 17 - idx % 14);
        let yards = (1500 + idx * 37 % 3500).to_string();
        let tds = (idx % 45).to_string();
        let ints = (idx % 18).to_string();
        let rate = format!("{:.1}", 70.0 + (idx % 50) as f64);
        push_cells(
            &mut raw,
            vec![
                rank,
                name,
                "TST".into(),
                age,
                "QB".into(),
                "17".into(),
                record,
                "65.0".into(),
                yards,
                tds,
                ints,
                "7.1".into(),
                rate,
                String::new(),
            ],
        );
    }
    raw
}

fn synthetic_rushing(rows: usize) -> RawTable {
    let mut raw = RawTable::new(&["Rk", "Player", "Team", "Age", "Pos", "G", "Att", "Yds", "TD", "Y/A"]);
    for idx in 0..rows {
        let rank = (idx + 1).to_string();
        let name = if idx % 3 == 0 {
            format!("Passer {idx}")
        } else {
            format!("Back {idx}")
        };
        let pos = if idx % 3 == 0 { "QB" } else { "RB" };
        let age = (21 + idx % 12).to_string();
        let yards = (100 + idx * 13 % 1800).to_string();
        let tds = (idx % 17).to_string();
        push_cells(
            &mut raw,
            vec![
                rank,
                name,
                "TST".into(),
                age,
                pos.into(),
                "17".into(),
                "200".into(),
                yards,
                tds,
                "4.5".into(),
            ],
        );
    }
    raw
}

fn synthetic_defense(rows: usize) -> RawTable {
    let mut raw = RawTable::new(&[
        "Rk", "Player", "Team", "Age", "Pos", "G", "Int", "PD", "FF", "Sk", "Comb", "Solo", "TFL",
        "QBHits", "Awards",
    ]);
    let positions = ["OLB", "DE", "DT", "CB", "S", "ILB"];
    for idx in 0..rows {
        let rank = (idx + 1).to_string();
        let name = format!("Defender {idx}");
        let age = (21 + idx % 10).to_string();
        let sacks = format!("{:.1}", (idx % 24) as f64 / 2.0);
        let comb = (idx * 7 % 140).to_string();
        push_cells(
            &mut raw,
            vec![
                rank,
                name,
                "TST".into(),
                age,
                positions[idx % positions.len()].into(),
                "17".into(),
                (idx % 5).to_string(),
                (idx % 14).to_string(),
                (idx % 3).to_string(),
                sacks,
                comb,
                "30".into(),
                (idx % 16).to_string(),
                (idx % 25).to_string(),
                String::new(),
            ],
        );
    }
    raw
}

fn bench_snapshot_parse(c: &mut Criterion) {
    c.bench_function("snapshot_parse", |b| {
        b.iter(|| {
            let table = parse_snapshot_json(black_box(PASSING_JSON)).unwrap();
            black_box(table.rows.len());
        })
    });
}

fn bench_normalize(c: &mut Criterion) {
    let raw = synthetic_passing(500);
    c.bench_function("normalize_passing_500", |b| {
        b.iter(|| {
            let table = normalize_table(StatCategory::Passing, black_box(&raw));
            black_box(table.len());
        })
    });
}

fn bench_mvp_ranking(c: &mut Criterion) {
    let model = AwardModel::default();
    let passing = normalize_table(StatCategory::Passing, &synthetic_passing(500));
    let rushing = normalize_table(StatCategory::Rushing, &synthetic_rushing(600));
    let merged = attach_rushing(&passing, &rushing, "QB");
    c.bench_function("mvp_rank_500", |b| {
        b.iter(|| {
            let ranked = rank_mvp(&model, black_box(&merged));
            black_box(ranked.len());
        })
    });
}

fn bench_droy_ranking(c: &mut Criterion) {
    let model = AwardModel::default();
    let defense = normalize_table(StatCategory::Defense, &synthetic_defense(1500));
    c.bench_function("droy_rank_1500", |b| {
        b.iter(|| {
            let ranked = rank_droy(&model, black_box(&defense));
            black_box(ranked.len());
        })
    });
}

fn bench_full_season(c: &mut Criterion) {
    let model = AwardModel::default();
    let snapshot = SeasonSnapshot {
        passing: synthetic_passing(100),
        rushing: synthetic_rushing(300),
        receiving: RawTable::default(),
        defense: synthetic_defense(800),
    };
    c.bench_function("predict_season", |b| {
        b.iter(|| {
            let preds = predict_season(2024, black_box(&snapshot), &model);
            black_box(preds.mvp.len());
        })
    });
}

criterion_group!(
    perf,
    bench_snapshot_parse,
    bench_normalize,
    bench_mvp_ranking,
    bench_droy_ranking,
    bench_full_season
);
criterion_main!(perf);

static PASSING_JSON: &str = include_str!("../tests/fixtures/season_2024/passing.json");
