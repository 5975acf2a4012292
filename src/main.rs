use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nfl_awards::accuracy::{analyze_patterns, low_accuracy_alert, summary_line};
use nfl_awards::award::Award;
use nfl_awards::config::{AppConfig, clamp_top_n, current_season};
use nfl_awards::history::{ActualWinners, load_actual_winners};
use nfl_awards::ledger::{JsonFileStore, LedgerStore, update_ledger};
use nfl_awards::pipeline::{AwardPredictions, commit_predictions, predict_season, reconcile_history};
use nfl_awards::scoring::AwardModel;
use nfl_awards::snapshot::SeasonSnapshot;

#[derive(Debug, Parser)]
#[command(name = "nfl_awards", about = "Award predictions from season stat snapshots, with an accuracy ledger")]
struct Cli {
    /// Ledger file (defaults to AWARDS_LEDGER_PATH or the user cache dir).
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a season snapshot directory (passing.json, rushing.json, ...).
    Predict {
        #[arg(long)]
        snapshot_dir: PathBuf,
        #[arg(long)]
        season: Option<i32>,
        #[arg(long)]
        model: Option<PathBuf>,
        #[arg(long)]
        top: Option<usize>,
        /// Record each award's top candidate in the ledger.
        #[arg(long)]
        commit: bool,
        /// Write the ranked candidates as JSON.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Attach actual winners to recorded predictions.
    Reconcile {
        /// Winners table; the bundled table is used when omitted.
        #[arg(long)]
        winners: Option<PathBuf>,
        #[arg(long)]
        season: Option<i32>,
        #[arg(long)]
        award: Option<Award>,
        #[arg(long)]
        winner: Option<String>,
    },
    /// Recompute and print accuracy metrics.
    Accuracy,
    /// List wrong predictions with tuning hints.
    Patterns,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = AppConfig::from_env();
    let store = JsonFileStore::new(cli.ledger.clone().unwrap_or_else(|| cfg.ledger_path.clone()));

    match cli.command {
        Command::Predict {
            snapshot_dir,
            season,
            model,
            top,
            commit,
            out,
        } => {
            let mut award_model = match model.or_else(|| cfg.model_path.clone()) {
                Some(path) => AwardModel::load(&path)?,
                None => AwardModel::default(),
            };
            award_model.top_n = clamp_top_n(top.unwrap_or(cfg.top_n));
            let season = season
                .or(cfg.season)
                .unwrap_or_else(|| current_season(Local::now().date_naive()));

            let snapshot = SeasonSnapshot::load_dir(&snapshot_dir);
            let predictions = predict_season(season, &snapshot, &award_model);
            print_predictions(&predictions);

            if let Some(path) = out {
                let json = serde_json::to_string_pretty(&predictions).context("serialize predictions")?;
                fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
            }
            if commit {
                let now = Utc::now();
                let inserted = update_ledger(&store, |ledger| {
                    let inserted = commit_predictions(ledger, &predictions, now);
                    ledger.refresh_performance(now);
                    inserted
                })?;
                println!(
                    "Committed {} new prediction(s) to {}",
                    inserted.len(),
                    store.path().display()
                );
            }
        }
        Command::Reconcile {
            winners,
            season,
            award,
            winner,
        } => {
            let table = match (season, award, winner) {
                (Some(season), Some(award), Some(winner)) => {
                    let mut table = ActualWinners::default();
                    table.insert(season, award, &winner);
                    table
                }
                (None, None, None) => match winners {
                    Some(path) => load_actual_winners(&path)?,
                    None => ActualWinners::builtin()?,
                },
                _ => bail!("--season, --award and --winner must be given together"),
            };
            let now = Utc::now();
            let updated = update_ledger(&store, |ledger| {
                let updated = reconcile_history(ledger, &table);
                ledger.refresh_performance(now);
                updated
            })?;
            println!("Updated {updated} prediction(s)");
        }
        Command::Accuracy => {
            let now = Utc::now();
            let snapshot = update_ledger(&store, |ledger| ledger.refresh_performance(now).clone())?;
            println!("{}", summary_line(&snapshot));
            for (award, acc) in &snapshot.by_award {
                println!(
                    "  {award}: {:.1}% ({}/{})",
                    acc.accuracy, acc.correct, acc.total
                );
            }
            if let Some(alert) = low_accuracy_alert(&snapshot, cfg.low_accuracy_pct) {
                println!("{alert}");
            }
        }
        Command::Patterns => {
            let ledger = store.load();
            let report = analyze_patterns(&ledger.predictions);
            if report.mistakes.is_empty() {
                println!("No incorrect predictions recorded");
            }
            for m in &report.mistakes {
                println!(
                    "{} {}: predicted {} over actual winner {}",
                    m.season, m.award, m.predicted, m.actual
                );
            }
            for r in &report.recommendations {
                println!("{}: {} -> {}", r.award, r.pattern, r.suggestion);
            }
        }
    }

    Ok(())
}

fn print_predictions(predictions: &AwardPredictions) {
    println!("Award predictions for the {} season", predictions.season);
    for award in Award::ALL {
        let list = predictions.for_award(award);
        println!();
        println!("{} ({})", award.label(), award);
        if list.is_empty() {
            println!("  no candidates");
            continue;
        }
        for (rank, c) in list.iter().enumerate() {
            println!(
                "  {:>2}. {:<28} {:<5} {:<6} {:>6.1}  {}",
                rank + 1,
                c.player,
                c.team.as_deref().unwrap_or("N/A"),
                c.position.as_deref().unwrap_or(""),
                c.score,
                c.summary
            );
        }
    }
}
