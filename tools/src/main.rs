//! demo-data: generate the sample metrics database, or serve it.
//!
//! Usage:
//!   demo-data generate --db sample_data.db --seed 42
//!   demo-data generate --config demo.json --start 2024-01-27 --end 2026-01-26
//!   demo-data serve --db sample_data.db

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use demo_data_core::{
    config::GeneratorConfig, generator::Generator, server::ToolServer, sql_tools::SqlTools,
    summary::GenerationSummary,
};
use std::io;
use std::path::PathBuf;

const DEFAULT_DB: &str = "sample_data.db";

#[derive(Parser)]
#[command(name = "demo-data", version, about = "Synthetic LearnFlow metrics database")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Delete and regenerate the database.
    Generate {
        #[arg(long, default_value = DEFAULT_DB)]
        db: PathBuf,
        /// JSON file overriding any generator setting.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        /// First day, YYYY-MM-DD.
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day (inclusive), YYYY-MM-DD.
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Serve the read-only SQL tools over stdio (JSON-RPC).
    Serve {
        #[arg(long, default_value = DEFAULT_DB)]
        db: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Generate { db, config, seed, start, end } => {
            let mut cfg = match config {
                Some(path) => GeneratorConfig::load(&path)?,
                None => GeneratorConfig::default(),
            };
            if let Some(seed) = seed {
                cfg.seed = seed;
            }
            if let Some(start) = start {
                cfg.start_date = start;
            }
            if let Some(end) = end {
                cfg.end_date = end;
            }

            let mut generator = Generator::build(cfg).context("invalid generator config")?;
            let summary = generator.run_to_path(&db)?;
            print_summary(&summary);
            println!();
            println!("Database saved to: {}", db.display());
        }
        Command::Serve { db } => {
            if !db.exists() {
                log::warn!("{} does not exist yet; every tool call will report an error", db.display());
            }
            log::info!("Serving {} on stdio", db.display());
            let server = ToolServer::new(SqlTools::new(db));
            let stdin = io::stdin();
            server.serve(stdin.lock(), io::stdout())?;
        }
    }
    Ok(())
}

fn print_summary(summary: &GenerationSummary) {
    println!("--- Data Summary ---");
    println!("  seed:            {}", summary.seed);
    for (table, rows) in &summary.table_counts {
        println!("  {table:<16} {rows} rows");
    }
    match summary.date_range {
        Some((min, max)) => println!("  date range:      {min} to {max}"),
        None => println!("  date range:      (no daily rows)"),
    }

    println!();
    println!("--- {} Ticket Trend (Monthly) ---", capitalize(&summary.trend_category));
    println!("Month      | Total | Match  | Share %");
    println!("-----------|-------|--------|----------");
    for m in &summary.monthly_trend {
        println!(
            "{}    | {:5} | {:6} | {:6}%",
            m.month, m.total_tickets, m.matching_tickets, m.matching_pct
        );
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
