use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, FixedOffset, Local};
use clap::{Parser, Subcommand};
use uuid::Uuid;

mod analytics;
mod db;
mod error;
mod export;
mod filter;
mod models;
mod report;
mod settings;
mod telemetry;

use export::ExportFormat;
use filter::DateRange;
use models::{EntryUpdate, NewEntry};

#[derive(Parser)]
#[command(name = "symptom-log")]
#[command(about = "Personal symptom log with severity trends", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the local database schema
    InitDb,
    /// Load a week or two of demo entries
    Seed,
    /// Delete every entry
    Clear {
        #[arg(long)]
        yes: bool,
    },
    /// Record a new symptom entry
    Log {
        #[arg(long)]
        symptom: String,
        #[arg(long)]
        severity: i32,
        #[arg(long, default_value = "")]
        notes: String,
        /// When the symptom happened (RFC 3339); defaults to now
        #[arg(long)]
        at: Option<DateTime<FixedOffset>>,
        /// Accept a symptom name outside the configured list
        #[arg(long)]
        allow_custom: bool,
    },
    /// Change the symptom, severity or notes of an entry
    Edit {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        symptom: Option<String>,
        #[arg(long)]
        severity: Option<i32>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        allow_custom: bool,
    },
    /// Remove an entry
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// List entries, newest first
    History {
        #[arg(long, value_enum, default_value_t = DateRange::All)]
        range: DateRange,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show per-symptom averages, trends and the last seven days
    Stats {
        #[arg(long, value_enum, default_value_t = DateRange::All)]
        range: DateRange,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a markdown report
    Report {
        #[arg(long, value_enum, default_value_t = DateRange::All)]
        range: DateRange,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export entries as CSV or JSON
    Export {
        #[arg(long, value_enum)]
        format: ExportFormat,
        #[arg(long, value_enum, default_value_t = DateRange::All)]
        range: DateRange,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Import entries from a CSV file (id,timestamp,symptom,severity,notes)
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Print the configured symptom names
    Symptoms,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing();

    let cli = Cli::parse();
    let settings = settings::load_settings().context("failed to load settings")?;

    match cli.command {
        Commands::Symptoms => {
            for name in &settings.symptoms {
                println!("{name}");
            }
        }
        Commands::InitDb => {
            open_store(&settings).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = open_store(&settings).await?;
            let inserted = db::seed(&pool, Local::now()).await?;
            println!("Seeded {inserted} entries.");
        }
        Commands::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to delete every entry without --yes");
            }
            let pool = open_store(&settings).await?;
            let removed = db::clear(&pool).await?;
            println!("Removed {removed} entries.");
        }
        Commands::Log {
            symptom,
            severity,
            notes,
            at,
            allow_custom,
        } => {
            let entry = NewEntry {
                symptom,
                severity,
                notes,
            };
            entry.validate(&settings.symptoms, allow_custom)?;
            let recorded_at = at
                .map(|at| at.with_timezone(&Local))
                .unwrap_or_else(Local::now);
            let pool = open_store(&settings).await?;
            let event = db::insert_event(&pool, &entry, recorded_at).await?;
            println!("Recorded {} (level {}) as {}.", event.symptom, event.severity, event.id);
        }
        Commands::Edit {
            id,
            symptom,
            severity,
            notes,
            allow_custom,
        } => {
            let update = EntryUpdate {
                symptom,
                severity,
                notes,
            };
            if update.is_empty() {
                anyhow::bail!("nothing to change: pass --symptom, --severity or --notes");
            }
            update.validate(&settings.symptoms, allow_custom)?;
            let pool = open_store(&settings).await?;
            match db::update_event(&pool, id, &update).await? {
                Some(event) => println!("Updated {}.", event.id),
                None => anyhow::bail!("no entry with id {id}"),
            }
        }
        Commands::Delete { id } => {
            let pool = open_store(&settings).await?;
            if db::delete_event(&pool, id).await? {
                println!("Deleted {id}.");
            } else {
                anyhow::bail!("no entry with id {id}");
            }
        }
        Commands::History { range, limit } => {
            let events = range.apply(&load_events(&settings).await?, Local::now());
            if events.is_empty() {
                println!("No entries recorded for {}.", range.label());
                return Ok(());
            }

            println!("Activity history ({} entries, {}):", events.len(), range.label());
            for event in events.iter().take(limit.unwrap_or(usize::MAX)) {
                println!("{}", report::history_line(event));
            }
        }
        Commands::Stats { range, json } => {
            let now = Local::now();
            let events = range.apply(&load_events(&settings).await?, now);
            let analytics = analytics::build_report(&events, now);

            if json {
                println!("{}", serde_json::to_string_pretty(&analytics)?);
                return Ok(());
            }
            if analytics.summaries.is_empty() {
                println!("No data available for {} yet.", range.label());
                return Ok(());
            }

            println!("Symptoms by frequency ({}):", range.label());
            for summary in report::by_frequency(&analytics) {
                println!("{}", report::summary_line(summary));
            }
            println!();
            println!("7-day severity:");
            for sample in &analytics.timeline {
                println!(
                    "  {}  {:>4.1}  ({} entries)",
                    sample.day.format("%b %d"),
                    sample.avg_severity,
                    sample.event_count
                );
            }
        }
        Commands::Report { range, out } => {
            let now = Local::now();
            let events = range.apply(&load_events(&settings).await?, now);
            let analytics = analytics::build_report(&events, now);
            let markdown = report::build_markdown(range, &analytics, &events);
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { format, range, out } => {
            let now = Local::now();
            let events = range.apply(&load_events(&settings).await?, now);
            let out = out.unwrap_or_else(|| format.default_file_name(now.date_naive()));
            export::write_export(&events, format, &out)?;
            println!("Exported {} entries to {}.", events.len(), out.display());
        }
        Commands::Import { csv } => {
            let pool = open_store(&settings).await?;
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} entries from {}.", csv.display());
        }
    }

    Ok(())
}

/// Opens the local database and brings its schema up to date.
async fn open_store(settings: &settings::Settings) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = db::connect(&settings.database_url).await?;
    db::init_db(&pool).await?;
    Ok(pool)
}

async fn load_events(settings: &settings::Settings) -> anyhow::Result<Vec<models::SymptomEvent>> {
    let pool = open_store(settings).await?;
    db::fetch_events(&pool).await
}
