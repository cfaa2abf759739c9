//! intelplat - cyber incident, IT ticket and dataset metadata tracker
//!
//! Subcommands:
//! - `setup`: create the schema and bootstrap it from the data directory
//! - `demo`: setup, sample registration and incident, then a short summary
//! - `report`: every aggregate for incidents, datasets and tickets
//!
//! The data directory (`DATA/` by default) holds the CSV files and the
//! database. Config: `$XDG_CONFIG_HOME/intelplat/config.toml`.

mod auth;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use intelplat_core::{ingest, Config, Database, GroupCount, NewIncident, SetupSummary, TableOutcome};
use std::path::{Path, PathBuf};

const DEMO_USER: &str = "alice";
const DEMO_PASSWORD: &str = "SecurePass123!";
const DEMO_ROLE: &str = "analyst";

/// Incident types with more cases than this are listed by `demo`
const MANY_CASES_THRESHOLD: i64 = 5;

/// How many datasets `report` lists by size
const TOP_DATASETS: usize = 5;

#[derive(Parser)]
#[command(name = "intelplat")]
#[command(about = "Track cyber incidents, IT tickets and dataset metadata")]
#[command(version)]
struct Args {
    /// Directory with the bootstrap CSV files and the database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Database file (default: <data-dir>/intelligence_platform.db)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Also log to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema and load the bootstrap files
    Setup,

    /// Run setup, register a sample user and record a sample incident
    Demo,

    /// Print grouped counts for all entities
    Report {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration, then apply command-line overrides
    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(dir) = args.data_dir {
        config.storage.data_dir = Some(dir);
        config.storage.database_path = None;
    }
    if let Some(path) = args.database {
        config.storage.database_path = Some(path);
    }

    let _log_guard = intelplat_core::logging::init(&config.logging, args.verbose)
        .context("failed to initialize logging")?;

    let data_dir = config.storage.data_dir();
    let db_path = config.storage.database_path();
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    match args.command.unwrap_or(Command::Demo) {
        Command::Setup => {
            let summary = run_setup(&db, &data_dir)?;
            println!("Database: {}", db_path.display());
            print_setup_summary(&summary);
        }
        Command::Demo => run_demo(&db, &data_dir)?,
        Command::Report { format } => {
            db.migrate().context("failed to create schema")?;
            match format {
                OutputFormat::Text => print_text_report(&db)?,
                OutputFormat::Json => print_json_report(&db)?,
            }
        }
    }

    Ok(())
}

fn run_setup(db: &Database, data_dir: &Path) -> Result<SetupSummary> {
    ingest::setup_database(db, data_dir)
        .with_context(|| format!("failed to set up database from {}", data_dir.display()))
}

fn print_setup_summary(summary: &SetupSummary) {
    println!("Users migrated: {}", summary.users_migrated);

    println!("\nCSV load:");
    for (table, outcome) in &summary.load.tables {
        match outcome {
            TableOutcome::Loaded(n) => println!("  {:<18} loaded {} rows", table.name(), n),
            TableOutcome::SkippedNonEmpty => {
                println!("  {:<18} skipped (already has data)", table.name())
            }
            TableOutcome::FileMissing(path) => {
                println!("  {:<18} file not found: {}", table.name(), path.display())
            }
        }
    }

    println!("\nRow counts:");
    for (table, count) in &summary.table_counts {
        println!("  {:<18} {}", table.name(), count);
    }
}

fn run_demo(db: &Database, data_dir: &Path) -> Result<()> {
    run_setup(db, data_dir)?;

    println!("{}", "=".repeat(60));
    println!("Intelligence Platform Demo");
    println!("{}", "=".repeat(60));

    // Auth failures must not stop the demo
    if let Err(e) = demo_auth(db) {
        println!("Auth step skipped due to error: {e:#}");
    }

    let incident = NewIncident {
        date: Some("2024-11-05".to_string()),
        status: "Open".to_string(),
        description: Some("Suspicious email detected".to_string()),
        reported_by: Some(DEMO_USER.to_string()),
        ..NewIncident::new("Phishing", "High")
    };
    let id = db
        .insert_incident(&incident)
        .context("failed to insert sample incident")?;
    println!("Inserted incident id: {id}");

    let incidents = db.list_incidents()?;
    println!("Total incidents: {}", incidents.len());

    print_counts("Incidents by Type", &db.count_incidents_by_type()?);
    print_counts(
        "High Severity Incidents by Status",
        &db.count_high_severity_incidents_by_status()?,
    );
    print_counts(
        &format!("Incident Types with Many Cases (>{MANY_CASES_THRESHOLD})"),
        &db.incident_types_with_count_above(MANY_CASES_THRESHOLD)?,
    );

    Ok(())
}

fn demo_auth(db: &Database) -> Result<()> {
    let outcome = auth::register_user(db, DEMO_USER, DEMO_PASSWORD, DEMO_ROLE)?;
    println!("{}", outcome.message(DEMO_USER));

    if !outcome.is_success() {
        let login = auth::login_user(db, DEMO_USER, DEMO_PASSWORD)?;
        println!("{}", login.message(DEMO_USER));
    }
    Ok(())
}

fn print_counts(title: &str, counts: &[GroupCount]) {
    println!("\n{title}:");
    if counts.is_empty() {
        println!("  (no rows)");
    }
    for group in counts {
        println!("  {:<24} {}", group.label(), group.count);
    }
}

fn print_text_report(db: &Database) -> Result<()> {
    println!("Incidents: {}", db.list_incidents()?.len());
    print_counts("By type", &db.count_incidents_by_type()?);
    print_counts("By status", &db.count_incidents_by_status()?);
    print_counts(
        "High severity by status",
        &db.count_high_severity_incidents_by_status()?,
    );

    println!("\nDatasets: {}", db.list_datasets()?.len());
    print_counts("By category", &db.count_datasets_by_category()?);
    print_counts("Largest by record count", &db.top_datasets_by_record_count(TOP_DATASETS)?);

    println!("\nTickets: {}", db.list_tickets()?.len());
    print_counts("By status", &db.count_tickets_by_status()?);
    print_counts("By priority", &db.count_tickets_by_priority()?);

    Ok(())
}

fn print_json_report(db: &Database) -> Result<()> {
    let output = serde_json::json!({
        "incidents": {
            "total": db.list_incidents()?.len(),
            "by_type": db.count_incidents_by_type()?,
            "by_status": db.count_incidents_by_status()?,
            "high_severity_by_status": db.count_high_severity_incidents_by_status()?,
        },
        "datasets": {
            "total": db.list_datasets()?.len(),
            "by_category": db.count_datasets_by_category()?,
            "largest": db.top_datasets_by_record_count(TOP_DATASETS)?,
        },
        "tickets": {
            "total": db.list_tickets()?.len(),
            "by_status": db.count_tickets_by_status()?,
            "by_priority": db.count_tickets_by_priority()?,
        },
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
