//! sqlite-data-migrate CLI - schema-tolerant SQLite snapshot migration.

mod picker;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sqlite_data_migrate::{archive, catalog, MigrateError, Migrator};
use tempfile::TempDir;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "sqlite-data-migrate")]
#[command(about = "Schema-tolerant data migration between SQLite snapshots")]
#[command(version)]
struct Cli {
    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate data from a source snapshot into a destination snapshot
    Run {
        /// Source database or zip archive (prompted interactively when omitted)
        #[arg(long)]
        source: Option<PathBuf>,

        /// Destination database or zip archive
        #[arg(long)]
        dest: PathBuf,

        /// Additional table names to exclude from migration
        #[arg(long = "exclude", value_name = "TABLE")]
        excluded: Vec<String>,
    },

    /// List the tables and columns of a database
    Inspect {
        /// Database file to inspect
        #[arg(long)]
        db: PathBuf,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    match cli.command {
        Commands::Run {
            source,
            dest,
            excluded,
        } => run_migration(cli.output_json, source, dest, excluded),
        Commands::Inspect { db } => inspect(cli.output_json, &db),
    }
}

fn run_migration(
    output_json: bool,
    source: Option<PathBuf>,
    dest: PathBuf,
    excluded: Vec<String>,
) -> Result<(), MigrateError> {
    let source = match source {
        Some(path) => path,
        None => picker::prompt_source()?,
    };

    // Archive containers are unpacked next to the run and the database
    // located inside; the temp dirs live until the run is over.
    let (source_db, _source_dir) = resolve_snapshot(&source)?;
    let (dest_db, dest_dir) = resolve_snapshot(&dest)?;

    let outcome = Migrator::new().with_excluded(excluded).run(&source_db, &dest_db)?;

    // A zip destination is repackaged in place with the migrated database.
    if let Some(ref dir) = dest_dir {
        info!("Repackaging destination archive {}", dest.display());
        archive::repackage(dir.path(), &dest)?;
    }

    if output_json {
        println!("{}", outcome.to_json()?);
    } else {
        print!("{}", outcome.summary());
    }

    if outcome.is_clean() {
        Ok(())
    } else {
        Err(MigrateError::transfer(
            outcome
                .errored
                .iter()
                .map(|t| t.table.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            "one or more tables failed to migrate",
        ))
    }
}

/// Resolve a snapshot argument to a database file path.
///
/// Zip archives are extracted into a temp dir and the database located
/// inside it; plain paths pass through. The returned guard keeps an
/// extracted tree alive for the duration of the run.
fn resolve_snapshot(path: &Path) -> Result<(PathBuf, Option<TempDir>), MigrateError> {
    if path.extension().is_some_and(|ext| ext == "zip") {
        let dir = TempDir::new()?;
        info!("Extracting archive {}", path.display());
        archive::extract(path, dir.path())?;
        let db = archive::find_database_file(dir.path())?;
        Ok((db, Some(dir)))
    } else {
        Ok((path.to_path_buf(), None))
    }
}

fn inspect(output_json: bool, db: &Path) -> Result<(), MigrateError> {
    let tables = catalog::inspect_database(db)?;

    if output_json {
        let report: Vec<_> = tables
            .iter()
            .map(|t| {
                serde_json::json!({
                    "table": t.name,
                    "columns": t.columns,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{} tables in {}", tables.len(), db.display());
        for t in &tables {
            println!("  {} ({} columns): {}", t.name, t.columns.len(), t.columns.join(", "));
        }
    }
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
