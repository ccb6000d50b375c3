//! Recordbook
//!
//! Command-line front end and web dashboard for a personal records table
//! kept in SQLite.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use recordbook::cli::export::ExportArgs;
use recordbook::cli::import::ImportArgs;
use recordbook::cli::{
    AddArgs, Cli, Command, DeleteArgs, ListArgs, ServeArgs, ShowArgs, UpdateArgs,
};
use recordbook::config::{Config, ConfigLoader, ConfigPaths};
use recordbook::csv_io::{
    gzip_bytes, import_csv, parse_import, preview_csv, read_csv_file, records_to_csv,
};
use recordbook::dashboard::{self, DashboardStatus};
use recordbook::db::Database;
use recordbook::error::RecordError;
use recordbook::format::{
    format_csv_preview, format_record_detail, format_records, format_stats,
};
use recordbook::logging::{LogTarget, init_logging};
use recordbook::types::NewRecord;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut paths = ConfigPaths::discover();
    if let Some(ref config_path) = cli.config {
        paths = paths.with_config_file(config_path);
    }
    let mut loader = ConfigLoader::load_with_paths(paths)?;
    for (tier, source) in loader.sources() {
        debug!(%tier, path = %source.display(), "Config file merged");
    }

    // CLI flags override every config tier
    if let Some(ref db_path) = cli.database {
        loader.config_mut().server.db_path = db_path.clone();
    }
    let config = loader.into_config();

    let db = open_database(&config)?;

    match cli
        .command
        .unwrap_or_else(|| Command::List(ListArgs::default()))
    {
        Command::Add(args) => run_add(&db, &config, args)?,
        Command::List(args) => run_list(&db, args)?,
        Command::Show(args) => run_show(&db, args)?,
        Command::Update(args) => run_update(&db, args)?,
        Command::Delete(args) => run_delete(&db, args)?,
        Command::Import(args) => run_import(&db, &config, args)?,
        Command::Export(args) => run_export(&db, &config, args)?,
        Command::Stats => run_stats(&db)?,
        Command::Serve(args) => run_serve(Arc::new(db), config, args).await?,
    }

    Ok(())
}

fn open_database(config: &Config) -> Result<Database> {
    config.ensure_db_dir()?;
    let path = &config.server.db_path;
    Database::open(path).with_context(|| format!("opening database {}", path.display()))
}

fn run_add(db: &Database, config: &Config, args: AddArgs) -> Result<()> {
    let category = args
        .category
        .unwrap_or(config.records.default_category);
    let record = db.insert_record(
        NewRecord::new(args.title, category)
            .with_name(args.name)
            .with_notes(args.notes),
    )?;

    eprintln!("Added record #{}", record.id);
    print!("{}", format_record_detail(&record));
    Ok(())
}

fn run_list(db: &Database, args: ListArgs) -> Result<()> {
    let records = db.query_records(&args.query.to_query())?;
    print!("{}", format_records(&records, args.format)?);
    Ok(())
}

fn run_show(db: &Database, args: ShowArgs) -> Result<()> {
    let record = db
        .get_record(args.id)?
        .ok_or_else(|| RecordError::not_found(args.id))?;
    print!("{}", format_record_detail(&record));
    Ok(())
}

fn run_update(db: &Database, args: UpdateArgs) -> Result<()> {
    let record = db.update_field(args.id, args.field, &args.value)?;
    eprintln!("Updated {} of record #{}", args.field, record.id);
    print!("{}", format_record_detail(&record));
    Ok(())
}

fn run_delete(db: &Database, args: DeleteArgs) -> Result<()> {
    if let [id] = args.ids.as_slice() {
        db.delete_record(*id)?;
        eprintln!("Deleted record #{}", id);
        return Ok(());
    }

    let removed = db.delete_records(&args.ids)?;
    if removed < args.ids.len() {
        eprintln!(
            "Warning: {} of the given ids did not exist",
            args.ids.len() - removed
        );
    }
    eprintln!("Deleted {} record(s)", removed);
    Ok(())
}

/// Run the import command
fn run_import(db: &Database, config: &Config, args: ImportArgs) -> Result<()> {
    let content = read_csv_file(&args.file).map_err(RecordError::import_failed)?;

    if args.dry_run {
        let limit = args.preview_limit(config.records.preview_rows);
        let preview = preview_csv(content.as_slice(), limit).map_err(RecordError::import_failed)?;
        print!("{}", format_csv_preview(&preview));

        let parsed = parse_import(content.as_slice()).map_err(RecordError::import_failed)?;
        for warning in &parsed.warnings {
            eprintln!("Warning: {}", warning);
        }
        eprintln!(
            "Dry run: would import {} record(s), skip {} without a title",
            parsed.records.len(),
            parsed.skipped
        );
        return Ok(());
    }

    let report = import_csv(db, content.as_slice())?;
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }
    eprintln!(
        "Imported {} record(s) from {}, skipped {} without a title",
        report.imported,
        args.file.display(),
        report.skipped
    );
    Ok(())
}

/// Run the export command
fn run_export(db: &Database, config: &Config, args: ExportArgs) -> Result<()> {
    let query = args.query.to_query();
    let records = db.query_records(&query)?;
    let csv = records_to_csv(&records)?;

    let threshold = args.compress_threshold_bytes(config.export.gzip_threshold_bytes());
    let compress = args.should_compress(threshold, csv.len() as u64);
    let data = if compress { gzip_bytes(&csv)? } else { csv };

    match args.output_path(query.is_filtered(), &Local::now(), compress) {
        Some(path) => {
            std::fs::write(&path, &data)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(count = records.len(), path = %path.display(), compress, "Export written");
            eprintln!(
                "Exported {} record(s) to {}{}",
                records.len(),
                path.display(),
                if compress { " (gzipped)" } else { "" }
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            out.write_all(&data)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn run_stats(db: &Database) -> Result<()> {
    print!("{}", format_stats(&db.stats()?));
    Ok(())
}

/// Run the dashboard until Ctrl+C.
async fn run_serve(db: Arc<Database>, mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(port) = args.port {
        config.server.ui.port = port;
    }

    info!("Database: {:?}", config.server.db_path);

    let mut handle =
        dashboard::start_server_with_retry(db, &config.server.ui, config.records.clone());
    eprintln!(
        "Dashboard starting on http://127.0.0.1:{} (Ctrl+C to stop)",
        config.server.ui.port
    );

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                break;
            }
            status = handle.changed() => {
                match status {
                    DashboardStatus::Running => info!("Dashboard is up"),
                    DashboardStatus::Retrying => warn!("Dashboard port busy, retrying"),
                    DashboardStatus::Stopped => break,
                }
            }
        }
    }

    info!("Shutting down");
    handle.shutdown();
    Ok(())
}
