//! CLI command definitions for recordbook
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod export;
pub mod import;
pub mod query;

use crate::format::OutputFormat;
use crate::types::{Category, Field};
use clap::{Args, Parser, Subcommand};
use export::ExportArgs;
use import::ImportArgs;
use query::QueryArgs;
use std::path::PathBuf;

/// Personal records manager: keep honors, credentials and accounts in a
/// local SQLite file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a record
    Add(AddArgs),

    /// List records (default if no subcommand given)
    List(ListArgs),

    /// Show one record
    Show(ShowArgs),

    /// Change one field of a record
    Update(UpdateArgs),

    /// Delete one or more records
    Delete(DeleteArgs),

    /// Import records from a CSV file
    Import(ImportArgs),

    /// Export records to a CSV file
    Export(ExportArgs),

    /// Show totals and records per category
    Stats,

    /// Start the web dashboard
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Record title (required)
    #[arg(short, long)]
    pub title: String,

    /// Person the record belongs to
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// honor, education, competition, certificate, account or other
    /// (default: `records.default_category`)
    #[arg(long)]
    pub category: Option<Category>,

    /// Free-form notes
    #[arg(long, default_value = "")]
    pub notes: String,
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub id: i64,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: i64,

    /// name, title, category, created_at or notes
    pub field: Field,

    pub value: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record ids to delete
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<i64>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port for the web dashboard (overrides `server.ui.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_filters() {
        let cli = Cli::try_parse_from([
            "recordbook",
            "list",
            "--search",
            "math",
            "--filter",
            "category=honor,competition",
            "--sort",
            "created_at",
            "--desc",
            "--format",
            "json",
        ])
        .unwrap();

        let Some(Command::List(args)) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.format, OutputFormat::Json);
        let query = args.query.to_query();
        assert_eq!(query.search.as_deref(), Some("math"));
        assert_eq!(query.filters[0].values.len(), 2);
    }

    #[test]
    fn test_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["recordbook", "stats", "--database", "x.db", "-v"]).unwrap();
        assert_eq!(cli.database, Some(PathBuf::from("x.db")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Command::Stats)));
    }

    #[test]
    fn test_date_preset_conflicts_with_range() {
        let result = Cli::try_parse_from([
            "recordbook",
            "list",
            "--date",
            "week",
            "--from",
            "2024-01-01",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_requires_ids() {
        assert!(Cli::try_parse_from(["recordbook", "delete"]).is_err());
        let cli = Cli::try_parse_from(["recordbook", "delete", "3", "5"]).unwrap();
        let Some(Command::Delete(args)) = cli.command else {
            panic!("expected delete");
        };
        assert_eq!(args.ids, vec![3, 5]);
    }

    #[test]
    fn test_update_parses_field() {
        let cli =
            Cli::try_parse_from(["recordbook", "update", "4", "category", "certificate"]).unwrap();
        let Some(Command::Update(args)) = cli.command else {
            panic!("expected update");
        };
        assert_eq!(args.field, Field::Category);
        assert_eq!(args.value, "certificate");
    }
}
