//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tabula", version, about = "Filter and edit a remote record table")]
pub struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Server root, overrides the settings file and TABULA_BASE_URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Resource segment of the endpoint paths (e.g. productos, almacenes)
    #[arg(long, global = true)]
    pub resource: Option<String>,

    /// Write JSON logs to the log directory as well as the console
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the rows that pass the filters
    List(TableArgs),

    /// Delete the selected rows
    Delete {
        #[command(flatten)]
        table: TableArgs,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Create a record from --field values
    Insert {
        #[command(flatten)]
        table: TableArgs,

        #[command(flatten)]
        form: FormArgs,
    },

    /// Edit the single selected row with --field values
    Update {
        #[command(flatten)]
        table: TableArgs,

        #[command(flatten)]
        form: FormArgs,
    },
}

impl Command {
    pub fn table_args(&self) -> &TableArgs {
        match self {
            Self::List(table)
            | Self::Delete { table, .. }
            | Self::Insert { table, .. }
            | Self::Update { table, .. } => table,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    /// Table snapshot JSON file
    #[arg(long, value_name = "FILE")]
    pub snapshot: PathBuf,

    /// Text filter, case-insensitive substring (repeatable)
    #[arg(long = "text", value_name = "COLUMN=NEEDLE", value_parser = parse_assignment)]
    pub text_filters: Vec<(String, String)>,

    /// Inclusive numeric range, either side may be empty (repeatable)
    #[arg(long = "range", value_name = "COLUMN=MIN..MAX", value_parser = parse_range)]
    pub range_filters: Vec<RangeArg>,

    /// Check the row with this identifier (repeatable)
    #[arg(long = "check", value_name = "ID")]
    pub checked_ids: Vec<String>,

    /// Check every row that passes the filters
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Form value (repeatable)
    #[arg(long = "field", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub fields: Vec<(String, String)>,
}

/// `--range` value, bounds kept as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeArg {
    pub column: String,
    pub min: String,
    pub max: String,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{}`", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing name before `=` in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_range(s: &str) -> Result<RangeArg, String> {
    let (column, bounds) = parse_assignment(s)?;
    let (min, max) = bounds
        .split_once("..")
        .ok_or_else(|| format!("expected COLUMN=MIN..MAX, got `{}`", s))?;
    Ok(RangeArg {
        column,
        min: min.to_string(),
        max: max.to_string(),
    })
}
