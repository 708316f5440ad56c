pub mod config;
pub mod dashboard;
pub mod export;
pub mod report;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::importer::load_file;
use crate::reports::ViewModel;
use crate::settings::{shellexpand_path, Settings};

/// Path given with `--file`, or the configured data file.
pub fn data_path(file: Option<&str>, settings: &Settings) -> PathBuf {
    match file {
        Some(f) => PathBuf::from(shellexpand_path(f)),
        None => settings.data_path(),
    }
}

pub(crate) fn load_view_model(path: &Path) -> Result<ViewModel> {
    Ok(ViewModel::new(Arc::new(load_file(path)?)))
}

#[derive(Parser)]
#[command(
    name = "painel",
    version,
    about = "Terminal dashboard for electrical panel component budgets."
)]
pub struct Cli {
    /// Spreadsheet or CSV to load (default: the configured data file)
    #[arg(long, global = true)]
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the budget KPIs: total cost, parts, models, top manufacturer.
    Summary,
    /// Show components as cards.
    Gallery {
        /// Only show this manufacturer (repeatable)
        #[arg(long = "manufacturer", short = 'm')]
        manufacturers: Vec<String>,
        /// Cards per line (default from settings)
        #[arg(long)]
        columns: Option<usize>,
    },
    /// Show the analytic table of line items.
    Table {
        /// Sort key
        #[arg(
            long,
            default_value = "total",
            value_parser = ["tag", "component", "manufacturer", "quantity", "unit-price", "total"]
        )]
        sort: String,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
        /// Only show this manufacturer (repeatable)
        #[arg(long = "manufacturer", short = 'm')]
        manufacturers: Vec<String>,
    },
    /// Show one component in detail.
    Detail {
        /// Component name (default: the first component in the file)
        component: Option<String>,
    },
    /// Export the normalized line items to a spreadsheet or CSV.
    Export {
        /// Output path (default: <export dir>/orcamento-YYYY-MM-DD.xlsx)
        #[arg(long, short = 'o')]
        output: Option<String>,
        /// Output format: xlsx or csv (default: from the output extension, else xlsx)
        #[arg(long, value_parser = ["xlsx", "csv"])]
        format: Option<String>,
    },
    /// Open the interactive dashboard.
    Dashboard,
    /// Show or update settings.
    Config {
        /// Default data file
        #[arg(long = "data-file")]
        data_file: Option<String>,
        /// Currency symbol used when formatting amounts
        #[arg(long)]
        currency: Option<String>,
        /// Gallery cards per line
        #[arg(long)]
        columns: Option<usize>,
        /// Default export directory
        #[arg(long = "export-dir")]
        export_dir: Option<String>,
    },
    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
