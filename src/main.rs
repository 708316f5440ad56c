mod cache;
mod categorizer;
mod cli;
mod error;
mod export;
mod fmt;
mod importer;
mod models;
mod normalizer;
mod reports;
mod settings;
mod tui;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use cli::config::ConfigUpdate;
use cli::{data_path, load_view_model, Cli, Commands};
use error::PainelError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        if let Some(PainelError::NotFound(path)) = e.downcast_ref::<PainelError>() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| settings::DEFAULT_DATA_FILE.to_string());
            eprintln!(
                "Rename your component spreadsheet to '{name}' and place it in the working directory, \
                 or point to it with --file (or `painel config --data-file`)."
            );
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = settings::load_settings();
    let path = data_path(cli.file.as_deref(), &settings);
    let load = || {
        load_view_model(&path).with_context(|| format!("loading {}", path.display()))
    };

    match cli.command {
        None => cli::report::overview(&path, &settings)?,
        Some(Commands::Summary) => cli::report::summary(&load()?, &settings)?,
        Some(Commands::Gallery {
            manufacturers,
            columns,
        }) => cli::report::gallery(&load()?, &settings, manufacturers, columns)?,
        Some(Commands::Table {
            sort,
            asc,
            manufacturers,
        }) => cli::report::table(&load()?, &settings, &sort, asc, manufacturers)?,
        Some(Commands::Detail { component }) => cli::report::detail(&load()?, &settings, component)?,
        Some(Commands::Export { output, format }) => {
            cli::export::run(&load()?.rows, output, format, &settings).context("export failed")?
        }
        Some(Commands::Dashboard) => cli::dashboard::run(&path, settings)?,
        Some(Commands::Config {
            data_file,
            currency,
            columns,
            export_dir,
        }) => cli::config::run(ConfigUpdate {
            data_file,
            currency,
            columns,
            export_dir,
        })?,
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "painel", &mut std::io::stdout());
        }
    }
    Ok(())
}
