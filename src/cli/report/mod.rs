pub mod text;

use std::io::IsTerminal;
use std::path::Path;

use crate::cli::{dashboard, load_view_model};
use crate::error::Result;
use crate::reports::{SortKey, ViewMode, ViewModel, ViewOptions};
use crate::settings::Settings;

/// Bare `painel`: the dashboard on a terminal, plain text otherwise.
pub fn overview(path: &Path, settings: &Settings) -> Result<()> {
    if std::io::stdout().is_terminal() {
        dashboard::run(path, settings.clone())
    } else {
        let vm = load_view_model(path)?;
        println!("{}", text::overview(&vm, settings));
        Ok(())
    }
}

pub fn summary(vm: &ViewModel, settings: &Settings) -> Result<()> {
    println!("{}", text::format_summary(&vm.summary, &settings.currency));
    Ok(())
}

pub fn gallery(
    vm: &ViewModel,
    settings: &Settings,
    manufacturers: Vec<String>,
    columns: Option<usize>,
) -> Result<()> {
    let opts = ViewOptions {
        mode: ViewMode::Gallery,
        manufacturers,
        gallery_columns: columns.unwrap_or(settings.gallery_columns),
        ..ViewOptions::default()
    };
    println!("{}", text::render(vm, &opts, settings)?);
    Ok(())
}

pub fn table(
    vm: &ViewModel,
    settings: &Settings,
    sort: &str,
    ascending: bool,
    manufacturers: Vec<String>,
) -> Result<()> {
    let opts = ViewOptions {
        mode: ViewMode::Table,
        manufacturers,
        sort: SortKey::from_key(sort).unwrap_or(SortKey::Total),
        descending: !ascending,
        ..ViewOptions::default()
    };
    println!("{}", text::render(vm, &opts, settings)?);
    Ok(())
}

pub fn detail(vm: &ViewModel, settings: &Settings, component: Option<String>) -> Result<()> {
    let opts = ViewOptions {
        mode: ViewMode::Detail,
        component,
        ..ViewOptions::default()
    };
    println!("{}", text::render(vm, &opts, settings)?);
    Ok(())
}
