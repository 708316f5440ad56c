use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::error::Result;
use crate::fmt::{money, quantity, truncate};
use crate::reports::{Summary, ViewMode, ViewModel, ViewOptions};
use crate::settings::Settings;

pub const CARD_NAME_WIDTH: usize = 25;
const CARD_TEXT_WIDTH: usize = 28;
const BAR_WIDTH: usize = 20;

/// Render one view of the loaded rows as plain text.
pub fn render(vm: &ViewModel, opts: &ViewOptions, settings: &Settings) -> Result<String> {
    let currency = settings.currency.as_str();
    match opts.mode {
        ViewMode::Gallery => Ok(format_gallery(vm, opts, currency)),
        ViewMode::Table => Ok(format_table(vm, opts, currency)),
        ViewMode::Detail => format_detail(vm, opts.component.as_deref(), currency),
    }
}

/// KPI block followed by the table view, used when stdout is not a terminal.
pub fn overview(vm: &ViewModel, settings: &Settings) -> String {
    let opts = ViewOptions::default();
    format!(
        "{}\n\n{}",
        format_summary(&vm.summary, &settings.currency),
        format_table(vm, &opts, &settings.currency)
    )
}

// ---------------------------------------------------------------------------
// Formatters
// ---------------------------------------------------------------------------

pub fn format_summary(s: &Summary, currency: &str) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Total Cost", "Total Parts", "Distinct Models", "Top Manufacturer"]);
    table.add_row(vec![
        Cell::new(money(currency, s.total_cost).green().bold()),
        Cell::new(quantity(s.total_parts)),
        Cell::new(s.distinct_models),
        Cell::new(&s.top_manufacturer),
    ]);
    format!("Budget Summary\n{table}")
}

pub fn format_gallery(vm: &ViewModel, opts: &ViewOptions, currency: &str) -> String {
    let rows = vm.filtered(&opts.manufacturers);
    if rows.is_empty() {
        return "No components found.".to_string();
    }

    let per_line = opts.gallery_columns.max(1);
    let mut table = Table::new();
    for chunk in rows.chunks(per_line) {
        let mut cells: Vec<Cell> = chunk
            .iter()
            .map(|r| {
                let name = truncate(&r.component, CARD_NAME_WIDTH);
                let card = format!(
                    "{}\n{}\n{}\n{} | {}\nQtd: {} un.",
                    name.bold(),
                    money(currency, r.unit_price).green(),
                    textwrap::fill(&r.description, CARD_TEXT_WIDTH).dimmed(),
                    r.manufacturer,
                    r.model,
                    quantity(r.quantity),
                );
                Cell::new(card)
            })
            .collect();
        // Pad the last line so every line has the same number of cells.
        while cells.len() < per_line {
            cells.push(Cell::new(""));
        }
        table.add_row(cells);
    }

    let filter = if opts.manufacturers.is_empty() {
        "all manufacturers".to_string()
    } else {
        opts.manufacturers.join(", ")
    };
    format!("Gallery ({} components, {filter})\n{table}", rows.len())
}

pub fn format_table(vm: &ViewModel, opts: &ViewOptions, currency: &str) -> String {
    let rows = vm.table_rows(opts);
    if rows.is_empty() {
        return "No components found.".to_string();
    }

    let max = vm.max_line_total();
    let mut table = Table::new();
    table.set_header(vec![
        "Tag", "Component", "Function", "Brand", "Qty", "Unit", "Total", "Share",
    ]);
    for r in &rows {
        table.add_row(vec![
            Cell::new(&r.tag),
            Cell::new(&r.component),
            Cell::new(truncate(&r.description, 40)),
            Cell::new(&r.manufacturer),
            Cell::new(quantity(r.quantity)).set_alignment(CellAlignment::Right),
            Cell::new(money(currency, r.unit_price)).set_alignment(CellAlignment::Right),
            Cell::new(money(currency, r.line_total).bold()).set_alignment(CellAlignment::Right),
            Cell::new(cost_bar(r.line_total, max, BAR_WIDTH).cyan()),
        ]);
    }
    let direction = if opts.descending { "desc" } else { "asc" };
    format!(
        "Components ({} rows, sorted by {} {direction})\n{table}",
        rows.len(),
        opts.sort.key()
    )
}

pub fn format_detail(vm: &ViewModel, component: Option<&str>, currency: &str) -> Result<String> {
    let row = vm.detail(component)?;
    let mut table = Table::new();
    let fields: Vec<(&str, String)> = vec![
        ("Image", row.image_url.clone()),
        ("Description", row.description.clone()),
        ("Manufacturer", row.manufacturer.clone()),
        ("Model", row.model.clone()),
        ("Tag", row.tag.clone()),
        ("Unit Price", money(currency, row.unit_price)),
        ("Quantity", quantity(row.quantity)),
        ("Line Total", money(currency, row.line_total)),
    ];
    for (label, value) in fields {
        table.add_row(vec![Cell::new(label.bold()), Cell::new(value)]);
    }
    Ok(format!("{}\n{table}", row.component.bold()))
}

/// Horizontal bar proportional to `value / max`, `width` cells at most.
pub fn cost_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max) * width as f64).round() as usize;
    "\u{2588}".repeat(filled.clamp(1, width))
}
