use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame,
};

use crate::cache::LoadCache;
use crate::cli::export::export_to;
use crate::cli::report::text::{cost_bar, CARD_NAME_WIDTH};
use crate::error::Result;
use crate::export::ExportFormat;
use crate::fmt::{quantity, truncate};
use crate::reports::{ViewMode, ViewModel, ViewOptions};
use crate::settings::Settings;
use crate::tui::{
    money_span, run_view, wrap_text, View, ViewAction, BAR_STYLE, FOOTER_STYLE, HEADER_ROW_STYLE,
    HEADER_STYLE, SELECTED_STYLE, STATUS_STYLE,
};

const CARD_HEIGHT: u16 = 8;
const BAR_WIDTH: usize = 12;

pub struct Dashboard {
    cache: LoadCache,
    path: PathBuf,
    settings: Settings,
    vm: ViewModel,
    opts: ViewOptions,
    /// 0 shows every manufacturer; `i` selects the i-th distinct one.
    filter_idx: usize,
    detail_idx: usize,
    offset: usize,
    visible_count: usize,
    status_message: Option<String>,
}

impl Dashboard {
    pub fn new(cache: LoadCache, path: PathBuf, settings: Settings, vm: ViewModel) -> Self {
        let opts = ViewOptions {
            gallery_columns: settings.gallery_columns.max(1),
            ..ViewOptions::default()
        };
        Self {
            cache,
            path,
            settings,
            vm,
            opts,
            filter_idx: 0,
            detail_idx: 0,
            offset: 0,
            visible_count: 1,
            status_message: None,
        }
    }

    fn manufacturers(&self) -> Vec<String> {
        self.vm
            .rows
            .manufacturers()
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn components(&self) -> Vec<String> {
        self.vm
            .rows
            .components()
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn set_mode(&mut self, mode: ViewMode) {
        self.opts.mode = mode;
        self.offset = 0;
    }

    fn cycle_filter(&mut self) {
        let manufacturers = self.manufacturers();
        self.filter_idx = (self.filter_idx + 1) % (manufacturers.len() + 1);
        self.opts.manufacturers = match self.filter_idx {
            0 => Vec::new(),
            i => vec![manufacturers[i - 1].clone()],
        };
        self.offset = 0;
    }

    fn move_detail(&mut self, forward: bool) {
        let count = self.components().len();
        if count == 0 {
            return;
        }
        self.detail_idx = if forward {
            (self.detail_idx + 1).min(count - 1)
        } else {
            self.detail_idx.saturating_sub(1)
        };
    }

    /// Number of scrollable lines in the current mode.
    fn line_count(&self) -> usize {
        match self.opts.mode {
            ViewMode::Table => self.vm.table_rows(&self.opts).len(),
            ViewMode::Gallery => self
                .vm
                .filtered(&self.opts.manufacturers)
                .len()
                .div_ceil(self.opts.gallery_columns.max(1)),
            ViewMode::Detail => 0,
        }
    }

    fn scroll(&mut self, delta: isize) {
        let max = self.line_count().saturating_sub(self.visible_count);
        self.offset = self.offset.saturating_add_signed(delta).min(max);
    }

    fn export(&mut self) {
        let result = export_to(&self.vm.rows, None, ExportFormat::Xlsx, &self.settings);
        self.status_message = Some(match result {
            Ok(path) => format!("Exported to {}", path.display()),
            Err(e) => format!("Export failed: {e}"),
        });
    }

    fn reload(&mut self) {
        match self.cache.load(&self.path) {
            Ok(rows) => {
                log::debug!("reloaded {} ({} cached row-sets)", self.path.display(), self.cache.len());
                self.vm = ViewModel::new(rows);
                let manufacturers = self.manufacturers();
                if self.filter_idx > manufacturers.len() {
                    self.filter_idx = 0;
                    self.opts.manufacturers.clear();
                }
                self.detail_idx = self.detail_idx.min(self.components().len().saturating_sub(1));
                self.offset = 0;
                self.status_message = Some(format!("Reloaded {} rows", self.vm.rows.len()));
            }
            Err(e) => self.status_message = Some(format!("Reload failed: {e}")),
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    fn draw_kpis(&self, frame: &mut Frame, area: Rect) {
        let currency = self.settings.currency.as_str();
        let s = &self.vm.summary;
        let line = Line::from(vec![
            Span::raw(" Total Cost "),
            money_span(currency, s.total_cost),
            Span::raw(format!("   Parts {}", quantity(s.total_parts))),
            Span::raw(format!("   Models {}", s.distinct_models)),
            Span::raw(format!("   Top Manufacturer {}", s.top_manufacturer)),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<String> = ViewMode::ALL
            .iter()
            .enumerate()
            .map(|(i, m)| format!("{} {}", i + 1, m.label()))
            .collect();
        let selected = ViewMode::ALL
            .iter()
            .position(|m| *m == self.opts.mode)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .highlight_style(SELECTED_STYLE)
            .divider("|");
        frame.render_widget(tabs, area);
    }

    fn draw_table(&mut self, frame: &mut Frame, area: Rect) {
        let currency = self.settings.currency.clone();
        let rows = self.vm.table_rows(&self.opts);
        let max = self.vm.max_line_total();
        self.visible_count = area.height.saturating_sub(2).max(1) as usize;

        let header = Row::new(["Tag", "Component", "Function", "Brand", "Qty", "Unit", "Total", ""])
            .style(HEADER_ROW_STYLE)
            .bottom_margin(1);
        let body: Vec<Row> = rows
            .iter()
            .skip(self.offset)
            .take(self.visible_count)
            .map(|r| {
                Row::new(vec![
                    Cell::from(r.tag.clone()),
                    Cell::from(r.component.clone()),
                    Cell::from(r.description.clone()),
                    Cell::from(r.manufacturer.clone()),
                    Cell::from(quantity(r.quantity)),
                    Cell::from(money_span(&currency, r.unit_price)),
                    Cell::from(money_span(&currency, r.line_total)),
                    Cell::from(Span::styled(cost_bar(r.line_total, max, BAR_WIDTH), BAR_STYLE)),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(10),
            Constraint::Fill(2),
            Constraint::Fill(3),
            Constraint::Fill(1),
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(BAR_WIDTH as u16),
        ];
        frame.render_widget(Table::new(body, widths).header(header), area);
    }

    fn draw_gallery(&mut self, frame: &mut Frame, area: Rect) {
        let currency = self.settings.currency.clone();
        let per_line = self.opts.gallery_columns.max(1);
        let rows = self.vm.filtered(&self.opts.manufacturers);
        self.visible_count = (area.height / CARD_HEIGHT).max(1) as usize;

        if rows.is_empty() {
            frame.render_widget(Paragraph::new(" No components found.").style(FOOTER_STYLE), area);
            return;
        }

        let line_areas = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); self.visible_count])
            .split(area);
        for (line_area, chunk) in line_areas
            .iter()
            .zip(rows.chunks(per_line).skip(self.offset))
        {
            let card_areas = Layout::horizontal(vec![Constraint::Ratio(1, per_line as u32); per_line])
                .split(*line_area);
            for (card_area, r) in card_areas.iter().zip(chunk) {
                let inner_width = card_area.width.saturating_sub(2) as usize;
                let (description, _) = wrap_text(&r.description, inner_width);
                let mut lines = vec![
                    Line::from(Span::styled(
                        truncate(&r.component, CARD_NAME_WIDTH),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(money_span(&currency, r.unit_price)),
                ];
                lines.extend(
                    description
                        .lines()
                        .take(2)
                        .map(|l| Line::from(Span::styled(l.to_string(), FOOTER_STYLE))),
                );
                lines.push(Line::from(format!("{} | {}", r.manufacturer, r.model)));
                lines.push(Line::from(format!("Qtd: {} un.", quantity(r.quantity))));
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray));
                frame.render_widget(Paragraph::new(lines).block(block), *card_area);
            }
        }
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect) {
        let components = self.components();
        let [list_area, detail_area] =
            Layout::horizontal([Constraint::Length(32), Constraint::Fill(1)]).areas(area);

        let visible = list_area.height as usize;
        let start = self.detail_idx.saturating_sub(visible.saturating_sub(1));
        let list: Vec<Line> = components
            .iter()
            .enumerate()
            .skip(start)
            .take(visible)
            .map(|(i, name)| {
                let label = format!(" {}", truncate(name, 30));
                if i == self.detail_idx {
                    Line::from(Span::styled(label, SELECTED_STYLE))
                } else {
                    Line::from(label)
                }
            })
            .collect();
        frame.render_widget(Paragraph::new(list), list_area);

        let Some(name) = components.get(self.detail_idx) else {
            frame.render_widget(Paragraph::new(" No components loaded.").style(FOOTER_STYLE), detail_area);
            return;
        };
        let Ok(row) = self.vm.detail(Some(name.as_str())) else {
            return;
        };
        let currency = self.settings.currency.as_str();
        let field = |label: &str, value: Span<'static>| {
            Line::from(vec![Span::styled(format!("{label:<14}"), HEADER_ROW_STYLE), value])
        };
        let (description, _) = wrap_text(&row.description, detail_area.width.saturating_sub(16) as usize);
        let mut lines = vec![
            Line::from(Span::styled(row.component.clone(), HEADER_STYLE)),
            Line::from(""),
            field("Image", Span::raw(row.image_url.clone())),
        ];
        for (i, part) in description.lines().enumerate() {
            let label = if i == 0 { "Description" } else { "" };
            lines.push(field(label, Span::raw(part.to_string())));
        }
        lines.extend([
            field("Manufacturer", Span::raw(row.manufacturer.clone())),
            field("Model", Span::raw(row.model.clone())),
            field("Tag", Span::raw(row.tag.clone())),
            field("Unit Price", money_span(currency, row.unit_price)),
            field("Quantity", Span::raw(quantity(row.quantity))),
            field("Line Total", money_span(currency, row.line_total)),
        ]);
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(lines).block(block), detail_area);
    }

    fn footer_hint(&self) -> String {
        let mode_hint = match self.opts.mode {
            ViewMode::Gallery => {
                let filter = self
                    .opts
                    .manufacturers
                    .first()
                    .map(String::as_str)
                    .unwrap_or("all");
                format!("f=filter ({filter})  \u{2191}/\u{2193}=scroll")
            }
            ViewMode::Table => format!(
                "s=sort ({})  r=reverse  \u{2191}/\u{2193}=scroll",
                self.opts.sort.key()
            ),
            ViewMode::Detail => "\u{2191}/\u{2193}=select component".to_string(),
        };
        format!(" Tab/1-3=view  {mode_hint}  e=export  R=reload  q=quit")
    }
}

impl View for Dashboard {
    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [header_area, kpi_area, tabs_area, sep, body_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(format!(
                " Painel  {}  ({})",
                self.path.display(),
                self.vm.rows.format.label()
            ))
            .style(HEADER_STYLE),
            header_area,
        );
        self.draw_kpis(frame, kpi_area);
        self.draw_tabs(frame, tabs_area);
        frame.render_widget(
            Paragraph::new("\u{2501}".repeat(area.width as usize))
                .style(Style::default().fg(Color::DarkGray)),
            sep,
        );

        match self.opts.mode {
            ViewMode::Table => self.draw_table(frame, body_area),
            ViewMode::Gallery => self.draw_gallery(frame, body_area),
            ViewMode::Detail => self.draw_detail(frame, body_area),
        }

        let footer = match &self.status_message {
            Some(msg) => Paragraph::new(format!(" {msg}")).style(STATUS_STYLE),
            None => Paragraph::new(self.footer_hint()).style(FOOTER_STYLE),
        };
        frame.render_widget(footer, footer_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> ViewAction {
        self.status_message = None;
        let page = self.visible_count as isize;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Close,
            KeyCode::Tab => self.set_mode(self.opts.mode.next()),
            KeyCode::Char('1') => self.set_mode(ViewMode::Gallery),
            KeyCode::Char('2') => self.set_mode(ViewMode::Table),
            KeyCode::Char('3') => self.set_mode(ViewMode::Detail),
            KeyCode::Char('f') => self.cycle_filter(),
            KeyCode::Char('s') => {
                self.opts.sort = self.opts.sort.next();
                self.offset = 0;
            }
            KeyCode::Char('r') => {
                self.opts.descending = !self.opts.descending;
                self.offset = 0;
            }
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('R') => self.reload(),
            KeyCode::Up | KeyCode::Char('k') if self.opts.mode == ViewMode::Detail => {
                self.move_detail(false)
            }
            KeyCode::Down | KeyCode::Char('j') if self.opts.mode == ViewMode::Detail => {
                self.move_detail(true)
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll(1),
            KeyCode::PageUp => self.scroll(-page),
            KeyCode::PageDown => self.scroll(page),
            KeyCode::Home => self.offset = 0,
            KeyCode::End => self.scroll(isize::MAX),
            _ => {}
        }
        ViewAction::Continue
    }
}

/// Load the data file through a fresh cache and run the dashboard until quit.
pub fn run(path: &Path, settings: Settings) -> Result<()> {
    let cache = LoadCache::new();
    let rows = cache.load(path)?;
    let mut dashboard = Dashboard::new(cache, path.to_path_buf(), settings, ViewModel::new(rows));
    run_view(&mut dashboard)
}
