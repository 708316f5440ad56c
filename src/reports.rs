use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{PainelError, Result};
use crate::models::{Row, RowSet};
use crate::normalizer::MISSING_TEXT;

// ---------------------------------------------------------------------------
// Summary KPIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_cost: f64,
    pub total_parts: f64,
    pub distinct_models: usize,
    pub top_manufacturer: String,
}

impl Summary {
    pub fn from_rows(rows: &[Row]) -> Self {
        Self {
            total_cost: rows.iter().map(|r| r.line_total).sum(),
            total_parts: rows.iter().map(|r| r.quantity).sum(),
            distinct_models: rows.len(),
            top_manufacturer: mode(
                rows.iter()
                    .map(|r| r.manufacturer.as_str())
                    .filter(|m| *m != MISSING_TEXT),
            )
            .unwrap_or(MISSING_TEXT)
            .to_string(),
        }
    }
}

/// Most frequent value; ties go to the lexicographically smallest.
pub fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
        .map(|(v, _)| v)
}

// ---------------------------------------------------------------------------
// View model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Gallery,
    Table,
    Detail,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Gallery, ViewMode::Table, ViewMode::Detail];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Gallery => "Gallery",
            Self::Table => "Table",
            Self::Detail => "Detail",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Gallery => Self::Table,
            Self::Table => Self::Detail,
            Self::Detail => Self::Gallery,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Tag,
    Component,
    Manufacturer,
    Quantity,
    UnitPrice,
    Total,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::Total,
        SortKey::UnitPrice,
        SortKey::Quantity,
        SortKey::Component,
        SortKey::Manufacturer,
        SortKey::Tag,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Component => "component",
            Self::Manufacturer => "manufacturer",
            Self::Quantity => "quantity",
            Self::UnitPrice => "unit-price",
            Self::Total => "total",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().find(|k| k.key() == key).copied()
    }

    pub fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|k| k == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        match self {
            Self::Tag => a.tag.cmp(&b.tag),
            Self::Component => a.component.to_lowercase().cmp(&b.component.to_lowercase()),
            Self::Manufacturer => a.manufacturer.to_lowercase().cmp(&b.manufacturer.to_lowercase()),
            Self::Quantity => a.quantity.total_cmp(&b.quantity),
            Self::UnitPrice => a.unit_price.total_cmp(&b.unit_price),
            Self::Total => a.line_total.total_cmp(&b.line_total),
        }
    }
}

/// Everything a view needs besides the data: which rows, in what order.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub mode: ViewMode,
    /// Empty means every manufacturer.
    pub manufacturers: Vec<String>,
    pub sort: SortKey,
    pub descending: bool,
    /// Detail view selection; `None` picks the first component.
    pub component: Option<String>,
    pub gallery_columns: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            mode: ViewMode::Table,
            manufacturers: Vec::new(),
            sort: SortKey::Total,
            descending: true,
            component: None,
            gallery_columns: 4,
        }
    }
}

/// Immutable input of every render: the loaded rows plus their summary.
#[derive(Debug, Clone)]
pub struct ViewModel {
    pub rows: Arc<RowSet>,
    pub summary: Summary,
}

impl ViewModel {
    pub fn new(rows: Arc<RowSet>) -> Self {
        let summary = Summary::from_rows(&rows.rows);
        Self { rows, summary }
    }

    /// Rows whose manufacturer is in the filter (all rows when the filter is empty).
    pub fn filtered<'a>(&'a self, manufacturers: &[String]) -> Vec<&'a Row> {
        self.rows
            .rows
            .iter()
            .filter(|r| {
                manufacturers.is_empty() || manufacturers.iter().any(|m| m.trim() == r.manufacturer)
            })
            .collect()
    }

    /// Filtered rows in table order. The sort is stable, so equal keys keep file order.
    pub fn table_rows<'a>(&'a self, opts: &ViewOptions) -> Vec<&'a Row> {
        let mut rows = self.filtered(&opts.manufacturers);
        rows.sort_by(|a, b| {
            let ord = opts.sort.compare(a, b);
            if opts.descending {
                ord.reverse()
            } else {
                ord
            }
        });
        rows
    }

    pub fn max_line_total(&self) -> f64 {
        self.rows
            .rows
            .iter()
            .map(|r| r.line_total)
            .fold(0.0, f64::max)
    }

    /// First row of the requested component, or of the first component when
    /// none is requested. An exact name wins over a case-insensitive match.
    pub fn detail(&self, component: Option<&str>) -> Result<&Row> {
        match component {
            Some(name) => {
                let wanted = name.trim();
                let rows = &self.rows.rows;
                rows.iter()
                    .find(|r| r.component == wanted)
                    .or_else(|| {
                        let folded = wanted.to_lowercase();
                        rows.iter().find(|r| r.component.to_lowercase() == folded)
                    })
                    .ok_or_else(|| PainelError::UnknownComponent(name.to_string()))
            }
            None => self
                .rows
                .rows
                .first()
                .ok_or_else(|| PainelError::Other("No components loaded".into())),
        }
    }
}
