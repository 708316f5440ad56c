use std::fmt;

/// A single raw value as read from the source table.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Text rendering used for free-text fields. Integral numbers print
    /// without a fractional part so a numeric tag `12` stays `12`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.trim().to_string()),
            Cell::Number(n) => Some(number_text(*n)),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(n) => write!(f, "{}", number_text(*n)),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

fn number_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Intermediate representation from a spreadsheet/CSV reader before
/// normalization: header names exactly as found, one `Vec<Cell>` per data row
/// padded to the header width.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<Cell>>,
}

/// Which attempt of the parse chain produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Spreadsheet,
    DelimitedLatin1,
    DelimitedUtf8,
}

impl SourceFormat {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::DelimitedLatin1 => "delimited text (latin-1)",
            Self::DelimitedUtf8 => "delimited text (utf-8)",
        }
    }
}

/// A failed attempt of the parse chain, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseAttempt {
    pub format: SourceFormat,
    pub reason: String,
}

/// One physical component line item after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub component: String,
    pub model: String,
    pub manufacturer: String,
    pub tag: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub line_total: f64,
    pub image_url: String,
    pub description: String,
    /// Values for every column in `RowSet::columns`, same order.
    pub cells: Vec<Cell>,
}

/// The normalized, immutable result of one load.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub format: SourceFormat,
    pub price_column: Option<String>,
    pub quantity_column: Option<String>,
}

impl RowSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Distinct manufacturers in first-appearance order.
    pub fn manufacturers(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|r| r.manufacturer.as_str()))
    }

    /// Distinct component names in first-appearance order.
    pub fn components(&self) -> Vec<&str> {
        distinct(self.rows.iter().map(|r| r.component.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}
