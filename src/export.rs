use std::path::Path;

use log::debug;

use crate::error::{PainelError, Result};
use crate::importer::UTF8_BOM;
use crate::models::{Cell, Row, RowSet};
use crate::normalizer::IMAGE;

pub const SHEET_NAME: &str = "Orçamento";

pub const PRICE_NUM: &str = "PREÇO_NUM";
pub const QUANTITY_NUM: &str = "QTD_NUM";
pub const LINE_TOTAL: &str = "TOTAL_LINHA";
pub const DESCRIPTION: &str = "DESCRICAO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

// ---------------------------------------------------------------------------
// Layout shared by both writers
// ---------------------------------------------------------------------------

// The first line carries the sheet title so an export loads back with the
// same header position as a source spreadsheet.

/// Source columns followed by the derived ones.
pub fn export_header(rs: &RowSet) -> Vec<String> {
    let mut header = rs.columns.clone();
    header.extend([PRICE_NUM, QUANTITY_NUM, LINE_TOTAL].map(String::from));
    if !rs.has_column(IMAGE) {
        header.push(IMAGE.to_string());
    }
    header.push(DESCRIPTION.to_string());
    header
}

/// One output record, aligned with `export_header`. A source image column
/// carries the resolved URL so empty cells export as the placeholder.
pub fn export_record(rs: &RowSet, row: &Row) -> Vec<Cell> {
    let mut record: Vec<Cell> = rs
        .columns
        .iter()
        .zip(&row.cells)
        .map(|(name, cell)| {
            if name == IMAGE {
                Cell::Text(row.image_url.clone())
            } else {
                cell.clone()
            }
        })
        .collect();
    record.extend([
        Cell::Number(row.unit_price),
        Cell::Number(row.quantity),
        Cell::Number(row.line_total),
    ]);
    if !rs.has_column(IMAGE) {
        record.push(Cell::Text(row.image_url.clone()));
    }
    record.push(Cell::Text(row.description.clone()));
    record
}

pub fn write(rs: &RowSet, path: &Path, format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match format {
        ExportFormat::Xlsx => write_xlsx(rs, path),
        ExportFormat::Csv => write_csv(rs, path),
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
pub fn write_xlsx(rs: &RowSet, path: &Path) -> Result<()> {
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let title_format = Format::new().set_bold().set_font_size(14);
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    sheet.write_string_with_format(0, 0, SHEET_NAME, &title_format)?;

    for (col, name) in export_header(rs).iter().enumerate() {
        sheet.write_string_with_format(1, col as u16, name, &header_format)?;
    }
    for (i, row) in rs.rows.iter().enumerate() {
        let r = i as u32 + 2;
        for (col, cell) in export_record(rs, row).iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n)?;
                }
                Cell::Text(s) => {
                    sheet.write_string(r, c, s)?;
                }
            }
        }
    }
    workbook.save(path)?;
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
pub fn write_xlsx(_rs: &RowSet, _path: &Path) -> Result<()> {
    Err(PainelError::Other(
        "xlsx export requires the `xlsx` feature; use --format csv".into(),
    ))
}

/// Windows-1252 bytes when every character fits, otherwise UTF-8 with a BOM.
pub fn encode_delimited(text: &str) -> Vec<u8> {
    let (encoded, _, had_errors) = encoding_rs::WINDOWS_1252.encode(text);
    if !had_errors {
        return encoded.into_owned();
    }
    debug!("export text is not representable in Windows-1252; writing UTF-8");
    let mut bytes = UTF8_BOM.to_vec();
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Delimited export, Latin-1 encoded like the source files it mirrors.
pub fn write_csv(rs: &RowSet, path: &Path) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    writer.write_record([SHEET_NAME])?;
    writer.write_record(export_header(rs))?;
    for row in &rs.rows {
        writer.write_record(export_record(rs, row).iter().map(|c| c.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| PainelError::Io(e.into_error()))?;
    let text = String::from_utf8(bytes).map_err(|e| PainelError::Other(e.to_string()))?;
    std::fs::write(path, encode_delimited(&text))?;
    Ok(())
}
