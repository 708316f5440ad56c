use std::path::Path;

use log::{debug, info, warn};

use crate::error::{PainelError, Result};
use crate::models::{Cell, ParseAttempt, RawTable, RowSet, SourceFormat};
use crate::normalizer::normalize;

/// Zero-based index of the header row; the row above it is a title row.
pub const HEADER_ROW: usize = 1;

const DELIMITER_CANDIDATES: &[u8] = &[b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 10;
/// Marks a delimited file as UTF-8 regardless of the chain order.
pub const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

// ---------------------------------------------------------------------------
// Parse chain, tried in order
// ---------------------------------------------------------------------------

pub const PARSE_CHAIN: &[SourceFormat] = &[
    SourceFormat::Spreadsheet,
    SourceFormat::DelimitedLatin1,
    SourceFormat::DelimitedUtf8,
];

impl SourceFormat {
    pub fn parse(&self, bytes: &[u8]) -> std::result::Result<RawTable, String> {
        match self {
            Self::Spreadsheet => parse_spreadsheet(bytes),
            Self::DelimitedLatin1 => {
                if bytes.starts_with(UTF8_BOM) {
                    return Err("UTF-8 byte-order mark present".to_string());
                }
                let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
                parse_delimited(&text)
            }
            Self::DelimitedUtf8 => {
                let text = std::str::from_utf8(bytes).map_err(|e| format!("invalid UTF-8: {e}"))?;
                parse_delimited(text.strip_prefix('\u{feff}').unwrap_or(text))
            }
        }
    }
}

/// Run every attempt of the chain until one yields a table. On failure,
/// every attempt's reason is returned in chain order.
pub fn parse_table(bytes: &[u8]) -> std::result::Result<(RawTable, SourceFormat), Vec<ParseAttempt>> {
    let mut attempts = Vec::new();
    for format in PARSE_CHAIN {
        match format.parse(bytes) {
            Ok(table) => return Ok((table, *format)),
            Err(reason) => {
                debug!("{} parse failed: {reason}", format.label());
                attempts.push(ParseAttempt {
                    format: *format,
                    reason,
                });
            }
        }
    }
    Err(attempts)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Read the whole source file. Any failure to read it counts as not found.
pub fn read_source(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        debug!("cannot read {}: {e}", path.display());
        PainelError::NotFound(path.to_path_buf())
    })
}

pub fn load_bytes(path: &Path, bytes: &[u8]) -> Result<RowSet> {
    match parse_table(bytes) {
        Ok((table, format)) => {
            info!(
                "parsed {} as {} ({} columns, {} records)",
                path.display(),
                format.label(),
                table.headers.len(),
                table.records.len()
            );
            let rows = normalize(table, format);
            if rows.is_empty() {
                warn!("{}: header found but no component rows", path.display());
            }
            Ok(rows)
        }
        Err(attempts) => {
            warn!("{}: no parser accepted the file", path.display());
            Err(PainelError::UnparseableFormat {
                path: path.to_path_buf(),
                attempts,
            })
        }
    }
}

pub fn load_file(path: &Path) -> Result<RowSet> {
    let bytes = read_source(path)?;
    load_bytes(path, &bytes)
}

// ---------------------------------------------------------------------------
// Header naming shared by both readers
// ---------------------------------------------------------------------------

/// Blank header cells become `Unnamed: <index>`; repeated names get `.1`,
/// `.2`, ... suffixes so every column stays addressable.
pub fn name_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base.clone()
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            name
        })
        .collect()
}

fn is_blank_record(cells: &[Cell]) -> bool {
    cells.iter().all(Cell::is_empty)
}

// ---------------------------------------------------------------------------
// Spreadsheet reader (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn parse_spreadsheet(bytes: &[u8]) -> std::result::Result<RawTable, String> {
    use calamine::{Data, Reader};

    fn to_cell(value: &Data) -> Cell {
        match value {
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            _ => Cell::Empty,
        }
    }

    let cursor = std::io::Cursor::new(bytes.to_vec());
    let mut workbook =
        calamine::open_workbook_auto_from_rs(cursor).map_err(|e| format!("not a workbook: {e}"))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "workbook has no sheets".to_string())?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| format!("cannot read sheet {sheet}: {e}"))?;

    // The range begins at the first used cell; re-anchor at A1.
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let start_row = start_row as usize;
    if start_row > HEADER_ROW {
        return Err(format!("sheet {sheet} has no header row"));
    }
    let lead = vec![Cell::Empty; start_col as usize];

    let mut rows = range.rows().skip(HEADER_ROW - start_row);
    let header = rows
        .next()
        .ok_or_else(|| format!("sheet {sheet} has no header row"))?;
    let headers: Vec<String> = lead
        .iter()
        .map(|_| String::new())
        .chain(header.iter().map(|v| to_cell(v).as_text().unwrap_or_default()))
        .collect();

    let width = headers.len();
    let records = rows
        .map(|row| {
            let mut cells: Vec<Cell> = lead.iter().cloned().chain(row.iter().map(to_cell)).collect();
            cells.resize(width, Cell::Empty);
            cells
        })
        .filter(|cells| !is_blank_record(cells))
        .collect();

    Ok(RawTable {
        headers: name_headers(headers),
        records,
    })
}

#[cfg(not(feature = "xlsx"))]
fn parse_spreadsheet(_bytes: &[u8]) -> std::result::Result<RawTable, String> {
    Err("spreadsheet support requires the 'xlsx' feature".to_string())
}

// ---------------------------------------------------------------------------
// Delimited text reader
// ---------------------------------------------------------------------------

/// Count occurrences of `delimiter` outside double-quoted sections.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delimiter && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Pick the candidate delimiter present on the most sample lines, breaking
/// ties by how many lines share its most common per-line count. `None` when
/// no candidate appears at all.
pub fn detect_delimiter(text: &str) -> Option<u8> {
    let sample: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best: Option<(u8, (usize, usize))> = None;
    for &delimiter in DELIMITER_CANDIDATES {
        let counts: Vec<usize> = sample.iter().map(|l| count_unquoted(l, delimiter)).collect();
        let present = counts.iter().filter(|&&c| c > 0).count();
        if present == 0 {
            continue;
        }
        let mut freq: std::collections::HashMap<usize, usize> = std::collections::HashMap::new();
        for &c in counts.iter().filter(|&&c| c > 0) {
            *freq.entry(c).or_default() += 1;
        }
        let consistency = freq.values().copied().max().unwrap_or(0);
        let score = (present, consistency);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((delimiter, score));
        }
    }
    best.map(|(d, _)| d)
}

/// Columns whose non-empty values all parse as numbers become numeric.
fn infer_column_types(records: &mut [Vec<Cell>], width: usize) {
    for col in 0..width {
        let mut any = false;
        let numeric = records.iter().all(|r| match &r[col] {
            Cell::Text(s) => {
                any = true;
                s.trim().parse::<f64>().is_ok()
            }
            _ => true,
        });
        if !(numeric && any) {
            continue;
        }
        for r in records.iter_mut() {
            if let Cell::Text(s) = &r[col] {
                if let Ok(n) = s.trim().parse::<f64>() {
                    r[col] = Cell::Number(n);
                }
            }
        }
    }
}

pub fn parse_delimited(text: &str) -> std::result::Result<RawTable, String> {
    if text.contains('\0') {
        return Err("line contains NUL".to_string());
    }
    let delimiter = detect_delimiter(text).ok_or_else(|| "could not determine delimiter".to_string())?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut discarded = 0usize;
    let mut lines = rdr.records().filter_map(|result| match result {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("skipping unreadable line: {e}");
            None
        }
    });

    let header = lines
        .nth(HEADER_ROW)
        .ok_or_else(|| "no header row".to_string())?;
    let headers: Vec<String> = header.iter().map(|h| h.to_string()).collect();
    let width = headers.len();

    let mut records = Vec::new();
    for record in lines {
        if record.len() > width {
            discarded += 1;
            continue;
        }
        let mut cells: Vec<Cell> = record
            .iter()
            .map(|f| {
                if f.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(f.to_string())
                }
            })
            .collect();
        cells.resize(width, Cell::Empty);
        if is_blank_record(&cells) {
            continue;
        }
        records.push(cells);
    }
    if discarded > 0 {
        debug!("discarded {discarded} malformed line(s)");
    }

    infer_column_types(&mut records, width);

    Ok(RawTable {
        headers: name_headers(headers),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\nd,e,f"), Some(b','));
        assert_eq!(detect_delimiter("a;b;c\nd;e;f"), Some(b';'));
        assert_eq!(detect_delimiter("a\tb\nc\td"), Some(b'\t'));
        assert_eq!(detect_delimiter("just some words\nmore words"), None);
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let text = "ORCAMENTO;;\nCOMPONENTE;PREÇO UNID;QTD\nCabo;\"1.234,56\";2\nFio;\"10,00\";3\n";
        assert_eq!(detect_delimiter(text), Some(b';'));
    }

    #[test]
    fn test_name_headers() {
        let named = name_headers(vec![
            "ITEM".into(),
            "".into(),
            "TAG".into(),
            "TAG".into(),
            "  ".into(),
        ]);
        assert_eq!(named, vec!["ITEM", "Unnamed: 1", "TAG", "TAG.1", "Unnamed: 4"]);
    }

    #[test]
    fn test_parse_delimited_skips_title_row() {
        let text = "Orçamento Painel\n\nCOMPONENTE,QTD\nContator,2\nDisjuntor,1\n";
        let table = parse_delimited(text).unwrap();
        assert_eq!(table.headers, vec!["COMPONENTE", "QTD"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0][0], Cell::Text("Contator".into()));
        assert_eq!(table.records[0][1], Cell::Number(2.0));
    }

    #[test]
    fn test_parse_delimited_discards_long_lines_and_pads_short() {
        let text = "title,,\nA,B,C\n1,2,3\n4,5,6,7\n8,9\n";
        let table = parse_delimited(text).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1], vec![Cell::Number(8.0), Cell::Number(9.0), Cell::Empty]);
    }

    #[test]
    fn test_parse_delimited_mixed_column_stays_text() {
        let text = "t;\nQTD;X\n2;a\nabc;b\n";
        let table = parse_delimited(text).unwrap();
        assert_eq!(table.records[0][0], Cell::Text("2".into()));
        assert_eq!(table.records[1][0], Cell::Text("abc".into()));
    }

    #[test]
    fn test_parse_delimited_requires_header() {
        assert!(parse_delimited("only,one,line\n").is_err());
        assert!(parse_delimited("a,b\0c\nd,e\n").is_err());
    }

    #[test]
    fn test_parse_table_records_every_failed_attempt() {
        let err = parse_table(b"no table here").unwrap_err();
        assert_eq!(err.len(), 3);
        assert_eq!(err[0].format, SourceFormat::Spreadsheet);
        assert_eq!(err[1].format, SourceFormat::DelimitedLatin1);
        assert_eq!(err[2].format, SourceFormat::DelimitedUtf8);
        assert!(err[1].reason.contains("delimiter"));
    }

    #[test]
    fn test_latin1_attempt_decodes_accents() {
        // "PREÇO" with Ç as the single Latin-1 byte 0xC7
        let bytes = b"x;y\nCOMPONENTE;PRE\xc7O UNID\nCabo;10,00\n";
        let (table, format) = parse_table(bytes).unwrap();
        assert_eq!(format, SourceFormat::DelimitedLatin1);
        assert_eq!(table.headers[1], "PREÇO UNID");
    }

    #[test]
    fn test_utf8_bom_skips_latin1_attempt() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("x;y\nCOMPONENTE;PREÇO UNID\nCabo;10,00\n".as_bytes());
        let (table, format) = parse_table(&bytes).unwrap();
        assert_eq!(format, SourceFormat::DelimitedUtf8);
        assert_eq!(table.headers[1], "PREÇO UNID");
    }

    #[test]
    fn test_load_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("dados.xlsx")).unwrap_err();
        assert!(matches!(err, PainelError::NotFound(_)));
    }

    #[test]
    fn test_load_file_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dados.xlsx");
        std::fs::write(&path, b"PK\x03\x04\x00\x00garbage\x00\x01\x02").unwrap();
        match load_file(&path).unwrap_err() {
            PainelError::UnparseableFormat { attempts, .. } => assert_eq!(attempts.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_file_header_only_is_empty_rowset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dados.csv");
        std::fs::write(&path, "Orçamento,\nCOMPONENTE,QTD\n").unwrap();
        let rows = load_file(&path).unwrap();
        assert!(rows.is_empty());
        assert!(rows.has_column("COMPONENTE"));
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_spreadsheet_and_delimited_sources_agree() {
        use rust_xlsxwriter::Workbook;

        let dir = tempfile::tempdir().unwrap();
        let xlsx = dir.path().join("dados.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Orçamento").unwrap();
        for (col, name) in ["COMPONENTE", "FABRICANTE", "PREÇO UNID", "QTD", "IMAGEM"]
            .iter()
            .enumerate()
        {
            sheet.write_string(1, col as u16, *name).unwrap();
        }
        sheet.write_string(2, 0, "Contator 9A").unwrap();
        sheet.write_string(2, 1, "WEG").unwrap();
        sheet.write_number(2, 2, 1234.56).unwrap();
        sheet.write_number(2, 3, 2.0).unwrap();
        sheet.write_string(3, 0, "Borne").unwrap();
        sheet.write_string(3, 1, "Phoenix").unwrap();
        sheet.write_string(3, 2, "R$ 3,50").unwrap();
        sheet.write_number(3, 3, 10.0).unwrap();
        workbook.save(&xlsx).unwrap();

        let csv = dir.path().join("dados.csv");
        std::fs::write(
            &csv,
            b"Or\xe7amento;;;;\nCOMPONENTE;FABRICANTE;PRE\xc7O UNID;QTD;IMAGEM\n\
              Contator 9A;WEG;1234.56;2;\nBorne;Phoenix;R$ 3,50;10;\n",
        )
        .unwrap();

        let from_xlsx = load_file(&xlsx).unwrap();
        let from_csv = load_file(&csv).unwrap();
        assert_eq!(from_xlsx.format, SourceFormat::Spreadsheet);
        assert_eq!(from_csv.format, SourceFormat::DelimitedLatin1);
        assert_eq!(from_xlsx.columns, from_csv.columns);
        assert_eq!(from_xlsx.len(), from_csv.len());
        for (a, b) in from_xlsx.rows.iter().zip(&from_csv.rows) {
            assert_eq!(a.component, b.component);
            assert_eq!(a.manufacturer, b.manufacturer);
            assert_eq!(a.image_url, b.image_url);
            assert_eq!(a.description, b.description);
            assert!((a.unit_price - b.unit_price).abs() < 1e-9);
            assert!((a.quantity - b.quantity).abs() < 1e-9);
            assert!((a.line_total - b.line_total).abs() < 1e-9);
        }
    }
}
