use log::debug;

use crate::categorizer::describe;
use crate::models::{Cell, RawTable, Row, RowSet, SourceFormat};

pub const COMPONENT: &str = "COMPONENTE";
pub const MODEL: &str = "MODELO";
pub const MANUFACTURER: &str = "FABRICANTE";
pub const TAG: &str = "TAG";
pub const IMAGE: &str = "IMAGEM";

/// Text columns guaranteed to exist after normalization.
pub const REQUIRED_TEXT_COLUMNS: &[&str] = &[COMPONENT, MODEL, MANUFACTURER, TAG];

/// Price header spellings in precedence order.
pub const PRICE_COLUMNS: &[&str] = &["PREÇO POR UNIDADE", "PREÇO UNIT", "PREÇO UNID"];

/// Quantity header spellings in precedence order.
pub const QUANTITY_COLUMNS: &[&str] = &["QUANTIDADE", "QTD"];

pub const MISSING_TEXT: &str = "-";
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300?text=Sem+Imagem";

/// Stripped from price text; longer symbols first so `R$` is not left as `R`.
const CURRENCY_SYMBOLS: &[&str] = &["R$", "US$", "$", "€", "£"];

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Trim, drop embedded quotes, uppercase: `" preço unid "` -> `PREÇO UNID`.
pub fn normalize_header(name: &str) -> String {
    name.trim().replace('"', "").to_uppercase()
}

/// Blank spreadsheet header cells surface as `Unnamed: N` placeholders.
pub fn is_unnamed(normalized: &str) -> bool {
    normalized.starts_with("UNNAMED")
}

fn find_column(columns: &[String], candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| columns.iter().position(|col| col == c))
}

// ---------------------------------------------------------------------------
// Cell cleaning
// ---------------------------------------------------------------------------

fn parse_price_text(raw: &str) -> f64 {
    let mut s = CURRENCY_SYMBOLS
        .iter()
        .fold(raw.trim().to_string(), |acc, sym| acc.replace(sym, ""))
        .trim()
        .to_string();
    // A comma means Brazilian notation: '.' groups thousands, ',' is the decimal mark.
    if s.contains(',') {
        s = s.replace('.', "").replace(',', ".");
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Numeric cells pass through; text is cleaned of currency symbols and
/// decimal-comma notation. Anything unparseable is 0.0.
pub fn clean_price(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Number(_) | Cell::Empty => 0.0,
        Cell::Text(s) => parse_price_text(s),
    }
}

/// Numeric coercion for quantity cells; unparseable or empty is 0.
pub fn clean_quantity(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) if n.is_finite() => *n,
        Cell::Text(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => 0.0,
        },
        _ => 0.0,
    }
}

fn text_or_default(cells: &[Cell], idx: Option<usize>, default: &str) -> String {
    idx.and_then(|i| cells.get(i))
        .and_then(Cell::as_text)
        .unwrap_or_else(|| default.to_string())
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

pub fn normalize(table: RawTable, format: SourceFormat) -> RowSet {
    let RawTable { headers, records } = table;

    // Keep only named columns, remembering where each came from.
    let kept: Vec<(usize, String)> = headers
        .iter()
        .map(|h| normalize_header(h))
        .enumerate()
        .filter(|(_, name)| {
            let drop = is_unnamed(name);
            if drop {
                debug!("dropping placeholder column {name}");
            }
            !drop
        })
        .collect();

    let mut columns: Vec<String> = kept.iter().map(|(_, n)| n.clone()).collect();
    let mut records: Vec<Vec<Cell>> = records
        .into_iter()
        .map(|r| {
            kept.iter()
                .map(|(i, _)| r.get(*i).cloned().unwrap_or(Cell::Empty))
                .collect()
        })
        .collect();

    for required in REQUIRED_TEXT_COLUMNS {
        if !columns.iter().any(|c| c == required) {
            debug!("column {required} missing, filling with '{MISSING_TEXT}'");
            columns.push(required.to_string());
            for r in records.iter_mut() {
                r.push(Cell::Text(MISSING_TEXT.to_string()));
            }
        }
    }

    let price_idx = find_column(&columns, PRICE_COLUMNS);
    let quantity_idx = find_column(&columns, QUANTITY_COLUMNS);
    let image_idx = find_column(&columns, &[IMAGE]);
    let text_idx = |name: &str| columns.iter().position(|c| c == name);
    let (component_idx, model_idx, manufacturer_idx, tag_idx) = (
        text_idx(COMPONENT),
        text_idx(MODEL),
        text_idx(MANUFACTURER),
        text_idx(TAG),
    );
    if price_idx.is_none() {
        debug!("no price column, unit prices default to 0.0");
    }
    if quantity_idx.is_none() {
        debug!("no quantity column, quantities default to 1");
    }

    let rows = records
        .into_iter()
        .map(|cells| {
            let unit_price = price_idx.map_or(0.0, |i| clean_price(&cells[i]));
            let quantity = quantity_idx.map_or(1.0, |i| clean_quantity(&cells[i]));
            let component = text_or_default(&cells, component_idx, MISSING_TEXT);
            let description = describe(&component).to_string();
            Row {
                model: text_or_default(&cells, model_idx, MISSING_TEXT),
                manufacturer: text_or_default(&cells, manufacturer_idx, MISSING_TEXT),
                tag: text_or_default(&cells, tag_idx, MISSING_TEXT),
                image_url: text_or_default(&cells, image_idx, PLACEHOLDER_IMAGE),
                line_total: quantity * unit_price,
                component,
                unit_price,
                quantity,
                description,
                cells,
            }
        })
        .collect();

    RowSet {
        price_column: price_idx.map(|i| columns[i].clone()),
        quantity_column: quantity_idx.map(|i| columns[i].clone()),
        columns,
        rows,
        format,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], records: Vec<Vec<Cell>>) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            records,
        }
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" preço unid "), "PREÇO UNID");
        assert_eq!(normalize_header("\"Tag\""), "TAG");
        assert_eq!(normalize_header("Quantidade"), "QUANTIDADE");
    }

    #[test]
    fn test_is_unnamed() {
        assert!(is_unnamed("UNNAMED: 0"));
        assert!(is_unnamed("UNNAMED"));
        assert!(!is_unnamed("ITEM UNNAMED"));
    }

    #[test]
    fn test_clean_price() {
        assert_eq!(clean_price(&text("R$ 1.234,56")), 1234.56);
        assert_eq!(clean_price(&text("45.00")), 45.0);
        assert_eq!(clean_price(&text("abc")), 0.0);
        assert_eq!(clean_price(&Cell::Number(10.0)), 10.0);
        assert_eq!(clean_price(&text("  R$12,5 ")), 12.5);
        assert_eq!(clean_price(&text("$ 99.90")), 99.9);
        assert_eq!(clean_price(&Cell::Empty), 0.0);
        assert_eq!(clean_price(&text("nan")), 0.0);
    }

    #[test]
    fn test_clean_price_keeps_dotted_thousands_heuristic() {
        // Without a comma the dot is read as a decimal point.
        assert_eq!(clean_price(&text("1.234")), 1.234);
    }

    #[test]
    fn test_clean_quantity() {
        assert_eq!(clean_quantity(&Cell::Number(3.0)), 3.0);
        assert_eq!(clean_quantity(&text(" 4 ")), 4.0);
        assert_eq!(clean_quantity(&text("dois")), 0.0);
        assert_eq!(clean_quantity(&Cell::Empty), 0.0);
    }

    #[test]
    fn test_missing_columns_are_defaulted() {
        let rs = normalize(
            table(&["Componente"], vec![vec![text("Disjuntor 10A")]]),
            SourceFormat::Spreadsheet,
        );
        assert_eq!(rs.columns, vec![COMPONENT, MODEL, MANUFACTURER, TAG]);
        let row = &rs.rows[0];
        assert_eq!(row.model, "-");
        assert_eq!(row.manufacturer, "-");
        assert_eq!(row.tag, "-");
        assert_eq!(row.unit_price, 0.0);
        assert_eq!(row.quantity, 1.0);
        assert_eq!(row.line_total, 0.0);
        assert_eq!(row.image_url, PLACEHOLDER_IMAGE);
        assert_eq!(row.description, describe("disjuntor"));
        assert_eq!(row.cells.len(), 4);
    }

    #[test]
    fn test_unnamed_columns_dropped() {
        let rs = normalize(
            table(
                &["Unnamed: 0", "COMPONENTE", "Unnamed: 2"],
                vec![vec![Cell::Number(1.0), text("Borne"), text("x")]],
            ),
            SourceFormat::DelimitedUtf8,
        );
        assert!(!rs.columns.iter().any(|c| c.starts_with("UNNAMED")));
        assert_eq!(rs.rows[0].cells[0], text("Borne"));
    }

    #[test]
    fn test_quantity_present_but_invalid_is_zero() {
        let rs = normalize(
            table(
                &["COMPONENTE", "QTD", "PREÇO UNID"],
                vec![
                    vec![text("Cabo"), text("abc"), text("10,00")],
                    vec![text("Fio"), Cell::Number(3.0), text("2,50")],
                ],
            ),
            SourceFormat::DelimitedLatin1,
        );
        assert_eq!(rs.rows[0].quantity, 0.0);
        assert_eq!(rs.rows[0].line_total, 0.0);
        assert_eq!(rs.rows[1].quantity, 3.0);
        assert_eq!(rs.rows[1].line_total, 7.5);
        assert_eq!(rs.quantity_column.as_deref(), Some("QTD"));
    }

    #[test]
    fn test_quantity_header_precedence() {
        let rs = normalize(
            table(
                &["QTD", "QUANTIDADE"],
                vec![vec![Cell::Number(9.0), Cell::Number(2.0)]],
            ),
            SourceFormat::Spreadsheet,
        );
        assert_eq!(rs.rows[0].quantity, 2.0);
    }

    #[test]
    fn test_price_header_precedence() {
        let rs = normalize(
            table(
                &["PREÇO UNID", "PREÇO UNIT", "PREÇO POR UNIDADE"],
                vec![vec![Cell::Number(1.0), Cell::Number(2.0), Cell::Number(3.0)]],
            ),
            SourceFormat::Spreadsheet,
        );
        assert_eq!(rs.rows[0].unit_price, 3.0);
        assert_eq!(rs.price_column.as_deref(), Some("PREÇO POR UNIDADE"));

        let rs = normalize(
            table(
                &["PREÇO UNID", "PREÇO UNIT"],
                vec![vec![Cell::Number(1.0), Cell::Number(2.0)]],
            ),
            SourceFormat::Spreadsheet,
        );
        assert_eq!(rs.rows[0].unit_price, 2.0);

        let rs = normalize(
            table(&[" preço unid "], vec![vec![text("R$ 7,00")]]),
            SourceFormat::Spreadsheet,
        );
        assert_eq!(rs.rows[0].unit_price, 7.0);
    }

    #[test]
    fn test_line_total_invariant() {
        let rs = normalize(
            table(
                &["COMPONENTE", "QUANTIDADE", "PREÇO UNIT"],
                vec![
                    vec![text("Contator"), Cell::Number(3.0), text("R$ 1.234,56")],
                    vec![text("Relé"), Cell::Number(0.5), Cell::Number(19.9)],
                    vec![text("LED"), Cell::Empty, text("abc")],
                ],
            ),
            SourceFormat::Spreadsheet,
        );
        for row in &rs.rows {
            assert_eq!(row.line_total, row.quantity * row.unit_price);
        }
    }

    #[test]
    fn test_empty_cells_in_present_columns_are_populated() {
        let rs = normalize(
            table(
                &["COMPONENTE", "FABRICANTE", "IMAGEM"],
                vec![vec![Cell::Empty, text("  "), Cell::Empty]],
            ),
            SourceFormat::Spreadsheet,
        );
        let row = &rs.rows[0];
        assert_eq!(row.component, "-");
        assert_eq!(row.manufacturer, "-");
        assert_eq!(row.image_url, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_numeric_tag_renders_as_integer() {
        let rs = normalize(
            table(&["TAG"], vec![vec![Cell::Number(101.0)]]),
            SourceFormat::Spreadsheet,
        );
        assert_eq!(rs.rows[0].tag, "101");
    }
}
