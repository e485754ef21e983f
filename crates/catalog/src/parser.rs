//! Parser and writer for the flat bulk format.
//!
//! Columns: `id, name, brand, price, notes, allergens, rating, stock`
//!
//! - The first non-blank row is the header; column order is free and unknown
//!   columns are ignored
//! - Cells follow the usual CSV quoting rules (`"a, b"`, `""` for a quote)
//! - List cells hold `;` or `,` separated tags
//! - Empty `rating` means no rating, empty `stock` means 0

use std::fs;
use std::path::Path;

use crate::error::{CatalogError, Result};
use crate::types::{Record, RecordDraft};

/// Column order used when writing
pub const COLUMNS: [&str; 8] = [
    "id", "name", "brand", "price", "notes", "allergens", "rating", "stock",
];

const REQUIRED: [&str; 3] = ["name", "brand", "price"];

/// One data row of a bulk file, typed but not yet normalized
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// 1-based line the row starts on
    pub line: usize,
    pub id: Option<String>,
    pub draft: RecordDraft,
}

/// Read a bulk source file as UTF-8, dropping a leading byte order mark
pub fn read_source(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|e| CatalogError::storage(path, e))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(&text).to_string())
}

/// Split CSV text into rows of cells, keeping the line each row starts on.
///
/// Quoted cells may span lines. Blank rows are dropped.
fn split_rows(text: &str) -> Result<Vec<(usize, Vec<String>)>> {
    let mut rows = Vec::new();
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    cell.push('\n');
                }
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' if cell.trim().is_empty() => {
                cell.clear();
                in_quotes = true;
            }
            ',' => cells.push(std::mem::take(&mut cell)),
            '\r' => {}
            '\n' => {
                cells.push(std::mem::take(&mut cell));
                push_row(&mut rows, row_start, std::mem::take(&mut cells));
                line += 1;
                row_start = line;
            }
            _ => cell.push(c),
        }
    }

    if in_quotes {
        return Err(CatalogError::Parse {
            line: row_start,
            reason: "Unterminated quoted cell".to_string(),
        });
    }
    if !cell.is_empty() || !cells.is_empty() {
        cells.push(cell);
        push_row(&mut rows, row_start, cells);
    }
    Ok(rows)
}

fn push_row(rows: &mut Vec<(usize, Vec<String>)>, line: usize, cells: Vec<String>) {
    if cells.iter().all(|c| c.trim().is_empty()) {
        return; // Skip blank lines
    }
    rows.push((line, cells));
}

/// Parse a CSV document into typed import rows
///
/// Numeric cells that do not parse are reported as an `InvalidRow` for the
/// row's line; full validation happens later in the store.
pub fn parse_csv(text: &str) -> Result<Vec<ImportRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = split_rows(text)?.into_iter();

    let (header_line, header) = match rows.next() {
        Some(h) => h,
        None => return Ok(Vec::new()),
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
    for column in REQUIRED {
        if !header.iter().any(|h| h == column) {
            return Err(CatalogError::Parse {
                line: header_line,
                reason: format!("Missing required column '{}'", column),
            });
        }
    }

    let mut out = Vec::new();
    for (line, cells) in rows {
        let cell = |name: &str| lookup(&header, &cells, name).to_string();
        let row_err = |field: &str, reason: &str| CatalogError::InvalidRow {
            line,
            source: Box::new(CatalogError::validation(field, reason)),
        };

        let price = cell("price")
            .parse::<f64>()
            .map_err(|_| row_err("price", "must be a number"))?;
        let rating = match cell("rating").as_str() {
            "" => None,
            r => Some(r.parse::<f64>().map_err(|_| row_err("rating", "must be a number"))?),
        };
        let stock = match cell("stock").as_str() {
            "" => 0,
            s => s.parse::<i64>().map_err(|_| row_err("stock", "must be an integer"))?,
        };
        let id = Some(cell("id")).filter(|s| !s.is_empty());

        out.push(ImportRow {
            line,
            id,
            draft: RecordDraft {
                name: cell("name"),
                brand: cell("brand"),
                price,
                notes: vec![cell("notes")],
                allergens: vec![cell("allergens")],
                rating,
                stock,
            },
        });
    }
    Ok(out)
}

/// Trimmed cell under `column`, or "" when the row is short
fn lookup<'a>(header: &[String], cells: &'a [String], column: &str) -> &'a str {
    header
        .iter()
        .position(|h| h == column)
        .and_then(|i| cells.get(i))
        .map(|s| s.trim())
        .unwrap_or("")
}

/// Quote a cell when it holds a delimiter, quote or line break
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Flatten records into CSV with a header row. List fields are `;` joined.
pub fn write_csv(records: &[Record]) -> String {
    let mut out = COLUMNS.join(",");
    out.push('\n');
    for r in records {
        let cells = [
            r.id.clone(),
            r.name.clone(),
            r.brand.clone(),
            format!("{:.2}", r.price),
            r.notes.join(";"),
            r.allergens.join(";"),
            r.rating.map(|v| v.to_string()).unwrap_or_default(),
            r.stock.to_string(),
        ];
        let line: Vec<String> = cells.iter().map(|c| escape(c)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_basic_rows() {
        let text = "id,name,brand,price,notes,allergens,rating,stock\n\
                    p1,Rose Dusk,Floral,55,rose;musk,,4.5,3\n\
                    \n\
                    ,Citrus Glow,Aurora,42.5,\"citrus, bergamot\",limonene,,\n";
        let rows = parse_csv(text).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].id.as_deref(), Some("p1"));
        assert_eq!(rows[0].draft.rating, Some(4.5));
        assert_eq!(rows[0].draft.stock, 3);
        assert_eq!(rows[1].line, 4);
        assert_eq!(rows[1].id, None);
        assert_eq!(rows[1].draft.notes, vec!["citrus, bergamot"]);
        assert_eq!(rows[1].draft.rating, None);
        assert_eq!(rows[1].draft.stock, 0);
    }

    #[test]
    fn test_parse_header_order_and_bom() {
        let text = "\u{feff}price,brand,name,extra\r\n12,Terra,Vetiver Line,ignored\r\n";
        let rows = parse_csv(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].draft.name, "Vetiver Line");
        assert_eq!(rows[0].draft.price, 12.0);
    }

    #[test]
    fn test_parse_missing_column() {
        let err = parse_csv("name,price\nA,1\n").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_parse_bad_number_reports_line() {
        let err = parse_csv("name,brand,price\nA,B,1\nC,D,cheap\n").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRow { line: 3, .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_parse_unterminated_quote() {
        let err = parse_csv("name,brand,price\n\"A,B,1\n").unwrap_err();
        assert!(matches!(err, CatalogError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a, b"), "\"a, b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_written_csv_parses_back() {
        let record = Record {
            id: "x1".to_string(),
            name: "Night, Again".to_string(),
            brand: "Noctis".to_string(),
            price: 80.0,
            notes: vec!["vanilla".to_string(), "tonka".to_string()],
            allergens: vec![],
            rating: Some(4.0),
            stock: 2,
        };
        let text = write_csv(&[record]);
        assert!(text.starts_with("id,name,brand,price,notes,allergens,rating,stock\n"));

        let rows = parse_csv(&text).unwrap();
        assert_eq!(rows[0].draft.name, "Night, Again");
        assert_eq!(rows[0].draft.notes, vec!["vanilla;tonka"]);
        assert_eq!(rows[0].draft.stock, 2);
    }
}
