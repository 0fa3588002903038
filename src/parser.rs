use tracing::debug;

use crate::error::{CentavoError, Result};
use crate::models::RawRow;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse an export read straight from disk. Invalid UTF-8 is reported as a
/// parse error on the line holding the first bad byte.
pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        let valid = &bytes[..e.valid_up_to()];
        let line = 1 + valid.iter().filter(|b| **b == b'\n').count() as u64;
        CentavoError::Parse {
            line,
            message: format!("invalid UTF-8: {e}"),
        }
    })?;
    parse_rows(text)
}

/// Parse comma-delimited text whose first non-empty line is the header row.
///
/// Every following record becomes a [`RawRow`] keyed by the header names
/// verbatim. Records shorter than the header simply lack the trailing keys;
/// cells past the last header are dropped. A header with no data rows is a
/// valid, empty result.
pub fn parse_rows(text: &str) -> Result<Vec<RawRow>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(CentavoError::Parse {
            line: 1,
            message: "no header line".to_string(),
        });
    }
    check_quotes(text)?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = rdr.headers().map_err(csv_error)?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(csv_error)?;
        // Only a line with a single empty cell is skipped. Rows of blank
        // cells are kept so the normalizer rejects them.
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line());
        let mut row = RawRow::new(line);
        for (header, value) in headers.iter().zip(record.iter()) {
            row.fields.insert(header.to_string(), value.to_string());
        }
        rows.push(row);
    }

    debug!(rows = rows.len(), columns = headers.len(), "parsed export");
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn csv_error(err: csv::Error) -> CentavoError {
    let line = err.position().map_or(1, |p| p.line());
    CentavoError::Parse {
        line,
        message: err.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// The csv reader silently closes a quoted field at end of input, so an
/// unterminated quote has to be caught before handing the text over.
/// A quote only opens a field when it is the field's first character.
fn check_quotes(text: &str) -> Result<()> {
    use QuoteState::*;

    let mut state = FieldStart;
    let mut line = 1u64;
    let mut opened_at = 1u64;

    for c in text.chars() {
        state = match (state, c) {
            (FieldStart, '"') => {
                opened_at = line;
                Quoted
            }
            (FieldStart | Unquoted, ',' | '\n') => FieldStart,
            (FieldStart | Unquoted, _) => Unquoted,
            (Quoted, '"') => QuoteInQuoted,
            (Quoted, _) => Quoted,
            (QuoteInQuoted, '"') => Quoted,
            (QuoteInQuoted, ',' | '\n') => FieldStart,
            (QuoteInQuoted, _) => Unquoted,
        };
        if c == '\n' {
            line += 1;
        }
    }

    if state == Quoted {
        return Err(CentavoError::Parse {
            line: opened_at,
            message: "unterminated quoted field".to_string(),
        });
    }
    Ok(())
}
