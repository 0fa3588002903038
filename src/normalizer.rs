use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::categorizer::CategoryTable;
use crate::error::{CentavoError, Result};
use crate::models::{Installment, NormalizedExpense, RawRow};

pub const DATE_COLUMN: &str = "Date";
pub const DESCRIPTION_COLUMN: &str = "Description";
pub const AMOUNT_COLUMN: &str = "Amount (BRL)";

/// What a batch does when a single row fails to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    /// Keep going and report the rejected rows alongside the good ones.
    #[default]
    Skip,
    /// Stop at the first bad row.
    Abort,
}

impl fmt::Display for RowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RowPolicy::Skip => "skip",
            RowPolicy::Abort => "abort",
        })
    }
}

#[derive(Debug)]
pub struct RowError {
    pub line: u64,
    pub error: CentavoError,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

impl From<RowError> for CentavoError {
    fn from(e: RowError) -> Self {
        CentavoError::Row {
            line: e.line,
            source: Box::new(e.error),
        }
    }
}

#[derive(Debug, Default)]
pub struct Normalized {
    pub expenses: Vec<NormalizedExpense>,
    pub rejected: Vec<RowError>,
}

// ---------------------------------------------------------------------------
// Field decoders
// ---------------------------------------------------------------------------

/// Portuguese three-letter month abbreviation to calendar month (1-12).
fn month_number(abbrev: &str) -> Option<u32> {
    let month = match abbrev {
        "JAN" => 1,
        "FEV" => 2,
        "MAR" => 3,
        "ABR" => 4,
        "MAI" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AGO" => 8,
        "SET" => 9,
        "OUT" => 10,
        "NOV" => 11,
        "DEZ" => 12,
        _ => return None,
    };
    Some(month)
}

/// Decode a "DD MON" date. The export carries no year, so `year` is
/// supplied by the caller. An unrecognized month falls back to January.
pub fn decode_date(raw: &str, year: i32) -> Result<NaiveDate> {
    let parts: Vec<&str> = raw.split_whitespace().collect();
    let &[day, month] = parts.as_slice() else {
        return Err(CentavoError::decode("date", raw, "expected \"DD MON\""));
    };
    let day: u32 = day
        .parse()
        .map_err(|_| CentavoError::decode("date", raw, "day is not a number"))?;
    let month = month_number(month).unwrap_or_else(|| {
        debug!(date = raw, "unknown month abbreviation, using January");
        1
    });
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CentavoError::decode("date", raw, format!("day {day} does not exist in month {month}"))
    })
}

/// Decode a pt-BR amount: `.` groups thousands, `,` is the decimal mark.
pub fn decode_amount(raw: &str) -> Result<f64> {
    let cleaned = raw.replace('.', "").replace(',', ".");
    let amount: f64 = cleaned
        .trim()
        .parse()
        .map_err(|_| CentavoError::decode("amount", raw, "not a number"))?;
    if !amount.is_finite() {
        return Err(CentavoError::decode("amount", raw, "not a finite number"));
    }
    Ok(amount)
}

fn installment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Parcela ([0-9]+)/([0-9]+)").expect("installment pattern is valid"))
}

/// Find the first "Parcela N/M" marker. Zero or out-of-range counts mean
/// there is no installment plan.
pub fn extract_installment(description: &str) -> Option<Installment> {
    let caps = installment_re().captures(description)?;
    let current: u32 = caps[1].parse().ok()?;
    let total: u32 = caps[2].parse().ok()?;
    if current == 0 || total == 0 {
        return None;
    }
    Some(Installment { current, total })
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

pub struct Normalizer {
    table: CategoryTable,
    year: i32,
}

impl Normalizer {
    /// Dates are stamped with the current local year.
    pub fn new(table: CategoryTable) -> Self {
        Self::with_year(table, chrono::Local::now().year())
    }

    pub fn with_year(table: CategoryTable, year: i32) -> Self {
        Self { table, year }
    }

    pub fn normalize(&self, row: &RawRow) -> Result<NormalizedExpense> {
        let date_raw = required(row, DATE_COLUMN)?;
        let description = required(row, DESCRIPTION_COLUMN)?;
        let amount_raw = required(row, AMOUNT_COLUMN)?;

        if description.trim().is_empty() {
            return Err(CentavoError::EmptyDescription);
        }
        let amount = decode_amount(amount_raw)?;
        let date = decode_date(date_raw, self.year)?;

        Ok(NormalizedExpense {
            date,
            description: description.to_string(),
            amount,
            category: self.table.categorize(description).to_string(),
            is_fixed_expense: false,
            installment: extract_installment(description),
        })
    }

    pub fn normalize_all(&self, rows: &[RawRow], policy: RowPolicy) -> Result<Normalized> {
        if rows.is_empty() {
            return Err(CentavoError::EmptyImport);
        }

        let mut out = Normalized::default();
        for row in rows {
            match self.normalize(row) {
                Ok(expense) => out.expenses.push(expense),
                Err(error) => {
                    let rejected = RowError { line: row.line, error };
                    if policy == RowPolicy::Abort {
                        return Err(rejected.into());
                    }
                    warn!(line = row.line, error = %rejected.error, "rejected row");
                    out.rejected.push(rejected);
                }
            }
        }
        Ok(out)
    }
}

fn required<'a>(row: &'a RawRow, header: &str) -> Result<&'a str> {
    row.get(header)
        .ok_or_else(|| CentavoError::MissingField(header.to_string()))
}
