use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::db::{ExpenseSink, Store};
use crate::error::{CentavoError, Result};
use crate::models::{NormalizedExpense, RawRow};
use crate::normalizer::{Normalizer, RowError, RowPolicy};
use crate::parser::parse_bytes;

#[derive(Debug, Default)]
pub struct ImportResult {
    pub imported: usize,
    /// Rows already present in the store (same date, description and amount).
    pub duplicates: usize,
    pub rejected: Vec<RowError>,
    pub duplicate_file: bool,
}

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// import_bytes / import_file
// ---------------------------------------------------------------------------

/// Parse, normalize and append an export held in memory, such as one piped
/// on stdin.
///
/// A parse failure (invalid UTF-8 included) or an export without data rows
/// aborts before anything is written. Per-row failures follow `policy`.
pub fn import_bytes<S: ExpenseSink>(
    sink: &mut S,
    bytes: &[u8],
    normalizer: &Normalizer,
    policy: RowPolicy,
) -> Result<ImportResult> {
    let rows = parse_bytes(bytes)?;
    import_rows(sink, &rows, normalizer, policy)
}

pub fn import_file(
    store: &mut Store,
    file_path: &Path,
    normalizer: &Normalizer,
    policy: RowPolicy,
) -> Result<ImportResult> {
    let is_csv = file_path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(CentavoError::NotCsv(file_path.display().to_string()));
    }

    let data = std::fs::read(file_path)?;
    let checksum = compute_checksum(&data);
    if store.import_checksum_exists(&checksum)? {
        info!(file = %file_path.display(), "file already imported");
        return Ok(ImportResult {
            duplicate_file: true,
            ..ImportResult::default()
        });
    }

    let rows = parse_bytes(&data)?;
    let result = import_rows(store, &rows, normalizer, policy)?;

    let filename = file_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    store.record_import(filename, result.imported, &checksum)?;
    info!(
        file = filename,
        imported = result.imported,
        duplicates = result.duplicates,
        rejected = result.rejected.len(),
        "import finished"
    );
    Ok(result)
}

fn import_rows<S: ExpenseSink>(
    sink: &mut S,
    rows: &[RawRow],
    normalizer: &Normalizer,
    policy: RowPolicy,
) -> Result<ImportResult> {
    let normalized = normalizer.normalize_all(rows, policy)?;

    // Only rows stored by earlier imports count as duplicates; identical
    // lines inside one export are separate purchases.
    let mut fresh: Vec<NormalizedExpense> = Vec::with_capacity(normalized.expenses.len());
    let mut duplicates = 0usize;
    for expense in normalized.expenses {
        if sink.contains(&expense)? {
            debug!(date = %expense.date, description = %expense.description, "skipping stored row");
            duplicates += 1;
            continue;
        }
        fresh.push(expense);
    }

    let imported = sink.append(&fresh)?;
    Ok(ImportResult {
        imported,
        duplicates,
        rejected: normalized.rejected,
        duplicate_file: false,
    })
}
