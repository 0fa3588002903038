use std::io::Read;
use std::path::PathBuf;

use colored::Colorize;

use crate::categorizer::CategoryTable;
use crate::cli::open_store;
use crate::error::Result;
use crate::importer::{import_bytes, import_file};
use crate::normalizer::{Normalizer, RowPolicy};
use crate::settings::load_settings;

pub fn run(file: &str, abort_on_error: bool) -> Result<()> {
    let mut store = open_store()?;
    let policy = if abort_on_error {
        RowPolicy::Abort
    } else {
        load_settings().row_policy
    };
    let normalizer = Normalizer::new(CategoryTable::default());

    let result = if file == "-" {
        let mut bytes = Vec::new();
        std::io::stdin().read_to_end(&mut bytes)?;
        import_bytes(&mut store, &bytes, &normalizer, policy)?
    } else {
        import_file(&mut store, &PathBuf::from(file), &normalizer, policy)?
    };

    if result.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!(
        "{} imported, {} skipped (duplicates), {} rejected",
        result.imported,
        result.duplicates,
        result.rejected.len()
    );
    for rejected in &result.rejected {
        println!("  {} {rejected}", "rejected".yellow());
    }
    Ok(())
}
