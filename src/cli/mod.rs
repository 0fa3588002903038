pub mod budget;
pub mod categories;
pub mod expenses;
pub mod import;
pub mod init;
pub mod report;
pub mod status;

use chrono::Datelike;
use clap::{Parser, Subcommand};

use crate::db::Store;
use crate::error::{CentavoError, Result};
use crate::settings::db_path;

/// Resolve a `YYYY-MM` argument, defaulting to the current month.
pub(crate) fn resolve_month(month: Option<&str>) -> Result<(i32, u32)> {
    let Some(m) = month else {
        let today = chrono::Local::now().date_naive();
        return Ok((today.year(), today.month()));
    };
    let invalid = || CentavoError::InvalidMonth(m.to_string());
    let (y, mm) = m.split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = mm.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

pub(crate) fn open_store() -> Result<Store> {
    let path = db_path();
    if !path.exists() {
        return Err(CentavoError::Other(format!(
            "Database not found at {}. Run `centavo init` first.",
            path.display()
        )));
    }
    Store::open(&path)
}

#[derive(Parser)]
#[command(name = "centavo", about = "Personal expense tracker for Nubank CSV exports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for centavo data (default: ~/Documents/centavo)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a Nubank CSV export and auto-categorize its transactions.
    Import {
        /// Path to the CSV file, or `-` to read from stdin
        file: String,
        /// Stop at the first invalid row instead of skipping it
        #[arg(long = "abort-on-error")]
        abort_on_error: bool,
    },
    /// Browse and edit stored expenses.
    Expenses {
        #[command(subcommand)]
        command: ExpensesCommands,
    },
    /// Manage categories and their budget limits.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Monthly salary and remaining budget.
    Budget {
        #[command(subcommand)]
        command: BudgetCommands,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum ExpensesCommands {
    /// List expenses for a month.
    List {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        /// Only fixed expenses (any month)
        #[arg(long)]
        fixed: bool,
    },
    /// Record an expense by hand.
    Add {
        /// Date: YYYY-MM-DD
        date: String,
        description: String,
        /// Amount in pt-BR notation, e.g. 1.234,56
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Category (default: chosen from the description)
        #[arg(long)]
        category: Option<String>,
        /// Mark as a fixed (recurring) expense
        #[arg(long)]
        fixed: bool,
    },
    /// Show a single expense.
    Show {
        id: i64,
    },
    /// Search expenses by description.
    Search {
        term: String,
    },
    /// Change the category of an expense.
    SetCategory {
        /// Expense ID (shown in `centavo expenses list`)
        id: i64,
        category: String,
    },
    /// Group expenses whose descriptions repeat among the matches for a term.
    Similar {
        term: String,
    },
    /// Move every expense matching a term to a category.
    Recategorize {
        term: String,
        category: String,
        /// Only descriptions equal to the term (ignoring case)
        #[arg(long)]
        exact: bool,
    },
    /// Change the date, description or amount of an expense.
    Edit {
        id: i64,
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Amount in pt-BR notation, e.g. 1.234,56
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
    },
    /// Mark an expense as fixed (recurring).
    SetFixed {
        id: i64,
        /// Clear the flag instead of setting it
        #[arg(long)]
        off: bool,
    },
    /// Delete an expense.
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List categories with budget limits.
    List,
    /// Add a category.
    Add {
        name: String,
        /// Display color, e.g. '#4CAF50'
        #[arg(long)]
        color: Option<String>,
        /// Monthly budget limit
        #[arg(long, default_value = "0")]
        limit: f64,
    },
    /// Set the monthly budget limit of a category.
    SetLimit {
        name: String,
        limit: f64,
    },
    /// Delete a category (expenses keep their category name).
    Delete {
        name: String,
    },
    /// Remove duplicate category entries.
    Dedupe,
}

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the salary for a month.
    Set {
        salary: f64,
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Show salary, spending and what is left for a month.
    Show {
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Spending by category for a month.
    Month {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Monthly totals over the last months.
    Trend {
        /// Last month of the range: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
        /// Number of months (1-120)
        #[arg(
            long,
            default_value = "6",
            value_parser = clap::value_parser!(u32).range(1..=crate::reports::MAX_TREND_MONTHS as i64)
        )]
        months: u32,
    },
}
