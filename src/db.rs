use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};

use crate::categorizer::FALLBACK_CATEGORY;
use crate::error::{CentavoError, Result};
use crate::models::{Category, Expense, ExpenseEdit, Installment, MonthlyBudget, NormalizedExpense};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    budget_limit REAL NOT NULL DEFAULT 0,
    color TEXT NOT NULL DEFAULT '#607D8B'
);

CREATE TABLE IF NOT EXISTS expenses (
    id INTEGER PRIMARY KEY,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    category TEXT NOT NULL,
    is_fixed_expense INTEGER NOT NULL DEFAULT 0,
    installment_current INTEGER,
    installment_total INTEGER,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
CREATE INDEX IF NOT EXISTS idx_expenses_category_date ON expenses(category, date);

CREATE TABLE IF NOT EXISTS budgets (
    id INTEGER PRIMARY KEY,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    salary REAL NOT NULL DEFAULT 0,
    UNIQUE (year, month)
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now')),
    record_count INTEGER,
    checksum TEXT
);
";

// (name, color)
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Food", "#4CAF50"),
    ("Transportation", "#2196F3"),
    ("Housing", "#9C27B0"),
    ("Entertainment", "#FF9800"),
    ("Shopping", "#E91E63"),
    ("Health", "#00BCD4"),
    ("Education", "#3F51B5"),
    ("Bills", "#F44336"),
    ("Boteco", "#795548"),
    ("Supermercado", "#FFC107"),
    (FALLBACK_CATEGORY, "#607D8B"),
];

const DEFAULT_COLOR: &str = "#607D8B";

const EXPENSE_COLUMNS: &str =
    "id, date, description, amount, category, is_fixed_expense, installment_current, installment_total";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, color) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, budget_limit, color) VALUES (?1, 0, ?2)",
                params![name, color],
            )?;
        }
    }
    Ok(())
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || CentavoError::InvalidMonth(format!("{year:04}-{month:02}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let last = next.pred_opt().ok_or_else(invalid)?;
    Ok((first, last))
}

fn expense_from_row(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
    let current: Option<u32> = row.get(6)?;
    let total: Option<u32> = row.get(7)?;
    Ok(Expense {
        id: row.get(0)?,
        date: row.get(1)?,
        description: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        is_fixed_expense: row.get(5)?,
        installment: current
            .zip(total)
            .map(|(current, total)| Installment { current, total }),
    })
}

fn category_from_row(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        budget_limit: row.get(2)?,
        color: row.get(3)?,
    })
}

// ---------------------------------------------------------------------------
// Sink used by the importer
// ---------------------------------------------------------------------------

/// Destination for normalized records. The importer only appends and checks
/// for rows it has already stored.
pub trait ExpenseSink {
    /// Append all records atomically, registering any category they name
    /// that the sink does not know yet. Returns the number written.
    fn append(&mut self, expenses: &[NormalizedExpense]) -> Result<usize>;

    fn contains(&self, expense: &NormalizedExpense) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if needed) and initialize the database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    #[allow(dead_code)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // -- expenses -----------------------------------------------------------

    pub fn add_expense(&self, expense: &NormalizedExpense) -> Result<i64> {
        insert_expense(&self.conn, expense)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert in one transaction. Missing categories named by the records
    /// are created in the same transaction.
    pub fn add_expenses(&mut self, expenses: &[NormalizedExpense]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for expense in expenses {
            tx.execute(
                "INSERT INTO categories (name, budget_limit, color) SELECT ?1, 0, ?2 \
                 WHERE NOT EXISTS (SELECT 1 FROM categories WHERE name = ?1)",
                params![expense.category, DEFAULT_COLOR],
            )?;
            insert_expense(&tx, expense)?;
        }
        tx.commit()?;
        Ok(expenses.len())
    }

    pub fn get_expense(&self, id: i64) -> Result<Expense> {
        self.conn
            .query_row(
                &format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1"),
                [id],
                expense_from_row,
            )
            .optional()?
            .ok_or(CentavoError::UnknownExpense(id))
    }

    pub fn update_category(&self, id: i64, category: &str) -> Result<()> {
        if !self.category_exists(category)? {
            return Err(CentavoError::UnknownCategory(category.to_string()));
        }
        let changed = self
            .conn
            .execute("UPDATE expenses SET category = ?1 WHERE id = ?2", params![category, id])?;
        if changed == 0 {
            return Err(CentavoError::UnknownExpense(id));
        }
        Ok(())
    }

    pub fn set_fixed_expense(&self, id: i64, fixed: bool) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE expenses SET is_fixed_expense = ?1 WHERE id = ?2",
            params![fixed, id],
        )?;
        if changed == 0 {
            return Err(CentavoError::UnknownExpense(id));
        }
        Ok(())
    }

    pub fn delete_expense(&self, id: i64) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM expenses WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(CentavoError::UnknownExpense(id));
        }
        Ok(())
    }

    /// Move every listed expense to `category` in one transaction. Ids that
    /// no longer exist are skipped; returns how many rows changed.
    pub fn update_expenses(&mut self, ids: &[i64], category: &str) -> Result<usize> {
        if !self.category_exists(category)? {
            return Err(CentavoError::UnknownCategory(category.to_string()));
        }
        let tx = self.conn.transaction()?;
        let mut updated = 0;
        for id in ids {
            updated += tx.execute(
                "UPDATE expenses SET category = ?1 WHERE id = ?2",
                params![category, id],
            )?;
        }
        tx.commit()?;
        Ok(updated)
    }

    /// Apply the fields set in `edit`, leaving the others as stored.
    pub fn update_expense(&self, id: i64, edit: &ExpenseEdit) -> Result<()> {
        if edit.description.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err(CentavoError::EmptyDescription);
        }
        let changed = self.conn.execute(
            "UPDATE expenses SET date = COALESCE(?1, date), description = COALESCE(?2, description), \
             amount = COALESCE(?3, amount) WHERE id = ?4",
            params![edit.date, edit.description, edit.amount, id],
        )?;
        if changed == 0 {
            return Err(CentavoError::UnknownExpense(id));
        }
        Ok(())
    }

    /// Expenses dated within `from..=to`, oldest first.
    pub fn expenses_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE date BETWEEN ?1 AND ?2 ORDER BY date, id"
        ))?;
        let rows = stmt.query_map(params![from, to], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn expenses_by_month(&self, year: i32, month: u32) -> Result<Vec<Expense>> {
        let (first, last) = month_bounds(year, month)?;
        self.expenses_between(first, last)
    }

    pub fn fixed_expenses(&self) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE is_fixed_expense = 1 ORDER BY date, id"
        ))?;
        let rows = stmt.query_map([], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn all_expenses(&self) -> Result<Vec<Expense>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {EXPENSE_COLUMNS} FROM expenses ORDER BY date, id"))?;
        let rows = stmt.query_map([], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Case-insensitive substring search. A blank term matches nothing.
    pub fn search_by_description(&self, term: &str) -> Result<Vec<Expense>> {
        if term.trim().is_empty() {
            return Ok(Vec::new());
        }
        let needle = term.to_lowercase();
        Ok(self
            .all_expenses()?
            .into_iter()
            .filter(|e| e.description.to_lowercase().contains(&needle))
            .collect())
    }

    pub fn expense_exists(&self, date: NaiveDate, description: &str, amount: f64) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT 1 FROM expenses WHERE date = ?1 AND description = ?2 AND amount = ?3",
        )?;
        Ok(stmt.exists(params![date, description, amount])?)
    }

    // -- categories ---------------------------------------------------------

    pub fn all_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, budget_limit, color FROM categories ORDER BY id")?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn category_exists(&self, name: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare_cached("SELECT 1 FROM categories WHERE name = ?1")?;
        Ok(stmt.exists([name])?)
    }

    /// Returns the id of the category called `name`, inserting it first if
    /// it does not exist yet.
    pub fn add_category_if_not_exists(&self, name: &str, color: Option<&str>, budget_limit: f64) -> Result<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM categories WHERE name = ?1 ORDER BY id LIMIT 1",
                [name],
                |r| r.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }
        self.conn.execute(
            "INSERT INTO categories (name, budget_limit, color) VALUES (?1, ?2, ?3)",
            params![name, budget_limit, color.unwrap_or(DEFAULT_COLOR)],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn set_budget_limit(&self, name: &str, budget_limit: f64) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET budget_limit = ?1 WHERE name = ?2",
            params![budget_limit, name],
        )?;
        if changed == 0 {
            return Err(CentavoError::UnknownCategory(name.to_string()));
        }
        Ok(())
    }

    /// Expenses keep their category name; only the category entry goes.
    pub fn delete_category(&self, name: &str) -> Result<()> {
        let changed = self.conn.execute("DELETE FROM categories WHERE name = ?1", [name])?;
        if changed == 0 {
            return Err(CentavoError::UnknownCategory(name.to_string()));
        }
        Ok(())
    }

    /// Remove every category whose name repeats an earlier one, keeping the
    /// lowest id. Returns how many rows were deleted.
    pub fn cleanup_duplicate_categories(&self) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM categories WHERE id NOT IN (SELECT MIN(id) FROM categories GROUP BY name)",
            [],
        )?;
        Ok(removed)
    }

    // -- budgets ------------------------------------------------------------

    pub fn set_salary(&self, year: i32, month: u32, salary: f64) -> Result<()> {
        month_bounds(year, month)?;
        self.conn.execute(
            "INSERT INTO budgets (year, month, salary) VALUES (?1, ?2, ?3) \
             ON CONFLICT (year, month) DO UPDATE SET salary = excluded.salary",
            params![year, month, salary],
        )?;
        Ok(())
    }

    pub fn get_budget(&self, year: i32, month: u32) -> Result<Option<MonthlyBudget>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, year, month, salary FROM budgets WHERE year = ?1 AND month = ?2",
                params![year, month],
                |row| {
                    Ok(MonthlyBudget {
                        id: row.get(0)?,
                        year: row.get(1)?,
                        month: row.get(2)?,
                        salary: row.get(3)?,
                    })
                },
            )
            .optional()?)
    }

    // -- import ledger ------------------------------------------------------

    pub fn import_checksum_exists(&self, checksum: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
        Ok(stmt.exists([checksum])?)
    }

    pub fn record_import(&self, filename: &str, record_count: usize, checksum: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO imports (filename, record_count, checksum) VALUES (?1, ?2, ?3)",
            params![filename, record_count as i64, checksum],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

fn insert_expense(conn: &Connection, expense: &NormalizedExpense) -> Result<()> {
    conn.execute(
        "INSERT INTO expenses (date, description, amount, category, is_fixed_expense, installment_current, installment_total) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            expense.date,
            expense.description,
            expense.amount,
            expense.category,
            expense.is_fixed_expense,
            expense.installment.map(|i| i.current),
            expense.installment.map(|i| i.total),
        ],
    )?;
    Ok(())
}

impl ExpenseSink for Store {
    fn append(&mut self, expenses: &[NormalizedExpense]) -> Result<usize> {
        self.add_expenses(expenses)
    }

    fn contains(&self, expense: &NormalizedExpense) -> Result<bool> {
        self.expense_exists(expense.date, &expense.description, expense.amount)
    }
}
