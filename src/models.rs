use std::collections::BTreeMap;

use chrono::NaiveDate;

/// One data line of an export, keyed by the header row verbatim.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    /// 1-based line in the source text where the record starts.
    pub line: u64,
    pub fields: BTreeMap<String, String>,
}

impl RawRow {
    pub fn new(line: u64) -> Self {
        Self {
            line,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields.get(header).map(String::as_str)
    }

    #[allow(dead_code)]
    pub fn with(mut self, header: &str, value: &str) -> Self {
        self.fields.insert(header.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Installment {
    pub current: u32,
    pub total: u32,
}

/// Intermediate representation from the normalizer before DB insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedExpense {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub is_fixed_expense: bool,
    pub installment: Option<Installment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: i64,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub is_fixed_expense: bool,
    pub installment: Option<Installment>,
}

/// Fields to overwrite on a stored expense; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseEdit {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub budget_limit: f64,
    pub color: String,
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBudget {
    pub id: i64,
    pub year: i32,
    pub month: u32,
    pub salary: f64,
}
