use std::collections::HashMap;

use crate::db::{month_bounds, Store};
use crate::error::{CentavoError, Result};
use crate::models::Expense;

// ---------------------------------------------------------------------------
// Month summary
// ---------------------------------------------------------------------------

pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
    pub count: usize,
    /// Monthly budget limit of the category, 0 when unset.
    pub limit: f64,
    pub pct: f64,
}

pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub count: usize,
    /// Signed sum of every expense in the month; credits reduce it.
    pub total_spent: f64,
    pub salary: Option<f64>,
    pub remaining: Option<f64>,
    pub fixed_total: f64,
    pub by_category: Vec<CategoryTotal>,
    pub installments: Vec<Expense>,
}

pub fn month_summary(store: &Store, year: i32, month: u32) -> Result<MonthSummary> {
    let expenses = store.expenses_by_month(year, month)?;
    let limits: HashMap<String, f64> = store
        .all_categories()?
        .into_iter()
        .map(|c| (c.name, c.budget_limit))
        .collect();

    let total_spent: f64 = expenses.iter().map(|e| e.amount).sum();
    let fixed_total: f64 = expenses
        .iter()
        .filter(|e| e.is_fixed_expense)
        .map(|e| e.amount)
        .sum();

    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for e in &expenses {
        let entry = totals.entry(e.category.as_str()).or_default();
        entry.0 += e.amount;
        entry.1 += 1;
    }
    let mut by_category: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(name, (total, count))| CategoryTotal {
            name: name.to_string(),
            total,
            count,
            limit: limits.get(name).copied().unwrap_or(0.0),
            pct: if total_spent != 0.0 { total / total_spent * 100.0 } else { 0.0 },
        })
        .collect();
    by_category.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

    let salary = store.get_budget(year, month)?.map(|b| b.salary);
    let installments = expenses
        .iter()
        .filter(|e| e.installment.is_some())
        .cloned()
        .collect();

    Ok(MonthSummary {
        year,
        month,
        count: expenses.len(),
        total_spent,
        salary,
        remaining: salary.map(|s| s - total_spent),
        fixed_total,
        by_category,
        installments,
    })
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

pub const MAX_TREND_MONTHS: u32 = 120;

/// Totals for the `months` months ending at `year`-`month`, oldest first.
pub fn trend(store: &Store, year: i32, month: u32, months: u32) -> Result<Vec<MonthTotal>> {
    month_bounds(year, month)?;
    if !(1..=MAX_TREND_MONTHS).contains(&months) {
        return Err(CentavoError::Other(format!(
            "Trend length must be between 1 and {MAX_TREND_MONTHS} months"
        )));
    }
    let mut out = Vec::new();
    let (mut y, mut m) = (year, month);
    for _ in 0..months {
        let total = store.expenses_by_month(y, m)?.iter().map(|e| e.amount).sum();
        out.push(MonthTotal { year: y, month: m, total });
        (y, m) = prev_month(y, m);
    }
    out.reverse();
    Ok(out)
}

// ---------------------------------------------------------------------------
// Similar descriptions
// ---------------------------------------------------------------------------

/// Expenses sharing a description, compared case-insensitively.
pub struct SimilarGroup {
    /// Description as first seen.
    pub description: String,
    pub expenses: Vec<Expense>,
}

impl SimilarGroup {
    pub fn ids(&self) -> Vec<i64> {
        self.expenses.iter().map(|e| e.id).collect()
    }
}

/// Group expenses whose descriptions repeat. Single occurrences are left
/// out; the largest groups come first.
pub fn group_similar(expenses: Vec<Expense>) -> Vec<SimilarGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<SimilarGroup> = Vec::new();
    for expense in expenses {
        let key = expense.description.to_lowercase();
        match index.get(&key) {
            Some(&i) => groups[i].expenses.push(expense),
            None => {
                index.insert(key, groups.len());
                groups.push(SimilarGroup {
                    description: expense.description.clone(),
                    expenses: vec![expense],
                });
            }
        }
    }
    groups.retain(|g| g.expenses.len() > 1);
    groups.sort_by(|a, b| b.expenses.len().cmp(&a.expenses.len()));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{expense, test_store};
    use crate::models::Installment;

    #[test]
    fn test_month_summary_totals() {
        let (_dir, mut store) = test_store();
        let mut parcel = expense((2025, 1, 20), "LOJA - Parcela 1/3", 100.0, "Shopping");
        parcel.installment = Some(Installment { current: 1, total: 3 });
        store
            .add_expenses(&[
                expense((2025, 1, 15), "UBER", 30.0, "Transportation"),
                expense((2025, 1, 16), "UBER", 20.0, "Transportation"),
                parcel,
                expense((2025, 1, 30), "ESTORNO", -50.0, "Other"),
                expense((2025, 2, 1), "UBER", 99.0, "Transportation"),
            ])
            .unwrap();
        store.set_salary(2025, 1, 1000.0).unwrap();
        store.set_budget_limit("Transportation", 40.0).unwrap();

        let s = month_summary(&store, 2025, 1).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.total_spent, 100.0);
        assert_eq!(s.salary, Some(1000.0));
        assert_eq!(s.remaining, Some(900.0));
        assert_eq!(s.installments.len(), 1);

        assert_eq!(s.by_category[0].name, "Shopping");
        assert_eq!(s.by_category[0].pct, 100.0);
        let transport = s.by_category.iter().find(|c| c.name == "Transportation").unwrap();
        assert_eq!(transport.total, 50.0);
        assert_eq!(transport.count, 2);
        assert_eq!(transport.limit, 40.0);
        assert_eq!(s.by_category.last().unwrap().name, "Other");
    }

    #[test]
    fn test_month_summary_fixed_and_no_salary() {
        let (_dir, store) = test_store();
        let id = store.add_expense(&expense((2025, 3, 5), "ALUGUEL", 1500.0, "Housing")).unwrap();
        store.add_expense(&expense((2025, 3, 6), "IFOOD", 40.0, "Food")).unwrap();
        store.set_fixed_expense(id, true).unwrap();
        let s = month_summary(&store, 2025, 3).unwrap();
        assert_eq!(s.fixed_total, 1500.0);
        assert_eq!(s.salary, None);
        assert_eq!(s.remaining, None);
    }

    #[test]
    fn test_month_summary_empty_month() {
        let (_dir, store) = test_store();
        let s = month_summary(&store, 2025, 7).unwrap();
        assert_eq!(s.count, 0);
        assert_eq!(s.total_spent, 0.0);
        assert!(s.by_category.is_empty());
    }

    #[test]
    fn test_trend_crosses_year_boundary() {
        let (_dir, mut store) = test_store();
        store
            .add_expenses(&[
                expense((2024, 11, 10), "A", 10.0, "Other"),
                expense((2024, 12, 10), "B", 20.0, "Other"),
                expense((2025, 1, 10), "C", 30.0, "Other"),
                expense((2025, 1, 11), "D", 5.0, "Other"),
            ])
            .unwrap();
        let t = trend(&store, 2025, 1, 4).unwrap();
        let got: Vec<_> = t.iter().map(|m| (m.year, m.month, m.total)).collect();
        assert_eq!(
            got,
            vec![(2024, 10, 0.0), (2024, 11, 10.0), (2024, 12, 20.0), (2025, 1, 35.0)]
        );
    }

    #[test]
    fn test_trend_rejects_bad_month() {
        let (_dir, store) = test_store();
        assert!(trend(&store, 2025, 0, 3).is_err());
    }

    #[test]
    fn test_trend_rejects_out_of_range_length() {
        let (_dir, store) = test_store();
        assert!(matches!(trend(&store, 2025, 1, 0), Err(CentavoError::Other(_))));
        assert!(matches!(trend(&store, 2025, 1, u32::MAX), Err(CentavoError::Other(_))));
        assert_eq!(trend(&store, 2025, 1, MAX_TREND_MONTHS).unwrap().len(), 120);
    }

    #[test]
    fn test_group_similar() {
        let (_dir, mut store) = test_store();
        store
            .add_expenses(&[
                expense((2025, 1, 15), "Padaria Sol", 8.0, "Other"),
                expense((2025, 1, 16), "UBER TRIP", 20.0, "Transportation"),
                expense((2025, 1, 17), "PADARIA SOL", 9.0, "Other"),
                expense((2025, 1, 18), "padaria sol", 7.0, "Supermercado"),
                expense((2025, 1, 19), "Uber Trip", 15.0, "Transportation"),
                expense((2025, 1, 20), "PADARIA LUA", 5.0, "Other"),
            ])
            .unwrap();
        let groups = group_similar(store.search_by_description("r").unwrap());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].description, "Padaria Sol");
        assert_eq!(groups[0].ids(), vec![1, 3, 4]);
        assert_eq!(groups[1].ids(), vec![2, 5]);
    }
}
