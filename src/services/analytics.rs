//! Dashboard statistics derived from a user's transactions and budgets.
//!
//! Everything here is a pure function of its arguments. The caller supplies
//! `today` so "current month" and the trailing series are deterministic.

use crate::models::{Budget, Category, Transaction, TransactionType};
use crate::services::categories::resolve_color;
use chrono::{Datelike, NaiveDate};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;

/// Number of months in the income/expense trend series.
pub const SERIES_MONTHS: i32 = 6;

/// Budget usage above this percentage is critical.
pub const CRITICAL_PERCENT: f64 = 90.0;
/// Budget usage above this percentage is a warning.
pub const WARNING_PERCENT: f64 = 70.0;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Per-category sums, kept in first-seen order so equal totals sort deterministically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryTotals(Vec<(String, f64)>);

impl CategoryTotals {
    pub fn add(&mut self, category: &str, amount: f64) {
        match self.0.iter_mut().find(|(name, _)| name == category) {
            Some((_, total)) => *total += amount,
            None => self.0.push((category.to_string(), amount)),
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, total)| (name.as_str(), *total))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().map(|(_, total)| total).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for CategoryTotals {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut totals = CategoryTotals::default();
        for (name, amount) in iter {
            let name: String = name.into();
            totals.add(&name, amount);
        }
        totals
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, total) in &self.0 {
            map.serialize_entry(name, total)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FinancialTotals {
    pub balance: f64,
    pub total_income: f64,
    pub total_expense: f64,
    pub monthly_income: f64,
    pub monthly_expense: f64,
    /// Expense sums per category, all time. Income never appears here.
    pub category_totals: CategoryTotals,
    /// Expense sums per category for the current calendar month.
    pub monthly_category_totals: CategoryTotals,
}

pub fn is_same_month(date: NaiveDate, today: NaiveDate) -> bool {
    date.year() == today.year() && date.month() == today.month()
}

pub fn compute_totals(transactions: &[Transaction], today: NaiveDate) -> FinancialTotals {
    let mut totals = FinancialTotals::default();

    for transaction in transactions {
        let this_month = is_same_month(transaction.date, today);
        match transaction.kind {
            TransactionType::Income => {
                totals.total_income += transaction.amount;
                if this_month {
                    totals.monthly_income += transaction.amount;
                }
            }
            TransactionType::Expense => {
                totals.total_expense += transaction.amount;
                totals
                    .category_totals
                    .add(&transaction.category, transaction.amount);
                if this_month {
                    totals.monthly_expense += transaction.amount;
                    totals
                        .monthly_category_totals
                        .add(&transaction.category, transaction.amount);
                }
            }
        }
    }

    totals.balance = totals.total_income - totals.total_expense;
    totals
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAmount {
    pub name: String,
    pub total: f64,
}

/// Categories sorted by total, largest first. Ties keep their first-seen order.
pub fn category_breakdown(totals: &CategoryTotals) -> Vec<CategoryAmount> {
    let mut result: Vec<CategoryAmount> = totals
        .iter()
        .map(|(name, total)| CategoryAmount {
            name: name.to_string(),
            total,
        })
        .collect();
    result.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    result
}

/// Chart slice: a breakdown entry with its display color and share of the whole.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySlice {
    pub name: String,
    pub color: String,
    pub total: f64,
    pub percentage: f64,
}

pub fn category_slices(totals: &CategoryTotals, custom: &[Category]) -> Vec<CategorySlice> {
    let grand_total = totals.sum();
    category_breakdown(totals)
        .into_iter()
        .map(|entry| CategorySlice {
            color: resolve_color(&entry.name, custom).to_string(),
            percentage: if grand_total > 0.0 {
                (entry.total / grand_total) * 100.0
            } else {
                0.0
            },
            name: entry.name,
            total: entry.total,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    /// Display label, e.g. "Mar 2024".
    pub month: String,
    pub income: f64,
    pub expense: f64,
    #[serde(skip)]
    year: i32,
    #[serde(skip)]
    month0: u32,
}

impl MonthlyBucket {
    fn new(year: i32, month0: u32) -> Self {
        Self {
            month: format!("{} {}", MONTH_LABELS[month0 as usize], year),
            income: 0.0,
            expense: 0.0,
            year,
            month0,
        }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month0
    }
}

/// Income and expense per month for the six months ending with `today`'s month,
/// oldest first. Empty months are present with zeros; older transactions are ignored.
pub fn monthly_series(transactions: &[Transaction], today: NaiveDate) -> Vec<MonthlyBucket> {
    let current = today.year() * 12 + today.month0() as i32;
    let mut buckets: Vec<MonthlyBucket> = (0..SERIES_MONTHS)
        .rev()
        .map(|back| {
            let index = current - back;
            MonthlyBucket::new(index.div_euclid(12), index.rem_euclid(12) as u32)
        })
        .collect();

    for transaction in transactions {
        if let Some(bucket) = buckets.iter_mut().find(|b| b.contains(transaction.date)) {
            match transaction.kind {
                TransactionType::Income => bucket.income += transaction.amount,
                TransactionType::Expense => bucket.expense += transaction.amount,
            }
        }
    }

    buckets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetSeverity {
    Ok,
    Warning,
    Critical,
}

impl BudgetSeverity {
    pub fn from_percent(percent: f64) -> Self {
        if percent > CRITICAL_PERCENT {
            Self::Critical
        } else if percent > WARNING_PERCENT {
            Self::Warning
        } else {
            Self::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetProgress {
    pub category_name: String,
    pub limit: f64,
    pub spent: f64,
    /// Share of the limit used, clamped to `[0, 100]`. Zero when the limit is zero.
    pub percent: f64,
    pub severity: BudgetSeverity,
}

pub fn budget_percent(spent: f64, limit: f64) -> f64 {
    if limit <= 0.0 || !limit.is_finite() {
        return 0.0;
    }
    (spent / limit * 100.0).clamp(0.0, 100.0)
}

/// Spending against each budget this month, closest to (or over) the limit first.
pub fn budget_progress(
    budgets: &[Budget],
    monthly_category_totals: &CategoryTotals,
) -> Vec<BudgetProgress> {
    let mut result: Vec<BudgetProgress> = budgets
        .iter()
        .map(|budget| {
            let spent = monthly_category_totals
                .get(&budget.category_name)
                .unwrap_or(0.0);
            let percent = budget_percent(spent, budget.amount);
            BudgetProgress {
                category_name: budget.category_name.clone(),
                limit: budget.amount,
                spent,
                percent,
                severity: BudgetSeverity::from_percent(percent),
            }
        })
        .collect();

    result.sort_by(|a, b| b.percent.partial_cmp(&a.percent).unwrap_or(Ordering::Equal));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn tx(kind: TransactionType, amount: f64, category: &str, date: &str) -> Transaction {
        Transaction {
            id: format!("{category}-{date}-{amount}"),
            user_id: "u1".into(),
            kind,
            amount,
            category: category.into(),
            description: String::new(),
            date: date.parse().unwrap(),
            created_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    fn budget(category: &str, amount: f64) -> Budget {
        Budget {
            id: format!("b-{category}"),
            user_id: "u1".into(),
            category_name: category.into(),
            amount,
        }
    }

    #[test]
    fn test_totals_scenario() {
        let list = vec![
            tx(TransactionType::Expense, 100.0, "Food", "2024-03-02"),
            tx(TransactionType::Income, 500.0, "Salary", "2024-03-01"),
        ];
        let totals = compute_totals(&list, today());

        assert_eq!(totals.balance, 400.0);
        assert_eq!(totals.monthly_expense, 100.0);
        assert_eq!(totals.monthly_income, 500.0);
        assert_eq!(totals.category_totals, CategoryTotals::from_iter([("Food", 100.0)]));
        assert_eq!(totals.category_totals.get("Salary"), None);
    }

    #[test]
    fn test_current_month_excludes_same_month_of_other_year() {
        let list = vec![
            tx(TransactionType::Expense, 40.0, "Food", "2023-03-10"),
            tx(TransactionType::Expense, 10.0, "Food", "2024-02-29"),
            tx(TransactionType::Income, 70.0, "Salary", "2023-03-31"),
        ];
        let totals = compute_totals(&list, today());

        assert_eq!(totals.monthly_expense, 0.0);
        assert_eq!(totals.monthly_income, 0.0);
        assert!(totals.monthly_category_totals.is_empty());
        assert_eq!(totals.total_expense, 50.0);
        assert_eq!(totals.balance, 20.0);
    }

    #[test]
    fn test_totals_invariants() {
        let list = vec![
            tx(TransactionType::Expense, 12.5, "Food", "2024-03-01"),
            tx(TransactionType::Expense, 7.25, "Bills", "2023-11-11"),
            tx(TransactionType::Expense, 30.0, "Food", "2022-01-01"),
            tx(TransactionType::Income, 250.0, "Salary", "2024-01-01"),
            tx(TransactionType::Income, 3.5, "Freelance", "2024-03-14"),
        ];
        let totals = compute_totals(&list, today());

        assert_eq!(totals.balance, totals.total_income - totals.total_expense);
        assert!(totals.monthly_income <= totals.total_income);
        assert!(totals.monthly_expense <= totals.total_expense);
        assert_eq!(totals.category_totals.sum(), totals.total_expense);
        assert!(totals.category_totals.iter().all(|(name, _)| name != "Salary"));
    }

    #[test]
    fn test_empty_transactions() {
        let totals = compute_totals(&[], today());
        assert_eq!(totals.balance, 0.0);
        assert!(totals.category_totals.is_empty());
        assert!(category_breakdown(&totals.category_totals).is_empty());
    }

    #[test]
    fn test_breakdown_sorted_descending_with_stable_ties() {
        let totals = CategoryTotals::from_iter([
            ("Bills", 20.0),
            ("Food", 50.0),
            ("Transport", 20.0),
            ("Shopping", 5.0),
        ]);
        let names: Vec<String> = category_breakdown(&totals)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Food", "Bills", "Transport", "Shopping"]);
    }

    #[test]
    fn test_category_slices_carry_color_and_percentage() {
        let totals = CategoryTotals::from_iter([("Food", 75.0), ("Gone", 25.0)]);
        let slices = category_slices(&totals, &[]);
        assert_eq!(slices[0].color, "#f59e0b");
        assert_eq!(slices[0].percentage, 75.0);
        assert_eq!(slices[1].color, crate::services::categories::FALLBACK_COLOR);
    }

    #[test]
    fn test_series_always_has_six_buckets_oldest_first() {
        let series = monthly_series(&[], today());
        let labels: Vec<&str> = series.iter().map(|b| b.month.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Oct 2023", "Nov 2023", "Dec 2023", "Jan 2024", "Feb 2024", "Mar 2024"]
        );
        assert!(series.iter().all(|b| b.income == 0.0 && b.expense == 0.0));
    }

    #[test]
    fn test_series_buckets_and_excludes_old_months() {
        let list = vec![
            tx(TransactionType::Income, 100.0, "Salary", "2024-03-01"),
            tx(TransactionType::Expense, 30.0, "Food", "2024-03-20"),
            tx(TransactionType::Expense, 15.0, "Food", "2023-10-01"),
            tx(TransactionType::Expense, 999.0, "Food", "2023-09-30"),
        ];
        let series = monthly_series(&list, today());

        assert_eq!(series.len(), 6);
        assert_eq!(series[0].expense, 15.0);
        assert_eq!(series[5].income, 100.0);
        assert_eq!(series[5].expense, 30.0);
        let charted: f64 = series.iter().map(|b| b.expense).sum();
        assert_eq!(charted, 45.0);
        assert_eq!(compute_totals(&list, today()).total_expense, 1044.0);
    }

    #[test]
    fn test_series_crosses_year_boundary() {
        let january = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let series = monthly_series(&[], january);
        assert_eq!(series.first().unwrap().month, "Aug 2024");
        assert_eq!(series.last().unwrap().month, "Jan 2025");
    }

    #[test]
    fn test_budget_ninety_percent_is_warning_not_critical() {
        let spent = CategoryTotals::from_iter([("Food", 45.0)]);
        let progress = budget_progress(&[budget("Food", 50.0)], &spent);
        assert_eq!(progress[0].percent, 90.0);
        assert_eq!(progress[0].severity, BudgetSeverity::Warning);
    }

    #[test]
    fn test_budget_zero_limit_is_zero_percent() {
        let spent = CategoryTotals::from_iter([("Food", 45.0)]);
        let progress = budget_progress(&[budget("Food", 0.0)], &spent);
        assert_eq!(progress[0].percent, 0.0);
        assert_eq!(progress[0].severity, BudgetSeverity::Ok);
    }

    #[test]
    fn test_budget_percent_clamped_when_over_limit() {
        let spent = CategoryTotals::from_iter([("Food", 300.0)]);
        let progress = budget_progress(&[budget("Food", 100.0)], &spent);
        assert_eq!(progress[0].percent, 100.0);
        assert_eq!(progress[0].spent, 300.0);
        assert_eq!(progress[0].severity, BudgetSeverity::Critical);
    }

    #[test]
    fn test_budget_without_spending_and_ordering() {
        let spent = CategoryTotals::from_iter([("Food", 20.0), ("Bills", 80.0)]);
        let budgets = vec![
            budget("Shopping", 40.0),
            budget("Food", 100.0),
            budget("Bills", 100.0),
        ];
        let progress = budget_progress(&budgets, &spent);
        let order: Vec<&str> = progress.iter().map(|p| p.category_name.as_str()).collect();
        assert_eq!(order, vec!["Bills", "Food", "Shopping"]);
        assert_eq!(progress[2].spent, 0.0);
        assert_eq!(progress[0].severity, BudgetSeverity::Warning);
    }

    #[test]
    fn test_severity_thresholds_are_strict() {
        assert_eq!(BudgetSeverity::from_percent(70.0), BudgetSeverity::Ok);
        assert_eq!(BudgetSeverity::from_percent(70.1), BudgetSeverity::Warning);
        assert_eq!(BudgetSeverity::from_percent(90.1), BudgetSeverity::Critical);
    }

    #[test]
    fn test_category_totals_serialize_as_ordered_map() {
        let totals = CategoryTotals::from_iter([("Food", 1.5), ("Bills", 2.0)]);
        let json = serde_json::to_string(&totals).unwrap();
        assert_eq!(json, r#"{"Food":1.5,"Bills":2.0}"#);
    }
}
