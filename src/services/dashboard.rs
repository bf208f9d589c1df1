use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Budget, Category, Transaction};
use crate::services::analytics::{
    budget_progress, category_slices, compute_totals, monthly_series, BudgetProgress,
    CategorySlice, FinancialTotals, MonthlyBucket,
};

/// Everything the dashboard view shows, recomputed from scratch after every reload.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub totals: FinancialTotals,
    pub breakdown: Vec<CategorySlice>,
    pub monthly_breakdown: Vec<CategorySlice>,
    pub series: Vec<MonthlyBucket>,
    pub budgets: Vec<BudgetProgress>,
    pub transaction_count: usize,
}

impl Dashboard {
    pub fn build(
        transactions: &[Transaction],
        budgets: &[Budget],
        custom_categories: &[Category],
        today: NaiveDate,
    ) -> Self {
        let totals = compute_totals(transactions, today);
        let breakdown = category_slices(&totals.category_totals, custom_categories);
        let monthly_breakdown =
            category_slices(&totals.monthly_category_totals, custom_categories);
        let budgets = budget_progress(budgets, &totals.monthly_category_totals);

        Self {
            breakdown,
            monthly_breakdown,
            series: monthly_series(transactions, today),
            budgets,
            transaction_count: transactions.len(),
            totals,
        }
    }
}
