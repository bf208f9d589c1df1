//! CSV export of a (filtered) transaction list.

use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::models::Transaction;

pub const CSV_HEADERS: [&str; 5] = ["Date", "Description", "Category", "Type", "Amount"];

/// Render transactions as CSV: header first, every field double-quoted, embedded
/// quotes doubled, one `\n`-terminated row per transaction.
pub fn transactions_to_csv(transactions: &[Transaction]) -> AppResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;

    for t in transactions {
        let date = t.date.format("%Y-%m-%d").to_string();
        let amount = t.amount_display();
        writer
            .write_record([
                date.as_str(),
                t.description.as_str(),
                t.category.as_str(),
                t.kind.label(),
                amount.as_str(),
            ])
            .map_err(|e| AppError::Internal(format!("CSV write failed: {}", e)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding: {}", e)))
}

/// Download name for an export made on `today`.
pub fn export_filename(today: NaiveDate) -> String {
    format!("finance_export_{}.csv", today.format("%Y-%m-%d"))
}
