use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::Extension;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::{required_text, today, validate_amount};
use crate::models::{NewTransaction, Transaction, TransactionFilter, TransactionType, User};
use crate::services::export::{export_filename, transactions_to_csv};
use crate::state::AppState;

/// Query string of the list and export endpoints. `type=all` (or empty) means no type filter.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl TransactionQuery {
    pub fn to_filter(&self) -> AppResult<TransactionFilter> {
        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(value) => Some(value.parse::<TransactionType>().map_err(|_| {
                AppError::Validation(format!("Unknown transaction type '{value}'"))
            })?),
        };

        Ok(TransactionFilter {
            kind,
            category: self
                .category
                .clone()
                .filter(|c| !c.is_empty() && c != "all"),
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
        })
    }
}

fn validate_new_transaction(mut data: NewTransaction) -> AppResult<NewTransaction> {
    validate_amount(data.amount, "Amount")?;
    data.category = required_text(&data.category, "Category")?;
    data.description = data.description.trim().to_string();
    Ok(data)
}

fn filtered_transactions(
    state: &AppState,
    user: &User,
    query: &TransactionQuery,
) -> AppResult<Vec<Transaction>> {
    let filter = query.to_filter()?;
    let transactions = state.store.list_transactions(&user.id)?;
    Ok(filter.apply(&transactions))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<Json<Vec<Transaction>>> {
    Ok(Json(filtered_transactions(&state, &user, &query)?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(data): Json<NewTransaction>,
) -> AppResult<(StatusCode, Json<Vec<Transaction>>)> {
    let data = validate_new_transaction(data)?;
    state.store.add_transaction(&user.id, data)?;

    let transactions = state.store.list_transactions(&user.id)?;
    Ok((StatusCode::CREATED, Json(transactions)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Json(data): Json<NewTransaction>,
) -> AppResult<Json<Vec<Transaction>>> {
    let data = validate_new_transaction(data)?;

    let existing = state
        .store
        .list_transactions(&user.id)?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;

    let updated = data.into_transaction(existing.id, existing.user_id, existing.created_at);
    state.store.update_transaction(updated)?;

    Ok(Json(state.store.list_transactions(&user.id)?))
}

/// Delete one of the user's transactions. Ids the user does not own are ignored.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Transaction>>> {
    let owned = state
        .store
        .list_transactions(&user.id)?
        .iter()
        .any(|t| t.id == id);
    if owned {
        state.store.delete_transaction(&id)?;
    }

    Ok(Json(state.store.list_transactions(&user.id)?))
}

/// CSV download of the filtered list.
pub async fn export(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<TransactionQuery>,
) -> AppResult<impl IntoResponse> {
    let transactions = filtered_transactions(&state, &user, &query)?;
    let csv = transactions_to_csv(&transactions)?;
    let disposition = format!("attachment; filename=\"{}\"", export_filename(today()));

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}
