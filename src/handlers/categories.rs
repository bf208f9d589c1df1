use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::Extension;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::required_text;
use crate::models::{Category, NewCategory, TransactionType, User};
use crate::services::categories::{all_categories, is_builtin_name, FALLBACK_COLOR};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

fn parse_kind(kind: Option<&str>) -> AppResult<Option<TransactionType>> {
    match kind.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("Unknown category type '{value}'"))),
    }
}

/// `#rgb` or `#rrggbb`.
fn is_hex_color(color: &str) -> bool {
    let Some(hex) = color.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn validate_new_category(mut data: NewCategory) -> AppResult<NewCategory> {
    data.name = required_text(&data.name, "Category name")?;
    if is_builtin_name(&data.name) {
        return Err(AppError::Conflict(format!(
            "'{}' is a built-in category",
            data.name
        )));
    }

    let color = data.color.trim();
    data.color = if color.is_empty() {
        FALLBACK_COLOR.to_string()
    } else if is_hex_color(color) {
        color.to_string()
    } else {
        return Err(AppError::Validation(format!("Invalid color '{color}'")));
    };
    Ok(data)
}

fn categories_for(state: &AppState, user: &User) -> AppResult<Vec<Category>> {
    let custom = state.store.list_custom_categories(&user.id)?;
    Ok(all_categories(&custom, None))
}

/// Built-ins followed by the user's custom categories.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let kind = parse_kind(query.kind.as_deref())?;
    let custom = state.store.list_custom_categories(&user.id)?;
    Ok(Json(all_categories(&custom, kind)))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(data): Json<NewCategory>,
) -> AppResult<(StatusCode, Json<Vec<Category>>)> {
    let data = validate_new_category(data)?;
    state.store.add_custom_category(&user.id, data)?;

    Ok((StatusCode::CREATED, Json(categories_for(&state, &user)?)))
}

/// Delete one of the user's custom categories. Transactions keep the name.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Category>>> {
    let owned = state
        .store
        .list_custom_categories(&user.id)?
        .iter()
        .any(|c| c.id == id);
    if owned {
        state.store.delete_custom_category(&id)?;
    }

    Ok(Json(categories_for(&state, &user)?))
}
