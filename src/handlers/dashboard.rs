use axum::extract::State;
use axum::response::Json;
use axum::Extension;

use crate::error::AppResult;
use crate::handlers::today;
use crate::models::User;
use crate::services::dashboard::Dashboard;
use crate::state::AppState;

pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<Dashboard>> {
    let data = state.load_user_data(&user.id)?;
    Ok(Json(Dashboard::build(
        &data.transactions,
        &data.budgets,
        &data.custom_categories,
        today(),
    )))
}
