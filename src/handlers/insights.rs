use axum::extract::State;
use axum::response::Json;
use axum::Extension;
use serde::Serialize;

use crate::error::AppResult;
use crate::models::User;
use crate::services::ai_client::request_insight_with_settings;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub provider: &'static str,
    pub insight: String,
}

/// Narrative advice over all of the user's transactions. Provider failures
/// come back as a fixed message, not as an error status.
pub async fn generate(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> AppResult<Json<InsightResponse>> {
    let transactions = state.store.list_transactions(&user.id)?;
    let insight = request_insight_with_settings(&state.config.ai, &transactions).await;

    Ok(Json(InsightResponse {
        provider: state.config.ai.provider.as_str(),
        insight,
    }))
}
