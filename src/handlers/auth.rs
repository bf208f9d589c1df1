use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use tower_cookies::Cookies;

use crate::auth::{end_session, session_user, start_session};
use crate::error::{AppError, AppResult};
use crate::models::{Credentials, User};
use crate::state::AppState;

/// Shortest password accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 6;

fn validate_credentials(credentials: &Credentials) -> AppResult<()> {
    let email = credentials.normalized_email();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email address is required".into()));
    }
    if credentials.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn sign_up(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(credentials): Json<Credentials>,
) -> AppResult<(StatusCode, Json<User>)> {
    validate_credentials(&credentials)?;

    let user = state
        .store
        .sign_up(&credentials.email, &credentials.password)?;
    tracing::info!(user_id = %user.id, "User signed up");

    start_session(&state.sessions, &cookies, user.clone());
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<User>> {
    let user = match state
        .store
        .sign_in(&credentials.email, &credentials.password)
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Failed sign-in attempt");
            return Err(e);
        }
    };

    start_session(&state.sessions, &cookies, user.clone());
    Ok(Json(user))
}

pub async fn sign_out(State(state): State<AppState>, cookies: Cookies) -> StatusCode {
    end_session(&state.sessions, &cookies);
    StatusCode::NO_CONTENT
}

/// The signed-in user, or `null` without a session.
pub async fn me(State(state): State<AppState>, cookies: Cookies) -> Json<Option<User>> {
    Json(session_user(&state.sessions, &cookies))
}
