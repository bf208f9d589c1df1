//! Password hashing, server-side sessions and the session middleware.
//!
//! Session tokens are random UUIDs kept in memory next to the signed-in
//! [`User`]. They are invalidated on sign-out or server restart.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::collections::HashMap;
use std::sync::Mutex;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::state::AppState;

/// Cookie name for the session token.
pub const SESSION_COOKIE: &str = "session";

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against an Argon2 hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        tracing::error!("Invalid password hash format in user record");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Token → user map for every open session.
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, User>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, user: User) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.clone(), user);
        token
    }

    pub fn current_user(&self, token: &str) -> Option<User> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
    }

    pub fn sign_out(&self, token: &str) {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Open a session for `user` and hand the token to the client as an HTTP-only cookie.
pub fn start_session(sessions: &SessionStore, cookies: &Cookies, user: User) {
    let token = sessions.open(user);
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build();
    cookies.add(cookie);
}

/// Drop the session behind the request's cookie, if any, and clear the cookie.
pub fn end_session(sessions: &SessionStore, cookies: &Cookies) {
    if let Some(session_cookie) = cookies.get(SESSION_COOKIE) {
        sessions.sign_out(session_cookie.value());
    }

    let cookie = Cookie::build((SESSION_COOKIE, "")).path("/").http_only(true).build();
    cookies.remove(cookie);
}

/// The user behind the request's session cookie.
pub fn session_user(sessions: &SessionStore, cookies: &Cookies) -> Option<User> {
    cookies
        .get(SESSION_COOKIE)
        .and_then(|c| sessions.current_user(c.value()))
}

/// Reject requests without a valid session; otherwise expose the [`User`] as
/// a request extension for the handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match session_user(&state.sessions, &cookies) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => AppError::Auth("Authentication required".into()).into_response(),
    }
}
