//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the full router (session middleware included) with
//! `oneshot` requests against an in-memory backend, carrying the session
//! cookie between requests like a browser would.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use spendwise::config::{Backend, Config};
use spendwise::db::{create_in_memory_pool, migrations};
use spendwise::server::build_router;
use spendwise::state::AppState;
use spendwise::store::{LocalStore, SqliteStore, Store};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse";

pub struct TestClient {
    state: AppState,
    cookie: Mutex<Option<String>>,
}

/// Fresh SQLite store with the schema applied.
pub fn sqlite_store() -> SqliteStore {
    let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
    {
        let conn = pool.get().expect("Failed to get connection");
        migrations::run_migrations(&conn).expect("Failed to run migrations");
    }
    SqliteStore::new(pool)
}

impl TestClient {
    /// Client backed by an in-memory SQLite database.
    pub fn new() -> Self {
        let mut config = Config::in_memory();
        config.backend = Backend::Sqlite;
        Self::with_store(Arc::new(sqlite_store()), config)
    }

    /// Client backed by the in-memory local document store.
    pub fn local() -> Self {
        Self::with_store(Arc::new(LocalStore::in_memory()), Config::in_memory())
    }

    pub fn with_store(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            state: AppState::new(store, config),
            cookie: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// A second browser against the same backend and session store.
    pub fn another_browser(&self) -> Self {
        Self {
            state: self.state.clone(),
            cookie: Mutex::new(None),
        }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub fn has_session_cookie(&self) -> bool {
        self.cookie.lock().unwrap().is_some()
    }

    /// Send a request, remembering any session cookie the server sets.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        json: Option<Value>,
    ) -> (StatusCode, Vec<(String, String)>, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = self.cookie.lock().unwrap().as_ref() {
            builder = builder.header(header::COOKIE, format!("session={cookie}"));
        }
        let body = match json {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        for set_cookie in response.headers().get_all(header::SET_COOKIE) {
            let raw = set_cookie.to_str().unwrap();
            if let Some(rest) = raw.strip_prefix("session=") {
                let value = rest.split(';').next().unwrap_or_default();
                *self.cookie.lock().unwrap() = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
        }

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, String::from_utf8_lossy(&bytes).to_string())
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let (status, _, body) = self.request("GET", uri, None).await;
        (status, body)
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        (status, parse(&body))
    }

    pub async fn post_json(&self, uri: &str, json: Value) -> (StatusCode, Value) {
        let (status, _, body) = self.request("POST", uri, Some(json)).await;
        (status, parse(&body))
    }

    pub async fn put_json(&self, uri: &str, json: Value) -> (StatusCode, Value) {
        let (status, _, body) = self.request("PUT", uri, Some(json)).await;
        (status, parse(&body))
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.request("DELETE", uri, None).await;
        (status, parse(&body))
    }

    // =========================================================================
    // Helpers for creating entities through the API
    // =========================================================================

    /// Sign up `email` and keep the session. Returns the user id.
    pub async fn sign_up(&self, email: &str) -> String {
        let (status, user) = self
            .post_json(
                "/api/auth/sign-up",
                serde_json::json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {user}");
        user["id"].as_str().unwrap().to_string()
    }

    /// Record a transaction and return the refreshed list.
    pub async fn add_transaction(
        &self,
        kind: &str,
        amount: f64,
        category: &str,
        description: &str,
        date: &str,
    ) -> Value {
        let (status, list) = self
            .post_json(
                "/api/transactions",
                serde_json::json!({
                    "type": kind,
                    "amount": amount,
                    "category": category,
                    "description": description,
                    "date": date,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {list}");
        list
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or(Value::Null)
}

/// Today's date as `YYYY-MM-DD`, matching what the server treats as "this month".
pub fn today() -> String {
    chrono::Local::now().date_naive().to_string()
}
