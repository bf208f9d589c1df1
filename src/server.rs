use axum::middleware;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::config::{Backend, Config};
use crate::db::{create_pool, migrations};
use crate::handlers;
use crate::state::AppState;
use crate::store::{LocalStore, SqliteStore, Store};

/// Open the backend selected by [`Config::backend`].
///
/// For SQLite the schema is migrated when `auto_migrate` is set; otherwise
/// missing tables are only reported and surface later as `schema_missing`
/// errors.
pub fn create_store(config: &Config) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    match config.backend {
        Backend::Sqlite => {
            let db = create_pool(&config.database_path)?;
            {
                let conn = db.get()?;
                if config.auto_migrate {
                    migrations::run_migrations(&conn)?;
                } else {
                    let missing = migrations::missing_tables(&conn)?;
                    if !missing.is_empty() {
                        tracing::warn!(
                            tables = ?missing,
                            "Database schema is not provisioned; requests will fail until it is"
                        );
                    }
                }
            }
            tracing::info!("Using SQLite backend at {}", config.database_path.display());
            Ok(Arc::new(SqliteStore::new(db)))
        }
        Backend::Local => match &config.local_path {
            Some(path) => {
                tracing::info!("Using local backend at {}", path.display());
                Ok(Arc::new(LocalStore::open(path)?))
            }
            None => {
                tracing::info!("Using in-memory local backend");
                Ok(Arc::new(LocalStore::in_memory()))
            }
        },
    }
}

/// Assemble the router and middleware stack around an existing state.
pub fn build_router(state: AppState) -> Router {
    let protected = handlers::api_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::auth_middleware,
    ));

    Router::new()
        .merge(handlers::public_routes())
        .merge(protected)
        .fallback(handlers::fallback)
        .layer(CookieManagerLayer::new())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build the application state and Axum router from a [`Config`].
pub fn build_app(config: Config) -> Result<(AppState, Router), Box<dyn std::error::Error>> {
    let store = create_store(&config)?;
    let state = AppState::new(store, config);
    let app = build_router(state.clone());
    Ok((state, app))
}

/// Bind the router to `host:port` and spawn the server as a tokio task.
///
/// Returns the actual port the server bound to (useful when `port` is 0 for
/// OS-assigned ports) and a [`JoinHandle`] for the server task.
pub async fn serve(
    app: Router,
    host: &str,
    port: u16,
) -> Result<(u16, JoinHandle<()>), Box<dyn std::error::Error>> {
    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    let actual_port = listener.local_addr()?.port();

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_port, handle))
}
