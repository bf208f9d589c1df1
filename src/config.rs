use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::warn;

use crate::models::{AiProvider, AiSettings};

/// Which persistence backend serves the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Relational store in SQLite, schema managed by migrations.
    Sqlite,
    /// Single JSON document on disk (or in memory).
    Local,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Local => "local",
        }
    }
}

impl FromStr for Backend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "local" => Ok(Self::Local),
            _ => Err(()),
        }
    }
}

/// Value of `SPENDWISE_LOCAL_PATH` that keeps the local backend in memory.
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backend: Backend,
    pub database_path: PathBuf,
    pub auto_migrate: bool,
    /// `None` keeps the local document in memory only.
    pub local_path: Option<PathBuf>,
    pub ai: AiSettings,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let backend = match env::var("SPENDWISE_BACKEND") {
            Ok(name) => name.parse().unwrap_or_else(|_| {
                panic!(
                    "Invalid SPENDWISE_BACKEND '{}': expected 'sqlite' or 'local'",
                    name
                )
            }),
            Err(_) => Backend::Sqlite,
        };

        Self {
            host: env::var("SPENDWISE_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("SPENDWISE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7070),
            backend,
            database_path: env::var("SPENDWISE_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|_| PathBuf::from("data/spendwise.db")),
            auto_migrate: env::var("SPENDWISE_AUTO_MIGRATE")
                .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(true),
            local_path: match env::var("SPENDWISE_LOCAL_PATH") {
                Ok(v) if v == IN_MEMORY => None,
                Ok(v) => Some(PathBuf::from(v)),
                Err(_) => Some(PathBuf::from("data/spendwise.json")),
            },
            ai: ai_from_env(),
        }
    }

    /// Settings for an in-process instance: in-memory local backend, default AI settings.
    pub fn in_memory() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            backend: Backend::Local,
            database_path: PathBuf::from(IN_MEMORY),
            auto_migrate: true,
            local_path: None,
            ai: AiSettings::default(),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `SPENDWISE_AI_*` variables on top of the chosen provider's defaults.
/// An unknown provider name falls back to the default provider.
fn ai_from_env() -> AiSettings {
    let provider = env::var("SPENDWISE_AI_PROVIDER")
        .ok()
        .and_then(|name| {
            let parsed = name.trim().to_lowercase().parse::<AiProvider>().ok();
            if parsed.is_none() {
                warn!(provider = %name, "Unknown SPENDWISE_AI_PROVIDER, using default");
            }
            parsed
        })
        .unwrap_or_default();

    AiSettings::for_provider(provider).with_overrides(
        env::var("SPENDWISE_AI_BASE_URL").ok(),
        env::var("SPENDWISE_AI_API_KEY").ok(),
        env::var("SPENDWISE_AI_MODEL").ok(),
    )
}
