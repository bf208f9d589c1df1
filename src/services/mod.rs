pub mod ai_client;
pub mod analytics;
pub mod categories;
pub mod dashboard;
pub mod export;
