/// Runtime settings read from the environment
pub mod app;

/// Database configuration and connection management
pub mod database;

/// Optional demo data loaded from a TOML seed file
pub mod seed;

pub use app::{AppConfig, Environment};
