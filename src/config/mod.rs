/// Application settings and seed catalog loaded from `config.toml`
pub mod app;

/// Required backend settings read from the environment
pub mod backend;

/// Database connection, table creation and smoke-test queries
pub mod database;
