//! Core logic for the storefront admin.
//! This crate is the single source of truth for store invariants.

pub mod admin;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod report;
pub mod service;

pub use admin::{AdminError, AdminResult, AdminSite, ChangeListParams, ModelAdmin};
pub use config::{ConfigError, StoreConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::ModelKind;
pub use repo::{RepoError, RepoResult};
pub use report::{hello_page, recent_orders, render_hello, ReportError};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
