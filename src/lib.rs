use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tera::Tera;

use crate::helper::i18n_helpers::Dictionaries;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Read-only state built once at startup and shared by every worker.
pub struct AppState {
    pub dictionaries: Dictionaries,
    pub templates: Tera,
}

pub mod config;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup;
