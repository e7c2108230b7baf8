pub mod auth;
pub mod config;
pub mod database;
pub mod helpers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;

use std::sync::Arc;

use config::config::Config;
use database::db::Repository;
use service::storage::FileStorage;

pub struct AppState {
    pub db: Arc<dyn Repository>,
    pub storage: Arc<dyn FileStorage>,
    pub env: Config,
}
