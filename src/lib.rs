pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod use_cases;
pub mod utils;
pub mod validation;
pub mod warehouse;

use axum::{
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, TableRef};
use crate::warehouse::Warehouse;

#[derive(Clone)]
pub struct AppState {
    pub warehouse: Arc<dyn Warehouse>,
    pub table: TableRef,
    pub start_time: Instant,
    pub log_request_body: bool,
}

impl AppState {
    pub fn new(config: &Config, warehouse: Arc<dyn Warehouse>) -> Self {
        Self {
            warehouse,
            table: config.table.clone(),
            start_time: Instant::now(),
            log_request_body: config.log_request_body,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", any(handlers::sales::sales_data))
        .route("/health", get(handlers::health))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_logger::request_logger_middleware,
        ))
        .with_state(state)
}
