//! Route definitions.

pub mod dashboard;
pub mod health;
pub mod products;
pub mod sales;
pub mod suppliers;

use axum::Router;
use serde::Serialize;

use crate::AppState;

/// Routes mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", products::routes())
        .nest("/suppliers", suppliers::routes())
        .nest("/sales", sales::routes())
        .nest("/dashboard", dashboard::routes())
}

/// Body of a successful delete.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn deleted(entity: &str) -> Self {
        MessageResponse {
            message: format!("{entity} deleted successfully"),
        }
    }
}
