//! # Shopkeep Server
//!
//! HTTP/JSON API over the Shopkeep database layer.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET    /health                                                         │
//! │                                                                         │
//! │  /api                                                                   │
//! │  ├── GET    /products                 list (supplier expanded)         │
//! │  ├── POST   /products                 create                           │
//! │  ├── GET    /products/{id}            get                              │
//! │  ├── PUT    /products/{id}            partial update                   │
//! │  ├── DELETE /products/{id}            delete                           │
//! │  ├── GET    /suppliers                list                             │
//! │  ├── POST   /suppliers                create                           │
//! │  ├── GET    /suppliers/{id}           get                              │
//! │  ├── PUT    /suppliers/{id}           partial update                   │
//! │  ├── DELETE /suppliers/{id}           delete (products keep no supplier)│
//! │  ├── GET    /sales                    list, newest first (404 if none) │
//! │  ├── POST   /sales                    create (stock decremented)       │
//! │  ├── DELETE /sales/{id}               delete (stock restored)          │
//! │  ├── GET    /sales/monthly/{y}/{m}    monthly report                   │
//! │  └── GET    /dashboard/stats          headline numbers                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config::AppConfig`]. Environment variables use the `SHOPKEEP__`
//! prefix, e.g. `SHOPKEEP__DATABASE__PATH=/var/lib/shopkeep.db`.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use shopkeep_db::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the application router with all routes and middleware.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy allowing the configured browser origins.
pub fn cors_layer(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| anyhow::anyhow!("invalid CORS origin: {origin}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}
