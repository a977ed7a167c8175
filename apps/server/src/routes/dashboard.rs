//! Handlers for `/api/dashboard`.

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use shopkeep_core::DashboardStats;

use crate::error::ApiResult;
use crate::extract::Json;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard_stats))
}

async fn dashboard_stats(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.db.reports().dashboard(Utc::now()).await?))
}
