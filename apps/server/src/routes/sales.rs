//! Handlers for `/api/sales`.
//!
//! Creation and deletion go through [`shopkeep_db::SaleProcessor`] so stock
//! and the ledger always move together.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::Router;
use shopkeep_core::{MonthlyReport, Sale, SaleDraft, SaleView};

use super::MessageResponse;
use crate::error::{ApiError, ApiResult};
use crate::extract::{Json, Path};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route("/{id}", delete(delete_sale))
        .route("/monthly/{year}/{month}", get(monthly_report))
}

/// Newest first. An empty ledger is a 404, which the web client relies on.
async fn list_sales(State(state): State<AppState>) -> ApiResult<Json<Vec<SaleView>>> {
    let sales = state.db.sales().list().await?;
    if sales.is_empty() {
        return Err(ApiError::not_found("No sales found"));
    }
    Ok(Json(sales))
}

async fn create_sale(
    State(state): State<AppState>,
    Json(draft): Json<SaleDraft>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let sale = state.db.processor().create_sale(draft).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.processor().delete_sale(&id).await?;
    Ok(Json(MessageResponse::deleted("Sale")))
}

async fn monthly_report(
    State(state): State<AppState>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Json<MonthlyReport>> {
    Ok(Json(state.db.reports().monthly(year, month).await?))
}
