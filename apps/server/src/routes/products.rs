//! Handlers for `/api/products`.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use shopkeep_core::{NewProduct, Product, ProductPatch, ProductView};

use super::MessageResponse;
use crate::error::ApiResult;
use crate::extract::{Json, Path};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}

/// All products with their supplier expanded.
async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductView>>> {
    Ok(Json(state.db.products().list().await?))
}

async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductView>> {
    Ok(Json(state.db.products().get_view(&id).await?))
}

async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.db.products().create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<Json<Product>> {
    Ok(Json(state.db.products().update(&id, patch).await?))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.products().delete(&id).await?;
    Ok(Json(MessageResponse::deleted("Product")))
}
