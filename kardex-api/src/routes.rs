//! Stock REST API routes.
//!
//! Three operations, mirroring the legacy warehouse workflow: read a
//! product's stock, retrieve units for a customer, restock units from a
//! delivery. Plus a liveness ping. All heavy lifting happens in
//! [`InventoryService`]; handlers only translate between HTTP and the
//! domain.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use kardex_core::ProductId;
use kardex_storage::{InventoryService, StockStore};
use tower_http::trace::TraceLayer;

use crate::error::ApiResult;
use crate::types::{RestockRequest, RetrieveStockRequest, StockResponse};

/// Build the API router over a service.
pub fn create_router<S: StockStore + 'static>(service: InventoryService<S>) -> Router {
    Router::new()
        .route("/stock/:product_id", get(get_stock::<S>))
        .route("/stock/retrieve", post(retrieve_stock::<S>))
        .route("/stock/restock", post(restock::<S>))
        .route("/health/ping", get(ping))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// GET /stock/{product_id} - Current stock for a product.
///
/// A product the warehouse has never seen reads as quantity 0.
async fn get_stock<S: StockStore + 'static>(
    State(service): State<InventoryService<S>>,
    Path(product_id): Path<ProductId>,
) -> ApiResult<Json<StockResponse>> {
    let quantity = service.get_stock(product_id).await?;
    Ok(Json(StockResponse {
        product_id,
        quantity,
    }))
}

/// POST /stock/retrieve - Take units out of stock.
///
/// Rejected with 409 and no state change when stock is insufficient.
async fn retrieve_stock<S: StockStore + 'static>(
    State(service): State<InventoryService<S>>,
    Json(req): Json<RetrieveStockRequest>,
) -> ApiResult<StatusCode> {
    service.retrieve(req.product_id, req.amount).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /stock/restock - Add units to stock, returning the new level.
async fn restock<S: StockStore + 'static>(
    State(service): State<InventoryService<S>>,
    Json(req): Json<RestockRequest>,
) -> ApiResult<Json<StockResponse>> {
    let quantity = service.restock(req.product_id, req.amount).await?;
    Ok(Json(StockResponse {
        product_id: req.product_id,
        quantity,
    }))
}

/// GET /health/ping - Simple pong response
async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}
