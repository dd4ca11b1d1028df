use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{LowStockQuery, SetStockRequest, StockQuantityRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Variant,
    response::ApiResponse,
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/low-stock", get(list_low_stock))
        .route("/variants/{id}/deduct", post(deduct_stock))
        .route("/variants/{id}/restock", post(restock))
        .route("/variants/{id}/stock", put(set_stock))
}

#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    params(LowStockQuery),
    responses(
        (status = 200, description = "Variants at or below the threshold", body = ApiResponse<Vec<Variant>>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<Vec<Variant>>>> {
    let items = inventory_service::list_low_stock(&state, &user, query.threshold).await?;
    Ok(Json(ApiResponse::list("Low stock variants", items)))
}

#[utoipa::path(
    post,
    path = "/api/inventory/variants/{id}/deduct",
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = StockQuantityRequest,
    responses(
        (status = 200, description = "Stock deducted", body = ApiResponse<Variant>),
        (status = 400, description = "Quantity must be positive"),
        (status = 404, description = "Variant not found"),
        (status = 409, description = "Insufficient stock"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn deduct_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockQuantityRequest>,
) -> AppResult<Json<ApiResponse<Variant>>> {
    let variant = inventory_service::deduct(&state, &user, id, payload.quantity).await?;
    Ok(Json(ApiResponse::success("Stock deducted", variant, None)))
}

#[utoipa::path(
    post,
    path = "/api/inventory/variants/{id}/restock",
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = StockQuantityRequest,
    responses(
        (status = 200, description = "Stock restocked", body = ApiResponse<Variant>),
        (status = 400, description = "Quantity must be positive"),
        (status = 404, description = "Variant not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn restock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<StockQuantityRequest>,
) -> AppResult<Json<ApiResponse<Variant>>> {
    let variant = inventory_service::restock(&state, &user, id, payload.quantity).await?;
    Ok(Json(ApiResponse::success("Stock restocked", variant, None)))
}

#[utoipa::path(
    put,
    path = "/api/inventory/variants/{id}/stock",
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = SetStockRequest,
    responses(
        (status = 200, description = "Stock set", body = ApiResponse<Variant>),
        (status = 400, description = "Stock must not be negative"),
        (status = 404, description = "Variant not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn set_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStockRequest>,
) -> AppResult<Json<ApiResponse<Variant>>> {
    let variant = inventory_service::set_stock(&state, &user, id, payload.stock).await?;
    Ok(Json(ApiResponse::success("Stock set", variant, None)))
}
