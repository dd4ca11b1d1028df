use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{customers::CreateCustomerRequest, orders::OrderListQuery},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Customer, Order},
    response::ApiResponse,
    services::{customer_service, integrity_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer))
        .route("/{id}", get(get_customer).delete(delete_customer))
        .route("/{id}/orders", get(list_customer_orders))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer registered", body = ApiResponse<Customer>),
        (status = 400, description = "Invalid customer"),
        (status = 409, description = "Email already registered"),
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CreateCustomerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Customer>>)> {
    let customer = customer_service::create_customer(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Customer registered", customer, None)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Get customer", body = ApiResponse<Customer>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let customer = customer_service::get_customer(&state, &user, id).await?;
    Ok(Json(ApiResponse::success("Customer", customer, None)))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Customer still owns orders"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    integrity_service::delete_customer(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}/orders",
    params(
        ("id" = Uuid, Path, description = "Customer ID"),
        OrderListQuery
    ),
    responses(
        (status = 200, description = "Orders of the customer, newest first", body = ApiResponse<Vec<Order>>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Customers"
)]
pub async fn list_customer_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let items = order_service::list_orders(&state, &user, id, query.status).await?;
    Ok(Json(ApiResponse::list("Orders", items)))
}
