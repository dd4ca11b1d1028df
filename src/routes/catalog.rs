use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::catalog::{
        AddMediaRequest, CreateCategoryRequest, CreateProductRequest, CreateVariantRequest,
        UpdateCategoryRequest, UpdateMediaRequest, UpdateProductRequest, UpdateVariantRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Category, DeletedProduct, Media, Product, ProductDetails, Variant},
    response::{ApiResponse, Meta},
    services::{catalog_service, integrity_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).patch(update_category).delete(delete_category),
        )
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route(
            "/products/{id}/variants",
            get(list_variants).post(create_variant),
        )
        .route("/products/{id}/media", get(list_media).post(add_media))
        .route("/variants/{id}", patch(update_variant).get(get_variant))
        .route("/media/{id}", get(get_media).patch(update_media))
}

#[utoipa::path(
    get,
    path = "/api/catalog/categories",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<Vec<Category>>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let items = catalog_service::list_categories(&state).await?;
    Ok(Json(ApiResponse::list("Categories", items)))
}

#[utoipa::path(
    post,
    path = "/api/catalog/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>),
        (status = 409, description = "Name already taken"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let category = catalog_service::create_category(&state, &user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Category created", category, None)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/catalog/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Catalog"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = catalog_service::get_category(&state, id).await?;
    Ok(Json(ApiResponse::success("Category", category, None)))
}

#[utoipa::path(
    patch,
    path = "/api/catalog/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Update category", body = ApiResponse<Category>),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Name already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = catalog_service::update_category(&state, &user, id, payload).await?;
    Ok(Json(ApiResponse::success("Category updated", category, None)))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Category still has products"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    integrity_service::delete_category(&state, &user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/catalog/products",
    responses(
        (status = 200, description = "List products with variants and media", body = ApiResponse<Vec<ProductDetails>>)
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<ProductDetails>>>> {
    let items = catalog_service::list_products(&state).await?;
    Ok(Json(ApiResponse::list("Products", items)))
}

#[utoipa::path(
    post,
    path = "/api/catalog/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Create product", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 409, description = "SKU already taken"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let product = catalog_service::create_product(&state, &user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Product created", product, None)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<ProductDetails>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductDetails>>> {
    let product = catalog_service::get_product(&state, id).await?;
    Ok(Json(ApiResponse::success("Product", product, None)))
}

#[utoipa::path(
    patch,
    path = "/api/catalog/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Update product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let product = catalog_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(ApiResponse::success("Product updated", product, None)))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product and its variants and media deleted", body = ApiResponse<DeletedProduct>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeletedProduct>>> {
    let deleted = integrity_service::delete_product(&state, &user, id).await?;
    Ok(Json(ApiResponse::success(
        "Product deleted",
        deleted,
        Some(Meta::empty()),
    )))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "List variants", body = ApiResponse<Vec<Variant>>),
        (status = 404, description = "Product not found"),
    ),
    tag = "Catalog"
)]
pub async fn list_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Variant>>>> {
    let items = catalog_service::list_variants(&state, id).await?;
    Ok(Json(ApiResponse::list("Variants", items)))
}

#[utoipa::path(
    post,
    path = "/api/catalog/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateVariantRequest,
    responses(
        (status = 201, description = "Create variant", body = ApiResponse<Variant>),
        (status = 404, description = "Product not found"),
        (status = 409, description = "Size and color already exist for product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateVariantRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Variant>>)> {
    let variant = catalog_service::create_variant(&state, &user, id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Variant created", variant, None)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/catalog/variants/{id}",
    params(("id" = Uuid, Path, description = "Variant ID")),
    responses(
        (status = 200, description = "Get variant", body = ApiResponse<Variant>),
        (status = 404, description = "Variant not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_variant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Variant>>> {
    let variant = catalog_service::get_variant(&state, id).await?;
    Ok(Json(ApiResponse::success("Variant", variant, None)))
}

#[utoipa::path(
    patch,
    path = "/api/catalog/variants/{id}",
    params(("id" = Uuid, Path, description = "Variant ID")),
    request_body = UpdateVariantRequest,
    responses(
        (status = 200, description = "Update variant", body = ApiResponse<Variant>),
        (status = 404, description = "Variant not found"),
        (status = 409, description = "Size and color already exist for product"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_variant(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVariantRequest>,
) -> AppResult<Json<ApiResponse<Variant>>> {
    let variant = catalog_service::update_variant(&state, &user, id, payload).await?;
    Ok(Json(ApiResponse::success("Variant updated", variant, None)))
}

#[utoipa::path(
    get,
    path = "/api/catalog/products/{id}/media",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "List media in display order", body = ApiResponse<Vec<Media>>)
    ),
    tag = "Catalog"
)]
pub async fn list_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Media>>>> {
    let items = catalog_service::list_media(&state, id).await?;
    Ok(Json(ApiResponse::list("Media", items)))
}

#[utoipa::path(
    post,
    path = "/api/catalog/products/{id}/media",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = AddMediaRequest,
    responses(
        (status = 201, description = "Attach media", body = ApiResponse<Media>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn add_media(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMediaRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Media>>)> {
    let media = catalog_service::add_media(&state, &user, id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Media added", media, None)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/catalog/media/{id}",
    params(("id" = Uuid, Path, description = "Media ID")),
    responses(
        (status = 200, description = "Get media", body = ApiResponse<Media>),
        (status = 404, description = "Media not found"),
    ),
    tag = "Catalog"
)]
pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Media>>> {
    let media = catalog_service::get_media(&state, id).await?;
    Ok(Json(ApiResponse::success("Media", media, None)))
}

#[utoipa::path(
    patch,
    path = "/api/catalog/media/{id}",
    params(("id" = Uuid, Path, description = "Media ID")),
    request_body = UpdateMediaRequest,
    responses(
        (status = 200, description = "Update media", body = ApiResponse<Media>),
        (status = 400, description = "Invalid media"),
        (status = 404, description = "Media not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_media(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMediaRequest>,
) -> AppResult<Json<ApiResponse<Media>>> {
    let media = catalog_service::update_media(&state, &user, id, payload).await?;
    Ok(Json(ApiResponse::success("Media updated", media, None)))
}
