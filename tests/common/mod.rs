#![allow(dead_code)]

use std::time::Duration;

use rust_decimal::Decimal;
use sea_orm::{EntityTrait, QueryOrder};
use uuid::Uuid;
use variant_inventory_core::{
    config::{AppConfig, CoreSettings},
    db::{create_memory_conn, create_orm_conn, run_migrations},
    dto::{
        catalog::{AddMediaRequest, CreateCategoryRequest, CreateProductRequest, CreateVariantRequest},
        customers::CreateCustomerRequest,
    },
    entity::{AuditLogs, audit_logs},
    middleware::auth::{ADMIN_ROLE, AuthUser},
    models::{Media, Product, Variant},
    services::{catalog_service, customer_service},
    state::AppState,
};

/// Fresh, migrated in-memory database per test.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let orm = create_memory_conn().await?;
    run_migrations(&orm).await?;
    let settings = CoreSettings {
        operation_timeout: Duration::from_secs(30),
        ..CoreSettings::default()
    };
    Ok(AppState::new(orm, settings))
}

/// A migrated SQLite file behind a pool of several connections, so concurrent
/// units of work really overlap. The file is removed with the store.
pub struct SharedStore {
    pub state: AppState,
    _dir: tempfile::TempDir,
}

pub async fn setup_shared_state(max_connections: u32) -> anyhow::Result<SharedStore> {
    let dir = tempfile::tempdir()?;
    let config = AppConfig {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("store.db").display()),
        host: "127.0.0.1".into(),
        port: 0,
        db_max_connections: max_connections,
        db_acquire_timeout: Duration::from_secs(30),
        operation_timeout: Duration::from_secs(60),
        order_max_retries: 50,
    };
    let orm = create_orm_conn(&config).await?;
    run_migrations(&orm).await?;
    Ok(SharedStore {
        state: AppState::new(orm, config.core_settings()),
        _dir: dir,
    })
}

pub fn admin() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: ADMIN_ROLE.into(),
    }
}

pub fn shopper(customer_id: Uuid) -> AuthUser {
    AuthUser {
        user_id: customer_id,
        role: "user".into(),
    }
}

pub async fn create_customer(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let customer = customer_service::create_customer(
        state,
        CreateCustomerRequest {
            name: "Test Customer".into(),
            email: email.into(),
            password_hash: "dummy-hash".into(),
            shipping_address: Some("Calle 1, Ciudad".into()),
        },
    )
    .await?;
    Ok(customer.id)
}

/// Category plus product at `price_cents`, returned with its category id.
pub async fn create_product(state: &AppState, sku: &str, price_cents: i64) -> anyhow::Result<Product> {
    let admin = admin();
    let category = catalog_service::create_category(
        state,
        &admin,
        CreateCategoryRequest {
            name: format!("Category {sku}"),
            description: None,
        },
    )
    .await?;
    let product = catalog_service::create_product(
        state,
        &admin,
        CreateProductRequest {
            name: format!("Product {sku}"),
            description: Some("A product for testing".into()),
            price: Decimal::new(price_cents, 2),
            sku: sku.into(),
            category_id: category.id,
        },
    )
    .await?;
    Ok(product)
}

pub async fn create_variant(
    state: &AppState,
    product_id: Uuid,
    size: &str,
    color: &str,
    stock: i32,
) -> anyhow::Result<Variant> {
    let variant = catalog_service::create_variant(
        state,
        &admin(),
        product_id,
        CreateVariantRequest {
            size: size.into(),
            color: color.into(),
            stock,
        },
    )
    .await?;
    Ok(variant)
}

pub async fn add_image(state: &AppState, product_id: Uuid, order: i32) -> anyhow::Result<Media> {
    let media = catalog_service::add_media(
        state,
        &admin(),
        product_id,
        AddMediaRequest {
            url: format!("https://cdn.example.com/{product_id}/{order}.jpg"),
            is_image: true,
            order,
        },
    )
    .await?;
    Ok(media)
}

pub async fn stock_of(state: &AppState, variant_id: Uuid) -> anyhow::Result<(i32, bool)> {
    let variant = catalog_service::get_variant(state, variant_id).await?;
    Ok((variant.stock, variant.in_stock))
}

/// Audit actions in the order they were written.
pub async fn audit_actions(state: &AppState) -> anyhow::Result<Vec<String>> {
    let rows = AuditLogs::find()
        .order_by_asc(audit_logs::Column::CreatedAt)
        .all(&state.orm)
        .await?;
    Ok(rows.into_iter().map(|row| row.action).collect())
}
