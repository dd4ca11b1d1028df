//! Deletion policy across the object graph.
//!
//! | parent   | children         | policy   |
//! |----------|------------------|----------|
//! | product  | variants, media  | cascade  |
//! | customer | orders           | restrict |
//! | category | products         | restrict |
//!
//! Order lines keep their `variant_id` after a product cascade; cancelling such
//! an order skips the restock of the missing variant.

use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{
    audit,
    db::in_transaction,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::DeletedProduct,
    repository::{categories, customers, media, orders, products, variants},
    state::AppState,
};

/// Delete a product together with all of its variants and media, atomically.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<DeletedProduct> {
    ensure_admin(user)?;
    let deleted = in_transaction(&state.orm, state.settings.operation_timeout, |txn| async move {
        let result = delete_product_in(&txn, product_id).await;
        (txn, result)
    })
    .await?;

    tracing::info!(
        %product_id,
        variants = deleted.variants_removed,
        media = deleted.media_removed,
        "product deleted"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({
            "product_id": product_id,
            "variants_removed": deleted.variants_removed,
            "media_removed": deleted.media_removed,
        }),
    )
    .await;

    Ok(deleted)
}

async fn delete_product_in<C: ConnectionTrait>(db: &C, product_id: Uuid) -> AppResult<DeletedProduct> {
    if products::find_by_id(db, product_id).await?.is_none() {
        return Err(AppError::NotFound("product"));
    }
    let media_removed = media::delete_for_product(db, product_id).await?;
    let variants_removed = variants::delete_for_product(db, product_id).await?;
    if products::delete_by_id(db, product_id).await? == 0 {
        return Err(AppError::NotFound("product"));
    }
    Ok(DeletedProduct {
        product_id,
        variants_removed,
        media_removed,
    })
}

/// Delete a customer that owns no orders. Any order, whatever its status,
/// blocks the deletion.
pub async fn delete_customer(state: &AppState, user: &AuthUser, customer_id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    in_transaction(&state.orm, state.settings.operation_timeout, |txn| async move {
        let result = delete_customer_in(&txn, customer_id).await;
        (txn, result)
    })
    .await?;

    tracing::info!(%customer_id, "customer deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "customer_delete",
        "customers",
        serde_json::json!({ "customer_id": customer_id }),
    )
    .await;

    Ok(())
}

async fn delete_customer_in<C: ConnectionTrait>(db: &C, customer_id: Uuid) -> AppResult<()> {
    if customers::find_by_id(db, customer_id).await?.is_none() {
        return Err(AppError::NotFound("customer"));
    }
    let owned = orders::count_for_customer(db, customer_id).await?;
    if owned > 0 {
        return Err(AppError::IntegrityViolation(format!(
            "customer {customer_id} owns {owned} order(s)"
        )));
    }
    // The store's foreign key still guards an order inserted after the count.
    customers::delete_by_id(db, customer_id)
        .await
        .map_err(restrict_violation)?;
    Ok(())
}

/// Delete a category that no product references.
pub async fn delete_category(state: &AppState, user: &AuthUser, category_id: Uuid) -> AppResult<()> {
    ensure_admin(user)?;
    in_transaction(&state.orm, state.settings.operation_timeout, |txn| async move {
        let result = delete_category_in(&txn, category_id).await;
        (txn, result)
    })
    .await?;

    tracing::info!(%category_id, "category deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": category_id }),
    )
    .await;

    Ok(())
}

async fn delete_category_in<C: ConnectionTrait>(db: &C, category_id: Uuid) -> AppResult<()> {
    if categories::find_by_id(db, category_id).await?.is_none() {
        return Err(AppError::NotFound("category"));
    }
    let referencing = products::count_for_category(db, category_id).await?;
    if referencing > 0 {
        return Err(AppError::IntegrityViolation(format!(
            "category {category_id} is used by {referencing} product(s)"
        )));
    }
    categories::delete_by_id(db, category_id)
        .await
        .map_err(restrict_violation)?;
    Ok(())
}

fn restrict_violation(err: AppError) -> AppError {
    match err {
        AppError::OrmError(db_err) => AppError::from_constraint(db_err, || {
            AppError::IntegrityViolation("unique constraint".into())
        }),
        other => other,
    }
}
