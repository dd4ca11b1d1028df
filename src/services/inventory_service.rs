//! Stock mutation for variants.
//!
//! `stock` and `in_stock` are only ever written together, by a single UPDATE
//! statement, so no reader can observe them disagreeing. Deduction is a
//! conditional decrement (`WHERE stock >= n`): two racing deductions can never
//! jointly drive stock below zero, whatever isolation level the store runs at.

use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{
    audit,
    db::with_retries,
    entity::variants::Model as VariantModel,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Variant,
    repository::variants,
    state::AppState,
};

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 5;

/// Reserve `quantity` units of a variant on an open connection or transaction.
pub async fn deduct_in<C: ConnectionTrait>(
    db: &C,
    variant_id: Uuid,
    quantity: i32,
) -> AppResult<VariantModel> {
    ensure_positive(quantity)?;
    if variants::try_deduct(db, variant_id, quantity).await? == 0 {
        return Err(match variants::find_by_id(db, variant_id).await? {
            None => AppError::NotFound("variant"),
            Some(variant) => AppError::InsufficientStock {
                variant_id,
                requested: quantity,
                available: variant.stock,
            },
        });
    }
    reload(db, variant_id).await
}

/// Return `quantity` units to a variant on an open connection or transaction.
pub async fn restock_in<C: ConnectionTrait>(
    db: &C,
    variant_id: Uuid,
    quantity: i32,
) -> AppResult<VariantModel> {
    ensure_positive(quantity)?;
    if variants::add_stock(db, variant_id, quantity).await? == 0 {
        return Err(match variants::find_by_id(db, variant_id).await? {
            None => AppError::NotFound("variant"),
            Some(_) => AppError::Validation("stock would overflow".into()),
        });
    }
    reload(db, variant_id).await
}

pub async fn set_stock_in<C: ConnectionTrait>(
    db: &C,
    variant_id: Uuid,
    new_stock: i32,
) -> AppResult<VariantModel> {
    if new_stock < 0 {
        return Err(AppError::Validation("stock must be >= 0".into()));
    }
    if variants::set_stock(db, variant_id, new_stock).await? == 0 {
        return Err(AppError::NotFound("variant"));
    }
    reload(db, variant_id).await
}

pub async fn deduct(
    state: &AppState,
    user: &AuthUser,
    variant_id: Uuid,
    quantity: i32,
) -> AppResult<Variant> {
    ensure_admin(user)?;
    let variant = with_retries(&state.orm, state.settings, "deduct", |txn| async move {
        let result = deduct_in(&txn, variant_id, quantity).await;
        (txn, result)
    })
    .await?;

    tracing::debug!(%variant_id, quantity, stock = variant.stock, "stock deducted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "stock_deduct",
        "variants",
        serde_json::json!({ "variant_id": variant_id, "quantity": quantity, "stock": variant.stock }),
    )
    .await;

    Ok(variant.into())
}

pub async fn restock(
    state: &AppState,
    user: &AuthUser,
    variant_id: Uuid,
    quantity: i32,
) -> AppResult<Variant> {
    ensure_admin(user)?;
    let variant = with_retries(&state.orm, state.settings, "restock", |txn| async move {
        let result = restock_in(&txn, variant_id, quantity).await;
        (txn, result)
    })
    .await?;

    tracing::debug!(%variant_id, quantity, stock = variant.stock, "stock restocked");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "stock_restock",
        "variants",
        serde_json::json!({ "variant_id": variant_id, "quantity": quantity, "stock": variant.stock }),
    )
    .await;

    Ok(variant.into())
}

/// Administrative absolute set of a variant's stock.
pub async fn set_stock(
    state: &AppState,
    user: &AuthUser,
    variant_id: Uuid,
    new_stock: i32,
) -> AppResult<Variant> {
    ensure_admin(user)?;
    let variant = with_retries(&state.orm, state.settings, "set_stock", |txn| async move {
        let result = set_stock_in(&txn, variant_id, new_stock).await;
        (txn, result)
    })
    .await?;

    tracing::debug!(%variant_id, stock = variant.stock, "stock set");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "stock_set",
        "variants",
        serde_json::json!({ "variant_id": variant_id, "stock": variant.stock }),
    )
    .await;

    Ok(variant.into())
}

pub async fn list_low_stock(
    state: &AppState,
    user: &AuthUser,
    threshold: Option<i32>,
) -> AppResult<Vec<Variant>> {
    ensure_admin(user)?;
    let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
    Ok(variants::list_low_stock(&state.orm, threshold)
        .await?
        .into_iter()
        .map(Variant::from)
        .collect())
}

fn ensure_positive(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::Validation("quantity must be >= 1".into()));
    }
    Ok(())
}

async fn reload<C: ConnectionTrait>(db: &C, variant_id: Uuid) -> AppResult<VariantModel> {
    variants::find_by_id(db, variant_id)
        .await?
        .ok_or(AppError::NotFound("variant"))
}
