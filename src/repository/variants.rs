use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    entity::{
        products::Model as ProductModel,
        variants::{Column, Entity as Variants, Model, in_stock_for},
        Products,
    },
    error::AppResult,
};

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<Model>> {
    Ok(Variants::find_by_id(id).one(db).await?)
}

/// The variant together with the product that prices it.
pub async fn find_with_product<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> AppResult<Option<(Model, Option<ProductModel>)>> {
    Ok(Variants::find_by_id(id)
        .find_also_related(Products)
        .one(db)
        .await?)
}

pub async fn find_by_triple<C: ConnectionTrait>(
    db: &C,
    product_id: Uuid,
    size: &str,
    color: &str,
) -> AppResult<Option<Model>> {
    Ok(Variants::find()
        .filter(Column::ProductId.eq(product_id))
        .filter(Column::Size.eq(size))
        .filter(Column::Color.eq(color))
        .one(db)
        .await?)
}

pub async fn list_for_product<C: ConnectionTrait>(db: &C, product_id: Uuid) -> AppResult<Vec<Model>> {
    Ok(Variants::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_asc(Column::Size)
        .order_by_asc(Column::Color)
        .all(db)
        .await?)
}

pub async fn list_low_stock<C: ConnectionTrait>(db: &C, threshold: i32) -> AppResult<Vec<Model>> {
    Ok(Variants::find()
        .filter(Column::Stock.lte(threshold))
        .order_by_asc(Column::Stock)
        .order_by_asc(Column::ProductId)
        .all(db)
        .await?)
}

/// Conditional decrement: `stock -= quantity` only where `stock >= quantity`.
/// The flag is recomputed from the pre-update value in the same statement.
/// Returns the number of rows changed (0 or 1).
pub async fn try_deduct<C: ConnectionTrait>(db: &C, id: Uuid, quantity: i32) -> AppResult<u64> {
    let result = Variants::update_many()
        .col_expr(Column::Stock, Expr::col(Column::Stock).sub(quantity))
        .col_expr(
            Column::InStock,
            Expr::expr(Expr::col(Column::Stock).sub(quantity)).gt(0),
        )
        .filter(Column::Id.eq(id))
        .filter(Column::Stock.gte(quantity))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Increment that refuses to push stock past `i32::MAX`; zero rows means the
/// variant is missing or the sum would overflow.
pub async fn add_stock<C: ConnectionTrait>(db: &C, id: Uuid, quantity: i32) -> AppResult<u64> {
    let result = Variants::update_many()
        .col_expr(Column::Stock, Expr::col(Column::Stock).add(quantity))
        .col_expr(
            Column::InStock,
            Expr::expr(Expr::col(Column::Stock).add(quantity)).gt(0),
        )
        .filter(Column::Id.eq(id))
        .filter(Column::Stock.lte(i32::MAX.saturating_sub(quantity)))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn set_stock<C: ConnectionTrait>(db: &C, id: Uuid, stock: i32) -> AppResult<u64> {
    let result = Variants::update_many()
        .col_expr(Column::Stock, Expr::value(stock))
        .col_expr(Column::InStock, Expr::value(in_stock_for(stock)))
        .filter(Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn delete_for_product<C: ConnectionTrait>(db: &C, product_id: Uuid) -> AppResult<u64> {
    let result = Variants::delete_many()
        .filter(Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
