use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    entity::{
        order_lines::{Column as LineCol, Entity as OrderLines, Model as LineModel},
        orders::{Column, Entity as Orders, Model, OrderStatus},
    },
    error::AppResult,
};

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<Model>> {
    Ok(Orders::find_by_id(id).one(db).await?)
}

pub async fn lines<C: ConnectionTrait>(db: &C, order_id: Uuid) -> AppResult<Vec<LineModel>> {
    Ok(OrderLines::find()
        .filter(LineCol::OrderId.eq(order_id))
        .order_by_asc(LineCol::Position)
        .all(db)
        .await?)
}

pub async fn count_for_customer<C: ConnectionTrait>(db: &C, customer_id: Uuid) -> AppResult<u64> {
    Ok(Orders::find()
        .filter(Column::CustomerId.eq(customer_id))
        .count(db)
        .await?)
}

pub async fn list_for_customer<C: ConnectionTrait>(
    db: &C,
    customer_id: Uuid,
    status: Option<OrderStatus>,
) -> AppResult<Vec<Model>> {
    let mut finder = Orders::find().filter(Column::CustomerId.eq(customer_id));
    if let Some(status) = status {
        finder = finder.filter(Column::Status.eq(status));
    }
    Ok(finder.order_by_desc(Column::CreatedAt).all(db).await?)
}

/// Move the order to `to` only if it is currently in one of `from`.
/// Returns the number of rows changed (0 or 1).
pub async fn compare_and_set_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    from: &[OrderStatus],
    to: OrderStatus,
) -> AppResult<u64> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let result = Orders::update_many()
        .col_expr(Column::Status, Expr::value(to))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(id))
        .filter(Column::Status.is_in(from.iter().copied()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
