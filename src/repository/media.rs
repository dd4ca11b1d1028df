use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::media::{Column, Entity as Media, Model},
    error::AppResult,
};

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<Model>> {
    Ok(Media::find_by_id(id).one(db).await?)
}

/// Media of a product in display order.
pub async fn list_for_product<C: ConnectionTrait>(db: &C, product_id: Uuid) -> AppResult<Vec<Model>> {
    Ok(Media::find()
        .filter(Column::ProductId.eq(product_id))
        .order_by_asc(Column::SortOrder)
        .all(db)
        .await?)
}

pub async fn delete_for_product<C: ConnectionTrait>(db: &C, product_id: Uuid) -> AppResult<u64> {
    let result = Media::delete_many()
        .filter(Column::ProductId.eq(product_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
