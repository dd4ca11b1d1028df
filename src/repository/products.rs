use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::products::{Column, Entity as Products, Model},
    error::AppResult,
};

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<Model>> {
    Ok(Products::find_by_id(id).one(db).await?)
}

pub async fn find_by_sku<C: ConnectionTrait>(db: &C, sku: &str) -> AppResult<Option<Model>> {
    Ok(Products::find().filter(Column::Sku.eq(sku)).one(db).await?)
}

pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Model>> {
    Ok(Products::find()
        .order_by_asc(Column::CreatedAt)
        .order_by_asc(Column::Name)
        .all(db)
        .await?)
}

pub async fn count_for_category<C: ConnectionTrait>(db: &C, category_id: Uuid) -> AppResult<u64> {
    Ok(Products::find()
        .filter(Column::CategoryId.eq(category_id))
        .count(db)
        .await?)
}

pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<u64> {
    let result = Products::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected)
}
