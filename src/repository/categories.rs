use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::categories::{Column, Entity as Categories, Model},
    error::AppResult,
};

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<Model>> {
    Ok(Categories::find_by_id(id).one(db).await?)
}

pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> AppResult<Option<Model>> {
    Ok(Categories::find()
        .filter(Column::Name.eq(name))
        .one(db)
        .await?)
}

pub async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<Model>> {
    Ok(Categories::find()
        .order_by_asc(Column::Name)
        .all(db)
        .await?)
}

pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<u64> {
    let result = Categories::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected)
}
