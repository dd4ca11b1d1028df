use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    entity::customers::{Column, Entity as Customers, Model},
    error::AppResult,
};

pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<Model>> {
    Ok(Customers::find_by_id(id).one(db).await?)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> AppResult<Option<Model>> {
    Ok(Customers::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await?)
}

pub async fn delete_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<u64> {
    let result = Customers::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected)
}
