use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "variants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub size: String,
    pub color: String,
    pub stock: i32,
    /// Cached `stock > 0`; written only together with `stock`.
    pub in_stock: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// The in-stock flag a variant must carry for the given stock level.
pub fn in_stock_for(stock: i32) -> bool {
    stock > 0
}

#[cfg(test)]
mod tests {
    use super::in_stock_for;

    #[test]
    fn flag_tracks_positive_stock() {
        assert!(!in_stock_for(0));
        assert!(in_stock_for(1));
        assert!(in_stock_for(20));
    }
}
