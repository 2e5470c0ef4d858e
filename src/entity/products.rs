use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub stock: i32,
    pub image: String,
    pub created_at: DateTimeWithTimeZone,
}

// Carts, orders and reviews point at products by id only; deleting a
// product must not be blocked by them.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
