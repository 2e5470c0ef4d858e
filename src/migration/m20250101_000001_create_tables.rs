use sea_orm::Schema;
use sea_orm_migration::prelude::*;

use crate::entity::{
    CartItems, Carts, OrderItems, Orders, Products, Reviews, Users, orders, reviews,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Parents first: cart_items and order_items carry foreign keys.
        manager
            .create_table(schema.create_table_from_entity(Users))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Products))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Carts))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(CartItems))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Orders))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(OrderItems))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Reviews))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_user_id")
                    .table(Orders)
                    .col(orders::Column::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_reviews_product_id")
                    .table(Reviews)
                    .col(reviews::Column::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CartItems).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Carts).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await
    }
}
