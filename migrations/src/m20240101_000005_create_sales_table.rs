use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_users_table::Users;
use crate::m20240101_000002_create_suppliers_table::Suppliers;
use crate::m20240101_000003_create_products_table::Products;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240101_000005_create_sales_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sales::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sales::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sales::UserId).uuid().not_null())
                    // Nullable: deleting a product keeps its historical sales.
                    .col(ColumnDef::new(Sales::ProductId).uuid().null())
                    .col(ColumnDef::new(Sales::SupplierId).uuid().not_null())
                    .col(ColumnDef::new(Sales::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(Sales::UnitPrice)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Sales::SoldAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_user")
                            .from(Sales::Table, Sales::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_product")
                            .from(Sales::Table, Sales::ProductId)
                            .to(Products::Table, Products::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_supplier")
                            .from(Sales::Table, Sales::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_user_id")
                    .table(Sales::Table)
                    .col(Sales::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_product_id")
                    .table(Sales::Table)
                    .col(Sales::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sales::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Sales {
    Table,
    Id,
    UserId,
    ProductId,
    SupplierId,
    Quantity,
    UnitPrice,
    SoldAt,
}
