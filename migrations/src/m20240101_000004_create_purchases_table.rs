use sea_orm_migration::prelude::*;

use crate::m20240101_000002_create_suppliers_table::Suppliers;
use crate::m20240101_000003_create_products_table::Products;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240101_000004_create_purchases_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchases::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchases::SupplierId).uuid().not_null())
                    .col(ColumnDef::new(Purchases::ProductId).uuid().not_null())
                    .col(ColumnDef::new(Purchases::Quantity).integer().not_null())
                    .col(
                        ColumnDef::new(Purchases::UnitPrice)
                            .decimal_len(19, 4)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::Discount)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Purchases::Vat)
                            .decimal_len(5, 2)
                            .not_null()
                            .default(21),
                    )
                    .col(
                        ColumnDef::new(Purchases::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchases_supplier")
                            .from(Purchases::Table, Purchases::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchases_product")
                            .from(Purchases::Table, Purchases::ProductId)
                            .to(Products::Table, Products::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purchases_product_id")
                    .table(Purchases::Table)
                    .col(Purchases::ProductId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Purchases {
    Table,
    Id,
    SupplierId,
    ProductId,
    Quantity,
    UnitPrice,
    Discount,
    Vat,
    PurchasedAt,
}
