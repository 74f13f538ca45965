use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20240101_000002_create_suppliers_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Suppliers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Suppliers::CompanyName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Suppliers::Phone).string_len(50).null())
                    .col(ColumnDef::new(Suppliers::Address).string_len(512).null())
                    .col(
                        ColumnDef::new(Suppliers::TaxId)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Suppliers::DiscountPct)
                            .decimal_len(5, 2)
                            .null(),
                    )
                    .col(ColumnDef::new(Suppliers::VatPct).decimal_len(5, 2).null())
                    .col(
                        ColumnDef::new(Suppliers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Suppliers {
    Table,
    Id,
    CompanyName,
    Phone,
    Address,
    TaxId,
    DiscountPct,
    VatPct,
    CreatedAt,
}
