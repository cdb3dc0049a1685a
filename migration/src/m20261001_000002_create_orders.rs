//! Migration to create the orders table backing the OTP handoff lifecycle

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Orders::TransactionId)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Orders::BuyerId).string_len(64).not_null())
                    .col(ColumnDef::new(Orders::SellerId).string_len(64).not_null())
                    .col(ColumnDef::new(Orders::ItemId).string_len(64).not_null())
                    .col(ColumnDef::new(Orders::Amount).decimal_len(12, 2).not_null())
                    .col(ColumnDef::new(Orders::HashedOtp).string_len(60).not_null())
                    .col(
                        ColumnDef::new(Orders::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Orders::Version)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Participant views filter on (party, is_completed)
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_buyer_completed")
                    .table(Orders::Table)
                    .col(Orders::BuyerId)
                    .col(Orders::IsCompleted)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_seller_completed")
                    .table(Orders::Table)
                    .col(Orders::SellerId)
                    .col(Orders::IsCompleted)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    TransactionId,
    BuyerId,
    SellerId,
    ItemId,
    Amount,
    HashedOtp,
    IsCompleted,
    Version,
    CreatedAt,
    UpdatedAt,
}
