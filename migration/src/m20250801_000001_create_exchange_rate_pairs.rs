use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ExchangeRatePairs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExchangeRatePairs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExchangeRatePairs::Date)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeRatePairs::BaseCurrency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeRatePairs::TargetCurrency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeRatePairs::Rate)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExchangeRatePairs::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique constraint: one rate per pair per date, upserts replace in place
        manager
            .create_index(
                Index::create()
                    .name("idx_exchange_rate_pairs_unique")
                    .table(ExchangeRatePairs::Table)
                    .col(ExchangeRatePairs::Date)
                    .col(ExchangeRatePairs::BaseCurrency)
                    .col(ExchangeRatePairs::TargetCurrency)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index for range scans by pair
        manager
            .create_index(
                Index::create()
                    .name("idx_exchange_rate_pairs_base_target_date")
                    .table(ExchangeRatePairs::Table)
                    .col(ExchangeRatePairs::BaseCurrency)
                    .col(ExchangeRatePairs::TargetCurrency)
                    .col(ExchangeRatePairs::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExchangeRatePairs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ExchangeRatePairs {
    Table,
    Id,
    Date,
    BaseCurrency,
    TargetCurrency,
    Rate,
    CreatedAt,
}
