use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::Date)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::BaseCurrency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::TargetCurrency)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::BaseAmount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::TargetAmount)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::ExchangeRate)
                            .decimal()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::TransactionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::Description)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Index for per-user history listings, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_user_transactions_user_date")
                    .table(UserTransactions::Table)
                    .col(UserTransactions::UserId)
                    .col(UserTransactions::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTransactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserTransactions {
    Table,
    Id,
    UserId,
    Date,
    BaseCurrency,
    TargetCurrency,
    BaseAmount,
    TargetAmount,
    ExchangeRate,
    TransactionType,
    Description,
    CreatedAt,
}
