//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for Bilancio:
//!
//! - `categories`: spending buckets referenced by splits, budgets and goals
//! - `tags`: free-form transaction labels
//! - `accounts`: money locations; `tracked` accounts feed the budget
//! - `payees`: counterparties, including the starting-balance singleton
//! - `transactions`: dated movements against one account and one payee
//! - `splits`: per-category breakdown of a transaction amount
//! - `transaction_tags`: transaction/tag links
//! - `budgets`, `budget_months`, `budget_month_categories`: monthly
//!   budgeted amounts per category
//! - `schedules`: recurrence presets
//! - `goals`: saving targets against a category
//!
//! Uuid primary keys are stored as 16-byte blobs. Soft deletion is a
//! nullable `deleted_at`; name uniqueness for accounts and payees is a
//! partial `LOWER(name)` index over live rows only, so a soft-deleted
//! row never blocks reuse of its name.

use sea_orm::{ConnectionTrait, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    IsEditable,
    CreatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    Name,
    CreatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    Kind,
    Tracked,
    BalanceMinor,
    CreatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Payees {
    Table,
    Id,
    Name,
    Kind,
    DefaultCategoryId,
    CreatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    PostedOn,
    AccountId,
    PayeeId,
    AmountMinor,
    Notes,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Splits {
    Table,
    Id,
    TransactionId,
    CategoryId,
    AmountMinor,
    Notes,
    Position,
    CreatedAt,
}

#[derive(Iden)]
enum TransactionTags {
    Table,
    TransactionId,
    TagId,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    Name,
    CreatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum BudgetMonths {
    Table,
    Id,
    BudgetId,
    Year,
    Month,
    CreatedAt,
}

#[derive(Iden)]
enum BudgetMonthCategories {
    Table,
    Id,
    BudgetMonthId,
    CategoryId,
    BudgetedMinor,
    CreatedAt,
}

#[derive(Iden)]
enum Schedules {
    Table,
    Id,
    Frequency,
    Interval,
    DisplayName,
    DisplayOrder,
    IsEditable,
    CreatedAt,
}

#[derive(Iden)]
enum Goals {
    Table,
    Id,
    Name,
    Description,
    CategoryId,
    AmountMinor,
    StartDate,
    EndDate,
    ScheduleId,
    CreatedAt,
    DeletedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(
                        ColumnDef::new(Categories::IsEditable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Categories::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Categories::DeletedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Tags::Name).string().not_null())
                    .col(ColumnDef::new(Tags::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Tags::DeletedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::Kind).string().not_null())
                    .col(ColumnDef::new(Accounts::Tracked).boolean().not_null())
                    .col(
                        ColumnDef::new(Accounts::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Accounts::DeletedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        // Partial expression indexes are out of reach for the schema
        // builder, so the live-row name uniqueness goes in raw.
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE UNIQUE INDEX IF NOT EXISTS \"idx-accounts-name-live-unique\" \
                 ON accounts (LOWER(name)) WHERE deleted_at IS NULL;",
            ))
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Payees
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payees::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Payees::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Payees::Name).string().not_null())
                    .col(
                        ColumnDef::new(Payees::Kind)
                            .string()
                            .not_null()
                            .default("normal"),
                    )
                    .col(ColumnDef::new(Payees::DefaultCategoryId).blob())
                    .col(ColumnDef::new(Payees::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Payees::DeletedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payees-default_category_id")
                            .from(Payees::Table, Payees::DefaultCategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE UNIQUE INDEX IF NOT EXISTS \"idx-payees-name-live-unique\" \
                 ON payees (LOWER(name)) WHERE deleted_at IS NULL;",
            ))
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::PostedOn).date().not_null())
                    .col(ColumnDef::new(Transactions::AccountId).blob())
                    .col(ColumnDef::new(Transactions::PayeeId).blob().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-payee_id")
                            .from(Transactions::Table, Transactions::PayeeId)
                            .to(Payees::Table, Payees::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id-posted_on")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .col(Transactions::PostedOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-payee_id")
                    .table(Transactions::Table)
                    .col(Transactions::PayeeId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Splits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Splits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Splits::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Splits::TransactionId).blob().not_null())
                    .col(ColumnDef::new(Splits::CategoryId).blob().not_null())
                    .col(ColumnDef::new(Splits::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Splits::Notes).string())
                    .col(ColumnDef::new(Splits::Position).integer().not_null())
                    .col(ColumnDef::new(Splits::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-splits-transaction_id")
                            .from(Splits::Table, Splits::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-splits-category_id")
                            .from(Splits::Table, Splits::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-splits-transaction_id")
                    .table(Splits::Table)
                    .col(Splits::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-splits-category_id")
                    .table(Splits::Table)
                    .col(Splits::CategoryId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Transaction tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TransactionTags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionTags::TransactionId)
                            .blob()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionTags::TagId).blob().not_null())
                    .primary_key(
                        Index::create()
                            .col(TransactionTags::TransactionId)
                            .col(TransactionTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_tags-transaction_id")
                            .from(TransactionTags::Table, TransactionTags::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_tags-tag_id")
                            .from(TransactionTags::Table, TransactionTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_tags-tag_id")
                    .table(TransactionTags::Table)
                    .col(TransactionTags::TagId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::Name).string().not_null())
                    .col(ColumnDef::new(Budgets::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Budgets::DeletedAt).timestamp())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Budget months
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BudgetMonths::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetMonths::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetMonths::BudgetId).blob().not_null())
                    .col(ColumnDef::new(BudgetMonths::Year).integer().not_null())
                    .col(ColumnDef::new(BudgetMonths::Month).integer().not_null())
                    .col(ColumnDef::new(BudgetMonths::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_months-budget_id")
                            .from(BudgetMonths::Table, BudgetMonths::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_months-budget_id-year-month-unique")
                    .table(BudgetMonths::Table)
                    .col(BudgetMonths::BudgetId)
                    .col(BudgetMonths::Year)
                    .col(BudgetMonths::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. Budget month categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BudgetMonthCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetMonthCategories::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BudgetMonthCategories::BudgetMonthId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetMonthCategories::CategoryId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetMonthCategories::BudgetedMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetMonthCategories::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_month_categories-budget_month_id")
                            .from(
                                BudgetMonthCategories::Table,
                                BudgetMonthCategories::BudgetMonthId,
                            )
                            .to(BudgetMonths::Table, BudgetMonths::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_month_categories-category_id")
                            .from(
                                BudgetMonthCategories::Table,
                                BudgetMonthCategories::CategoryId,
                            )
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_month_categories-month-category-unique")
                    .table(BudgetMonthCategories::Table)
                    .col(BudgetMonthCategories::BudgetMonthId)
                    .col(BudgetMonthCategories::CategoryId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 11. Schedules
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Schedules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Schedules::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Schedules::Frequency).string().not_null())
                    .col(ColumnDef::new(Schedules::Interval).integer().not_null())
                    .col(ColumnDef::new(Schedules::DisplayName).string().not_null())
                    .col(ColumnDef::new(Schedules::DisplayOrder).integer().not_null())
                    .col(
                        ColumnDef::new(Schedules::IsEditable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Schedules::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-schedules-frequency-interval-unique")
                    .table(Schedules::Table)
                    .col(Schedules::Frequency)
                    .col(Schedules::Interval)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 12. Goals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Goals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Goals::Id).blob().not_null().primary_key())
                    .col(ColumnDef::new(Goals::Name).string().not_null())
                    .col(ColumnDef::new(Goals::Description).string())
                    .col(ColumnDef::new(Goals::CategoryId).blob().not_null())
                    .col(ColumnDef::new(Goals::AmountMinor).big_integer())
                    .col(ColumnDef::new(Goals::StartDate).date())
                    .col(ColumnDef::new(Goals::EndDate).date())
                    .col(ColumnDef::new(Goals::ScheduleId).blob())
                    .col(ColumnDef::new(Goals::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Goals::DeletedAt).timestamp())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goals-category_id")
                            .from(Goals::Table, Goals::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-goals-schedule_id")
                            .from(Goals::Table, Goals::ScheduleId)
                            .to(Schedules::Table, Schedules::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-goals-category_id")
                    .table(Goals::Table)
                    .col(Goals::CategoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Goals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Schedules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetMonthCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetMonths::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Splits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        Ok(())
    }
}
