//! Initial schema migration.
//!
//! Creates the complete schema for Budgetry:
//!
//! - `users`: authentication
//! - `accounts`: asset, expense and revenue accounts owned by a user
//! - `budgets`: named spending envelopes owned by a user
//! - `transaction_journals`: one economic event, optionally budgeted
//! - `transactions`: signed amounts on a single account, grouped by journal
//! - `tags` and `journal_tags`: labels attachable to many journals
//! - `budget_limits`: a budget's cap for an exact `[start_date, end_date]`
//! - `available_budgets`: per-currency budgetable amount per period
//!
//! Amounts are stored as decimal strings.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    UserId,
    Name,
    Kind,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    UserId,
    Name,
    NameNorm,
    Active,
}

#[derive(Iden)]
enum TransactionJournals {
    Table,
    Id,
    UserId,
    Kind,
    Date,
    Description,
    BudgetId,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    JournalId,
    AccountId,
    Amount,
    BudgetId,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    UserId,
    Tag,
    TagNorm,
}

#[derive(Iden)]
enum JournalTags {
    Table,
    JournalId,
    TagId,
}

#[derive(Iden)]
enum BudgetLimits {
    Table,
    Id,
    BudgetId,
    StartDate,
    EndDate,
    Amount,
    RepeatFreq,
    Repeats,
}

#[derive(Iden)]
enum AvailableBudgets {
    Table,
    Id,
    UserId,
    Currency,
    StartDate,
    EndDate,
    Amount,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::UserId).string().not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::Kind).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-user_id")
                            .from(Accounts::Table, Accounts::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-user_id")
                    .table(Accounts::Table)
                    .col(Accounts::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Budgets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Budgets::UserId).string().not_null())
                    .col(ColumnDef::new(Budgets::Name).string().not_null())
                    .col(ColumnDef::new(Budgets::NameNorm).string().not_null())
                    .col(
                        ColumnDef::new(Budgets::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-user_id")
                            .from(Budgets::Table, Budgets::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-user_id-name_norm")
                    .table(Budgets::Table)
                    .col(Budgets::UserId)
                    .col(Budgets::NameNorm)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Transaction journals
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TransactionJournals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionJournals::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionJournals::UserId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionJournals::Kind).string().not_null())
                    .col(ColumnDef::new(TransactionJournals::Date).date().not_null())
                    .col(ColumnDef::new(TransactionJournals::Description).string())
                    .col(ColumnDef::new(TransactionJournals::BudgetId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_journals-user_id")
                            .from(TransactionJournals::Table, TransactionJournals::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_journals-budget_id")
                            .from(TransactionJournals::Table, TransactionJournals::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_journals-user_id-date")
                    .table(TransactionJournals::Table)
                    .col(TransactionJournals::UserId)
                    .col(TransactionJournals::Date)
                    .to_owned(),
            )
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
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::JournalId).string().not_null())
                    .col(ColumnDef::new(Transactions::AccountId).string().not_null())
                    .col(ColumnDef::new(Transactions::Amount).string().not_null())
                    .col(ColumnDef::new(Transactions::BudgetId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-journal_id")
                            .from(Transactions::Table, Transactions::JournalId)
                            .to(TransactionJournals::Table, TransactionJournals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-account_id")
                            .from(Transactions::Table, Transactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-budget_id")
                            .from(Transactions::Table, Transactions::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-journal_id")
                    .table(Transactions::Table)
                    .col(Transactions::JournalId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Tags::UserId).string().not_null())
                    .col(ColumnDef::new(Tags::Tag).string().not_null())
                    .col(ColumnDef::new(Tags::TagNorm).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tags-user_id")
                            .from(Tags::Table, Tags::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tags-user_id-tag_norm-unique")
                    .table(Tags::Table)
                    .col(Tags::UserId)
                    .col(Tags::TagNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(JournalTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JournalTags::JournalId).string().not_null())
                    .col(ColumnDef::new(JournalTags::TagId).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(JournalTags::JournalId)
                            .col(JournalTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-journal_tags-journal_id")
                            .from(JournalTags::Table, JournalTags::JournalId)
                            .to(TransactionJournals::Table, TransactionJournals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-journal_tags-tag_id")
                            .from(JournalTags::Table, JournalTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-journal_tags-tag_id")
                    .table(JournalTags::Table)
                    .col(JournalTags::TagId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Budget limits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BudgetLimits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetLimits::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetLimits::BudgetId).string().not_null())
                    .col(ColumnDef::new(BudgetLimits::StartDate).date().not_null())
                    .col(ColumnDef::new(BudgetLimits::EndDate).date().not_null())
                    .col(ColumnDef::new(BudgetLimits::Amount).string().not_null())
                    .col(ColumnDef::new(BudgetLimits::RepeatFreq).string())
                    .col(
                        ColumnDef::new(BudgetLimits::Repeats)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_limits-budget_id")
                            .from(BudgetLimits::Table, BudgetLimits::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_limits-period-unique")
                    .table(BudgetLimits::Table)
                    .col(BudgetLimits::BudgetId)
                    .col(BudgetLimits::StartDate)
                    .col(BudgetLimits::EndDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Available budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(AvailableBudgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AvailableBudgets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AvailableBudgets::UserId).string().not_null())
                    .col(
                        ColumnDef::new(AvailableBudgets::Currency)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(ColumnDef::new(AvailableBudgets::StartDate).date().not_null())
                    .col(ColumnDef::new(AvailableBudgets::EndDate).date().not_null())
                    .col(ColumnDef::new(AvailableBudgets::Amount).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-available_budgets-user_id")
                            .from(AvailableBudgets::Table, AvailableBudgets::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-available_budgets-period-unique")
                    .table(AvailableBudgets::Table)
                    .col(AvailableBudgets::UserId)
                    .col(AvailableBudgets::Currency)
                    .col(AvailableBudgets::StartDate)
                    .col(AvailableBudgets::EndDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(AvailableBudgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetLimits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionJournals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
