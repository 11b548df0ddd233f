#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

use engine::{
    AccountKind, BudgetStore, Engine, JournalKind, JournalStore, PostingStore, UserContext,
};
use migration::MigratorTrait;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for user in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![user.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub fn alice() -> UserContext {
    UserContext::new("alice")
}

pub fn bob() -> UserContext {
    UserContext::new("bob")
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

/// Accounts most tests book against.
pub struct Ledger {
    pub checking: Uuid,
    pub savings: Uuid,
    pub shop: Uuid,
    pub employer: Uuid,
}

pub async fn ledger(engine: &Engine, ctx: &UserContext) -> Ledger {
    let checking = engine
        .store_account(ctx, "Checking", AccountKind::Asset)
        .await
        .unwrap();
    let savings = engine
        .store_account(ctx, "Savings", AccountKind::Asset)
        .await
        .unwrap();
    let shop = engine
        .store_account(ctx, "Supermarket", AccountKind::Expense)
        .await
        .unwrap();
    let employer = engine
        .store_account(ctx, "Employer", AccountKind::Revenue)
        .await
        .unwrap();
    Ledger {
        checking: checking.id,
        savings: savings.id,
        shop: shop.id,
        employer: employer.id,
    }
}

pub async fn budget(engine: &Engine, ctx: &UserContext, name: &str) -> Uuid {
    engine
        .store_budget(
            ctx,
            BudgetStore {
                name: name.to_string(),
                initial_limit: None,
            },
        )
        .await
        .unwrap()
        .id
}

/// Books a two-posting journal moving `amount` from `from` to `to`.
pub async fn book(
    engine: &Engine,
    ctx: &UserContext,
    kind: JournalKind,
    date: NaiveDate,
    from: Uuid,
    to: Uuid,
    amount: &str,
    budget_id: Option<Uuid>,
    tag_ids: &[Uuid],
) -> Uuid {
    let amount = dec(amount);
    engine
        .store_journal(
            ctx,
            JournalStore {
                kind,
                date,
                description: None,
                budget_id,
                tag_ids: tag_ids.to_vec(),
                postings: vec![
                    PostingStore {
                        account_id: from,
                        amount: -amount,
                        budget_id: None,
                    },
                    PostingStore {
                        account_id: to,
                        amount,
                        budget_id: None,
                    },
                ],
            },
        )
        .await
        .unwrap()
}
