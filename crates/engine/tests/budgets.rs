mod common;

use chrono::Utc;
use rust_decimal::Decimal;

use engine::{
    BudgetStore, BudgetUpdate, Currency, EngineError, InitialLimit, JournalKind, RepeatFrequency,
};

use common::{alice, bob, book, budget, d, dec, engine_with_db, ledger};

#[tokio::test]
async fn store_budget_with_initial_limit_covers_today() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();

    let created = engine
        .store_budget(
            &ctx,
            BudgetStore {
                name: "  Groceries ".to_string(),
                initial_limit: Some(InitialLimit {
                    amount: dec("300"),
                    period: RepeatFrequency::Monthly,
                }),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.name, "Groceries");
    assert!(created.active);

    let today = Utc::now().date_naive();
    let limits = engine
        .budget_limits_in_range(&ctx, created.id, today, today)
        .await
        .unwrap();
    assert_eq!(limits.len(), 1);
    assert_eq!(limits[0].start_date, RepeatFrequency::Monthly.start_of(today).unwrap());
    assert_eq!(limits[0].end_date, RepeatFrequency::Monthly.end_of(today).unwrap());
    assert_eq!(limits[0].amount, dec("300"));
}

#[tokio::test]
async fn budget_names_are_unique_ignoring_case_and_width() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    budget(&engine, &ctx, "Eating Out").await;

    let err = engine
        .store_budget(
            &ctx,
            BudgetStore {
                name: "ｅａｔｉｎｇ   out".to_string(),
                initial_limit: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    let found = engine
        .find_budget_by_name(&ctx, "EATING OUT")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "Eating Out");
    assert!(engine.find_budget_by_name(&bob(), "Eating Out").await.unwrap().is_none());
}

#[tokio::test]
async fn active_and_inactive_lists_are_sorted_by_name() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let rent = budget(&engine, &ctx, "rent").await;
    budget(&engine, &ctx, "Groceries").await;
    budget(&engine, &ctx, "car").await;

    engine
        .update_budget(
            &ctx,
            rent,
            BudgetUpdate {
                name: "Rent".to_string(),
                active: false,
            },
        )
        .await
        .unwrap();

    let all: Vec<_> = engine
        .budgets(&ctx)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(all, ["car", "Groceries", "Rent"]);

    let active: Vec<_> = engine
        .active_budgets(&ctx)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert_eq!(active, ["car", "Groceries"]);

    let inactive = engine.inactive_budgets(&ctx).await.unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(inactive[0].id, rent);

    let select = engine.budget_select_list(&ctx).await.unwrap();
    assert_eq!(select.len(), 2);
    assert_eq!(select[0].1, "car");
}

#[tokio::test]
async fn destroy_budget_removes_limits_and_unlinks_journals() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let accounts = ledger(&engine, &ctx).await;
    let groceries = budget(&engine, &ctx, "Groceries").await;
    engine
        .update_limit_amount(&ctx, groceries, d(2017, 1, 1), d(2017, 1, 31), dec("100"))
        .await
        .unwrap();
    book(
        &engine,
        &ctx,
        JournalKind::Withdrawal,
        d(2017, 1, 10),
        accounts.checking,
        accounts.shop,
        "12.34",
        Some(groceries),
        &[],
    )
    .await;

    engine.destroy_budget(&ctx, groceries).await.unwrap();

    assert!(engine.find_budget(&ctx, groceries).await.unwrap().is_none());
    assert!(
        engine
            .all_budget_limits_in_range(&ctx, d(2017, 1, 1), d(2017, 1, 31))
            .await
            .unwrap()
            .is_empty()
    );
    let unbudgeted = engine
        .spent_in_period_without_budget(&ctx, &[], d(2017, 1, 1), d(2017, 1, 31))
        .await
        .unwrap();
    assert_eq!(unbudgeted, dec("-12.34"));

    let err = engine.destroy_budget(&ctx, groceries).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("budget not exists".to_string()));
}

#[tokio::test]
async fn first_use_date_prefers_older_journals() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let accounts = ledger(&engine, &ctx).await;
    let groceries = budget(&engine, &ctx, "Groceries").await;
    let today = d(2017, 6, 15);

    assert_eq!(
        engine.first_use_date(&ctx, groceries, today).await.unwrap(),
        d(2017, 1, 1)
    );

    book(
        &engine,
        &ctx,
        JournalKind::Withdrawal,
        d(2016, 3, 4),
        accounts.checking,
        accounts.shop,
        "5",
        Some(groceries),
        &[],
    )
    .await;
    assert_eq!(
        engine.first_use_date(&ctx, groceries, today).await.unwrap(),
        d(2016, 3, 4)
    );
}

#[tokio::test]
async fn available_budget_is_upserted_per_period_and_currency() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let (start, end) = (d(2017, 1, 1), d(2017, 1, 31));

    assert_eq!(
        engine
            .available_budget(&ctx, Currency::Eur, start, end)
            .await
            .unwrap(),
        Decimal::ZERO
    );

    engine
        .set_available_budget(&ctx, Currency::Eur, start, end, dec("1500"))
        .await
        .unwrap();
    engine
        .set_available_budget(&ctx, Currency::Eur, start, end, dec("1750.25"))
        .await
        .unwrap();
    engine
        .set_available_budget(&ctx, Currency::Usd, start, end, dec("10"))
        .await
        .unwrap();

    assert_eq!(
        engine
            .available_budget(&ctx, Currency::Eur, start, end)
            .await
            .unwrap(),
        dec("1750.25")
    );
    assert_eq!(
        engine
            .available_budget(&bob(), Currency::Eur, start, end)
            .await
            .unwrap(),
        Decimal::ZERO
    );
}

#[tokio::test]
async fn spent_in_period_defaults_to_asset_accounts() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let accounts = ledger(&engine, &ctx).await;
    let groceries = budget(&engine, &ctx, "Groceries").await;

    book(
        &engine,
        &ctx,
        JournalKind::Withdrawal,
        d(2017, 1, 10),
        accounts.checking,
        accounts.shop,
        "20.10",
        Some(groceries),
        &[],
    )
    .await;
    book(
        &engine,
        &ctx,
        JournalKind::Withdrawal,
        d(2017, 1, 11),
        accounts.savings,
        accounts.shop,
        "4.90",
        Some(groceries),
        &[],
    )
    .await;
    book(
        &engine,
        &ctx,
        JournalKind::Withdrawal,
        d(2017, 2, 1),
        accounts.checking,
        accounts.shop,
        "100",
        Some(groceries),
        &[],
    )
    .await;

    let all = engine
        .spent_in_period(&ctx, &[groceries], &[], d(2017, 1, 1), d(2017, 1, 31))
        .await
        .unwrap();
    assert_eq!(all, dec("-25.00"));

    let checking_only = engine
        .spent_in_period(
            &ctx,
            &[groceries],
            &[accounts.checking],
            d(2017, 1, 1),
            d(2017, 1, 31),
        )
        .await
        .unwrap();
    assert_eq!(checking_only, dec("-20.10"));

    let postings = engine
        .journals_for_budget(&ctx, groceries, d(2017, 1, 1), d(2017, 1, 31))
        .await
        .unwrap();
    assert_eq!(postings.len(), 4);
}

#[tokio::test]
async fn journals_must_balance_and_reference_owned_rows() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let accounts = ledger(&engine, &ctx).await;
    let foreign = budget(&engine, &bob(), "Bob's").await;

    let unbalanced = engine
        .store_journal(
            &ctx,
            engine::JournalStore {
                kind: JournalKind::Withdrawal,
                date: d(2017, 1, 1),
                description: Some("lunch".to_string()),
                budget_id: None,
                tag_ids: vec![],
                postings: vec![
                    engine::PostingStore {
                        account_id: accounts.checking,
                        amount: dec("-10"),
                        budget_id: None,
                    },
                    engine::PostingStore {
                        account_id: accounts.shop,
                        amount: dec("9.99"),
                        budget_id: None,
                    },
                ],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(unbalanced, EngineError::InvalidAmount(_)));

    let err = engine
        .store_journal(
            &ctx,
            engine::JournalStore {
                kind: JournalKind::Withdrawal,
                date: d(2017, 1, 1),
                description: None,
                budget_id: Some(foreign),
                tag_ids: vec![],
                postings: vec![
                    engine::PostingStore {
                        account_id: accounts.checking,
                        amount: dec("-10"),
                        budget_id: None,
                    },
                    engine::PostingStore {
                        account_id: accounts.shop,
                        amount: dec("10"),
                        budget_id: None,
                    },
                ],
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("budget not exists".to_string()));
}
