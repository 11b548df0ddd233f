mod common;

use rust_decimal::Decimal;

use engine::{EngineError, LimitStore, LimitUpdate, RepeatFrequency};

use common::{alice, bob, budget, d, dec, engine_with_db};

#[tokio::test]
async fn update_limit_amount_creates_then_updates_in_place() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let groceries = budget(&engine, &ctx, "Groceries").await;
    let (start, end) = (d(2017, 1, 1), d(2017, 1, 31));

    let created = engine
        .update_limit_amount(&ctx, groceries, start, end, dec("200"))
        .await
        .unwrap();
    let LimitUpdate::Created(limit) = created else {
        panic!("expected a new limit, got {created:?}");
    };
    assert_eq!(limit.amount, dec("200"));

    let updated = engine
        .update_limit_amount(&ctx, groceries, start, end, dec("250.50"))
        .await
        .unwrap();
    let LimitUpdate::Updated(updated) = updated else {
        panic!("expected an update, got {updated:?}");
    };
    assert_eq!(updated.id, limit.id);
    assert_eq!(updated.amount, dec("250.5"));

    let stored = engine
        .budget_limits_in_range(&ctx, groceries, start, end)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].amount, dec("250.50"));
}

#[tokio::test]
async fn non_positive_amount_deletes_the_limit() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let groceries = budget(&engine, &ctx, "Groceries").await;
    let (start, end) = (d(2017, 2, 1), d(2017, 2, 28));

    engine
        .update_limit_amount(&ctx, groceries, start, end, dec("100"))
        .await
        .unwrap();
    let outcome = engine
        .update_limit_amount(&ctx, groceries, start, end, Decimal::ZERO)
        .await
        .unwrap();
    assert_eq!(outcome, LimitUpdate::Deleted);
    assert!(outcome.limit().is_none());

    let stored = engine
        .budget_limits_in_range(&ctx, groceries, start, end)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn non_positive_amount_without_limit_stores_nothing() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let groceries = budget(&engine, &ctx, "Groceries").await;

    let outcome = engine
        .update_limit_amount(&ctx, groceries, d(2017, 3, 1), d(2017, 3, 31), dec("-5"))
        .await
        .unwrap();
    assert_eq!(outcome, LimitUpdate::Deleted);
    let stored = engine
        .all_budget_limits_in_range(&ctx, d(2017, 1, 1), d(2017, 12, 31))
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn overlap_query_is_inclusive_on_both_ends() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let groceries = budget(&engine, &ctx, "Groceries").await;

    for (start, end) in [
        (d(2017, 1, 31), d(2017, 2, 28)),
        (d(2016, 12, 1), d(2017, 1, 1)),
        (d(2016, 1, 1), d(2017, 12, 31)),
        (d(2017, 3, 1), d(2017, 3, 31)),
        (d(2016, 11, 1), d(2016, 11, 30)),
    ] {
        engine
            .update_limit_amount(&ctx, groceries, start, end, dec("10"))
            .await
            .unwrap();
    }

    let found = engine
        .budget_limits_in_range(&ctx, groceries, d(2017, 1, 1), d(2017, 1, 31))
        .await
        .unwrap();
    let starts: Vec<_> = found.iter().map(|l| l.start_date).collect();
    assert_eq!(starts, [d(2017, 1, 31), d(2016, 12, 1), d(2016, 1, 1)]);
}

#[tokio::test]
async fn all_limits_in_range_are_scoped_to_the_user() {
    let (engine, _db) = engine_with_db().await;
    let groceries = budget(&engine, &alice(), "Groceries").await;
    let rent = budget(&engine, &bob(), "Rent").await;
    let (start, end) = (d(2017, 1, 1), d(2017, 1, 31));

    engine
        .update_limit_amount(&alice(), groceries, start, end, dec("10"))
        .await
        .unwrap();
    engine
        .update_limit_amount(&bob(), rent, start, end, dec("900"))
        .await
        .unwrap();

    let mine = engine
        .all_budget_limits_in_range(&alice(), start, end)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].budget_id, groceries);

    let err = engine
        .update_limit_amount(&alice(), rent, start, end, dec("1"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("budget not exists".to_string()));
}

#[tokio::test]
async fn repeating_limit_snaps_to_the_period() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let groceries = budget(&engine, &ctx, "Groceries").await;

    let limit = engine
        .store_repeating_limit(
            &ctx,
            LimitStore {
                budget_id: groceries,
                start: d(2017, 8, 17),
                period: RepeatFrequency::HalfYear,
                amount: dec("600"),
                repeats: true,
            },
        )
        .await
        .unwrap();
    assert_eq!(limit.start_date, d(2017, 7, 1));
    assert_eq!(limit.end_date, d(2017, 12, 31));
    assert_eq!(limit.repeat_freq, Some(RepeatFrequency::HalfYear));
    assert!(limit.repeats);

    let monthly = engine
        .store_repeating_limit(
            &ctx,
            LimitStore {
                budget_id: groceries,
                start: d(2017, 8, 17),
                period: RepeatFrequency::Monthly,
                amount: dec("100"),
                repeats: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(monthly.start_date, d(2017, 8, 1));
    assert_eq!(monthly.end_date, d(2017, 8, 31));
}

#[tokio::test]
async fn repeating_limit_rejects_duplicates_and_unknown_budgets() {
    let (engine, _db) = engine_with_db().await;
    let ctx = alice();
    let groceries = budget(&engine, &ctx, "Groceries").await;
    let store = |start| LimitStore {
        budget_id: groceries,
        start,
        period: RepeatFrequency::Monthly,
        amount: dec("100"),
        repeats: false,
    };

    engine
        .store_repeating_limit(&ctx, store(d(2017, 5, 3)))
        .await
        .unwrap();
    let err = engine
        .store_repeating_limit(&ctx, store(d(2017, 5, 28)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::ExistingKey("There already is an entry for these parameters.".to_string())
    );

    let mut foreign = store(d(2017, 5, 3));
    foreign.budget_id = budget(&engine, &bob(), "Bob's").await;
    let err = engine.store_repeating_limit(&ctx, foreign).await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("No such budget.".to_string()));

    let mut unknown_and_zero = store(d(2017, 6, 1));
    unknown_and_zero.budget_id = uuid::Uuid::new_v4();
    unknown_and_zero.amount = Decimal::ZERO;
    let err = engine
        .store_repeating_limit(&ctx, unknown_and_zero)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("No such budget.".to_string()));

    let mut zero = store(d(2017, 6, 1));
    zero.amount = Decimal::ZERO;
    let err = engine.store_repeating_limit(&ctx, zero).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn cleanup_removes_only_zero_limits() {
    let (engine, db) = engine_with_db().await;
    let ctx = alice();
    let groceries = budget(&engine, &ctx, "Groceries").await;

    engine
        .update_limit_amount(&ctx, groceries, d(2017, 1, 1), d(2017, 1, 31), dec("10"))
        .await
        .unwrap();
    let LimitUpdate::Created(zeroed) = engine
        .update_limit_amount(&ctx, groceries, d(2017, 2, 1), d(2017, 2, 28), dec("10"))
        .await
        .unwrap()
    else {
        panic!("expected a new limit");
    };

    // Legacy rows may carry a zero amount.
    use sea_orm::{ConnectionTrait, Statement};
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE budget_limits SET amount = ? WHERE id = ?",
        vec!["0".into(), zeroed.id.to_string().into()],
    ))
    .await
    .unwrap();

    assert_eq!(engine.cleanup_budgets(&ctx).await.unwrap(), 1);
    let left = engine
        .all_budget_limits_in_range(&ctx, d(2017, 1, 1), d(2017, 12, 31))
        .await
        .unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].start_date, d(2017, 1, 1));
    assert!(engine.find_budget_limit(&ctx, zeroed.id).await.unwrap().is_none());
}
