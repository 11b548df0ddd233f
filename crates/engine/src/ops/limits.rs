use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    BudgetLimit, EngineError, RepeatFrequency, ResultEngine, UserContext, budget_limits, budgets,
    util::{amount_to_storage, ensure_range},
};

use super::{Engine, with_tx};

/// Outcome of [`Engine::update_limit_amount`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LimitUpdate {
    /// No limit is stored for the period any more (or none ever was).
    Deleted,
    Updated(BudgetLimit),
    Created(BudgetLimit),
}

impl LimitUpdate {
    pub fn limit(&self) -> Option<&BudgetLimit> {
        match self {
            Self::Deleted => None,
            Self::Updated(limit) | Self::Created(limit) => Some(limit),
        }
    }
}

/// Input of [`Engine::store_repeating_limit`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LimitStore {
    pub budget_id: Uuid,
    /// Any date inside the period; snapped to the period start.
    pub start: NaiveDate,
    pub period: RepeatFrequency,
    pub amount: Decimal,
    pub repeats: bool,
}

/// `(start ≤ end_date ≤ end) OR (start ≤ start_date ≤ end) OR (start_date ≤ start AND end_date ≥ end)`
fn overlap_condition(start: NaiveDate, end: NaiveDate) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(budget_limits::Column::EndDate.gte(start))
                .add(budget_limits::Column::EndDate.lte(end)),
        )
        .add(
            Condition::all()
                .add(budget_limits::Column::StartDate.gte(start))
                .add(budget_limits::Column::StartDate.lte(end)),
        )
        .add(
            Condition::all()
                .add(budget_limits::Column::StartDate.lte(start))
                .add(budget_limits::Column::EndDate.gte(end)),
        )
}

impl Engine {
    /// Sets the limit of `budget_id` for exactly `[start, end]`.
    ///
    /// - existing limit, `amount <= 0`: the limit is deleted
    /// - existing limit, `amount > 0`: the amount is updated in place
    /// - no limit, `amount > 0`: one limit is created
    /// - no limit, `amount <= 0`: nothing is stored
    pub async fn update_limit_amount(
        &self,
        ctx: &UserContext,
        budget_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
        amount: Decimal,
    ) -> ResultEngine<LimitUpdate> {
        ensure_range(start, end)?;
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, ctx, budget_id).await?;

            let existing = budget_limits::Entity::find()
                .filter(budget_limits::Column::BudgetId.eq(budget_id.to_string()))
                .filter(budget_limits::Column::StartDate.eq(start))
                .filter(budget_limits::Column::EndDate.eq(end))
                .one(&db_tx)
                .await?;

            match existing {
                Some(model) if amount <= Decimal::ZERO => {
                    budget_limits::Entity::delete_by_id(model.id)
                        .exec(&db_tx)
                        .await?;
                    tracing::debug!(budget = %budget_id, %start, %end, "budget limit removed");
                    Ok(LimitUpdate::Deleted)
                }
                Some(model) => {
                    let mut active: budget_limits::ActiveModel = model.into();
                    active.amount = ActiveValue::Set(amount_to_storage(amount));
                    let model = active.update(&db_tx).await?;
                    Ok(LimitUpdate::Updated(BudgetLimit::try_from(model)?))
                }
                None if amount <= Decimal::ZERO => Ok(LimitUpdate::Deleted),
                None => {
                    let limit = BudgetLimit::new(budget_id, start, end, amount);
                    budget_limits::ActiveModel::from(&limit)
                        .insert(&db_tx)
                        .await?;
                    Ok(LimitUpdate::Created(limit))
                }
            }
        })
    }

    /// Stores a limit for the whole period of `data.period` containing
    /// `data.start`.
    ///
    /// Fails with `KeyNotFound("No such budget.")` for an unknown budget and
    /// with `ExistingKey("There already is an entry for these parameters.")`
    /// when the budget already has a limit for that period.
    pub async fn store_repeating_limit(
        &self,
        ctx: &UserContext,
        data: LimitStore,
    ) -> ResultEngine<BudgetLimit> {
        with_tx!(self, |db_tx| {
            let owned = budgets::Entity::find_by_id(data.budget_id.to_string())
                .filter(budgets::Column::UserId.eq(ctx.user_id.clone()))
                .one(&db_tx)
                .await?;
            if owned.is_none() {
                return Err(EngineError::KeyNotFound("No such budget.".to_string()));
            }
            if data.amount <= Decimal::ZERO {
                return Err(EngineError::InvalidAmount(
                    "limit amount must be positive".to_string(),
                ));
            }
            self.insert_repeating_limit(&db_tx, &data).await
        })
    }

    pub(super) async fn insert_repeating_limit(
        &self,
        db: &DatabaseTransaction,
        data: &LimitStore,
    ) -> ResultEngine<BudgetLimit> {
        let start = data.period.start_of(data.start)?;
        let end = data.period.end_of(data.start)?;

        let duplicate = budget_limits::Entity::find()
            .filter(budget_limits::Column::BudgetId.eq(data.budget_id.to_string()))
            .filter(budget_limits::Column::StartDate.eq(start))
            .filter(
                Condition::any()
                    .add(budget_limits::Column::RepeatFreq.eq(data.period.as_str()))
                    .add(budget_limits::Column::EndDate.eq(end)),
            )
            .one(db)
            .await?;
        if duplicate.is_some() {
            return Err(EngineError::ExistingKey(
                "There already is an entry for these parameters.".to_string(),
            ));
        }

        let mut limit = BudgetLimit::new(data.budget_id, start, end, data.amount);
        limit.repeat_freq = Some(data.period);
        limit.repeats = data.repeats;
        budget_limits::ActiveModel::from(&limit).insert(db).await?;
        tracing::debug!(
            budget = %data.budget_id,
            period = data.period.as_str(),
            %start,
            "repeating limit stored"
        );
        Ok(limit)
    }

    /// Limits of one budget overlapping `[start, end]`, latest first.
    pub async fn budget_limits_in_range(
        &self,
        ctx: &UserContext,
        budget_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<BudgetLimit>> {
        ensure_range(start, end)?;
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, ctx, budget_id).await?;
            let models = budget_limits::Entity::find()
                .filter(budget_limits::Column::BudgetId.eq(budget_id.to_string()))
                .filter(overlap_condition(start, end))
                .order_by_desc(budget_limits::Column::StartDate)
                .all(&db_tx)
                .await?;
            models.into_iter().map(BudgetLimit::try_from).collect()
        })
    }

    /// Limits of every budget of the user overlapping `[start, end]`.
    pub async fn all_budget_limits_in_range(
        &self,
        ctx: &UserContext,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<BudgetLimit>> {
        ensure_range(start, end)?;
        let models = budget_limits::Entity::find()
            .inner_join(budgets::Entity)
            .filter(budgets::Column::UserId.eq(ctx.user_id.clone()))
            .filter(overlap_condition(start, end))
            .order_by_asc(budget_limits::Column::StartDate)
            .order_by_asc(budget_limits::Column::BudgetId)
            .all(&self.database)
            .await?;
        models.into_iter().map(BudgetLimit::try_from).collect()
    }

    /// Deletes the user's limits whose amount is zero. Returns how many went.
    pub async fn cleanup_budgets(&self, ctx: &UserContext) -> ResultEngine<u64> {
        with_tx!(self, |db_tx| {
            let models = budget_limits::Entity::find()
                .inner_join(budgets::Entity)
                .filter(budgets::Column::UserId.eq(ctx.user_id.clone()))
                .all(&db_tx)
                .await?;
            let mut zero_ids = Vec::new();
            for model in models {
                let limit = BudgetLimit::try_from(model)?;
                if limit.amount.is_zero() {
                    zero_ids.push(limit.id.to_string());
                }
            }
            if zero_ids.is_empty() {
                return Ok(0);
            }
            let result = budget_limits::Entity::delete_many()
                .filter(budget_limits::Column::Id.is_in(zero_ids))
                .exec(&db_tx)
                .await?;
            tracing::info!(removed = result.rows_affected, "empty budget limits cleaned up");
            Ok(result.rows_affected)
        })
    }

    pub async fn find_budget_limit(
        &self,
        ctx: &UserContext,
        limit_id: Uuid,
    ) -> ResultEngine<Option<BudgetLimit>> {
        budget_limits::Entity::find_by_id(limit_id.to_string())
            .inner_join(budgets::Entity)
            .filter(budgets::Column::UserId.eq(ctx.user_id.clone()))
            .one(&self.database)
            .await?
            .map(BudgetLimit::try_from)
            .transpose()
    }
}
