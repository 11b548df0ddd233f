use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    AmountSign, Budget, CollectedTransaction, Currency, EngineError, JournalKind, JournalQuery,
    RepeatFrequency, ResultEngine, UserContext, available_budgets, budget_limits, budgets,
    journals, transactions,
    util::{
        amount_to_storage, checked_sum, ensure_range, normalize_display_name, normalize_name_key,
        parse_amount,
    },
};

use super::{Engine, LimitStore, with_tx};

/// Limit created together with a new budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitialLimit {
    pub amount: Decimal,
    pub period: RepeatFrequency,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetStore {
    pub name: String,
    pub initial_limit: Option<InitialLimit>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetUpdate {
    pub name: String,
    pub active: bool,
}

impl Engine {
    /// Creates a budget.
    ///
    /// When `initial_limit` carries a positive amount, a limit for the period
    /// containing today is stored with it.
    pub async fn store_budget(&self, ctx: &UserContext, data: BudgetStore) -> ResultEngine<Budget> {
        let name = normalize_display_name(&data.name, "budget name")?;
        let name_norm = normalize_name_key(&name);
        let today = Utc::now().date_naive();
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, ctx).await?;
            let exists = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(ctx.user_id.clone()))
                .filter(budgets::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(format!("budget {name} already exists")));
            }

            let id = Uuid::new_v4();
            let model = budgets::ActiveModel::new(id, &ctx.user_id, name, name_norm)
                .insert(&db_tx)
                .await?;

            if let Some(initial) = data.initial_limit.filter(|l| l.amount > Decimal::ZERO) {
                let limit = LimitStore {
                    budget_id: id,
                    start: today,
                    period: initial.period,
                    amount: initial.amount,
                    repeats: false,
                };
                self.insert_repeating_limit(&db_tx, &limit).await?;
            }

            tracing::info!(budget = %id, "budget created");
            Budget::try_from(model)
        })
    }

    pub async fn update_budget(
        &self,
        ctx: &UserContext,
        budget_id: Uuid,
        data: BudgetUpdate,
    ) -> ResultEngine<Budget> {
        let name = normalize_display_name(&data.name, "budget name")?;
        let name_norm = normalize_name_key(&name);
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, ctx, budget_id).await?;
            let clash = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(ctx.user_id.clone()))
                .filter(budgets::Column::NameNorm.eq(name_norm.clone()))
                .filter(budgets::Column::Id.ne(budget_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if clash {
                return Err(EngineError::ExistingKey(format!("budget {name} already exists")));
            }

            let active = budgets::ActiveModel {
                id: ActiveValue::Set(budget_id.to_string()),
                name: ActiveValue::Set(name),
                name_norm: ActiveValue::Set(name_norm),
                active: ActiveValue::Set(data.active),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Budget::try_from(model)
        })
    }

    /// Deletes a budget with its limits. Journals and postings that used it
    /// lose their budget.
    pub async fn destroy_budget(&self, ctx: &UserContext, budget_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, ctx, budget_id).await?;
            let id = budget_id.to_string();

            budget_limits::Entity::delete_many()
                .filter(budget_limits::Column::BudgetId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            transactions::Entity::update_many()
                .col_expr(transactions::Column::BudgetId, Expr::value(Option::<String>::None))
                .filter(transactions::Column::BudgetId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            journals::Entity::update_many()
                .col_expr(journals::Column::BudgetId, Expr::value(Option::<String>::None))
                .filter(journals::Column::BudgetId.eq(id.clone()))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_by_id(id).exec(&db_tx).await?;

            tracing::info!(budget = %budget_id, "budget destroyed");
            Ok(())
        })
    }

    pub async fn find_budget(
        &self,
        ctx: &UserContext,
        budget_id: Uuid,
    ) -> ResultEngine<Option<Budget>> {
        budgets::Entity::find_by_id(budget_id.to_string())
            .filter(budgets::Column::UserId.eq(ctx.user_id.clone()))
            .one(&self.database)
            .await?
            .map(Budget::try_from)
            .transpose()
    }

    /// Looks a budget up by name, ignoring case and Unicode form.
    pub async fn find_budget_by_name(
        &self,
        ctx: &UserContext,
        name: &str,
    ) -> ResultEngine<Option<Budget>> {
        budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(ctx.user_id.clone()))
            .filter(budgets::Column::NameNorm.eq(normalize_name_key(name)))
            .one(&self.database)
            .await?
            .map(Budget::try_from)
            .transpose()
    }

    /// All budgets, sorted by lower-cased name.
    pub async fn budgets(&self, ctx: &UserContext) -> ResultEngine<Vec<Budget>> {
        self.budgets_where(ctx, None).await
    }

    pub async fn active_budgets(&self, ctx: &UserContext) -> ResultEngine<Vec<Budget>> {
        self.budgets_where(ctx, Some(true)).await
    }

    pub async fn inactive_budgets(&self, ctx: &UserContext) -> ResultEngine<Vec<Budget>> {
        self.budgets_where(ctx, Some(false)).await
    }

    async fn budgets_where(
        &self,
        ctx: &UserContext,
        active: Option<bool>,
    ) -> ResultEngine<Vec<Budget>> {
        let mut query = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(ctx.user_id.clone()));
        if let Some(active) = active {
            query = query.filter(budgets::Column::Active.eq(active));
        }
        let mut out = query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Budget::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        out.sort_by_key(|b| b.name.to_lowercase());
        Ok(out)
    }

    /// `(id, name)` of every active budget, for select inputs.
    pub async fn budget_select_list(&self, ctx: &UserContext) -> ResultEngine<Vec<(Uuid, String)>> {
        Ok(self
            .active_budgets(ctx)
            .await?
            .into_iter()
            .map(|b| (b.id, b.name))
            .collect())
    }

    /// Earliest of 1 January of `today`'s year and the first date a journal or
    /// posting used the budget.
    pub async fn first_use_date(
        &self,
        ctx: &UserContext,
        budget_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<NaiveDate> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, ctx, budget_id).await?;
            let mut oldest = RepeatFrequency::Yearly.start_of(today)?;
            let id = budget_id.to_string();

            let journal = journals::Entity::find()
                .filter(journals::Column::UserId.eq(ctx.user_id.clone()))
                .filter(journals::Column::BudgetId.eq(id.clone()))
                .order_by_asc(journals::Column::Date)
                .one(&db_tx)
                .await?;
            if let Some(journal) = journal {
                oldest = oldest.min(journal.date);
            }

            let posting = transactions::Entity::find()
                .find_also_related(journals::Entity)
                .filter(journals::Column::UserId.eq(ctx.user_id.clone()))
                .filter(transactions::Column::BudgetId.eq(id))
                .order_by_asc(journals::Column::Date)
                .one(&db_tx)
                .await?;
            if let Some((_, Some(journal))) = posting {
                oldest = oldest.min(journal.date);
            }
            Ok(oldest)
        })
    }

    /// Amount available for budgeting in `[start, end]`, zero when unset.
    pub async fn available_budget(
        &self,
        ctx: &UserContext,
        currency: Currency,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Decimal> {
        let model = available_budgets::Entity::find()
            .filter(available_budgets::Column::UserId.eq(ctx.user_id.clone()))
            .filter(available_budgets::Column::Currency.eq(currency.code()))
            .filter(available_budgets::Column::StartDate.eq(start))
            .filter(available_budgets::Column::EndDate.eq(end))
            .one(&self.database)
            .await?;
        match model {
            Some(model) => parse_amount(&model.amount),
            None => Ok(Decimal::ZERO),
        }
    }

    pub async fn set_available_budget(
        &self,
        ctx: &UserContext,
        currency: Currency,
        start: NaiveDate,
        end: NaiveDate,
        amount: Decimal,
    ) -> ResultEngine<()> {
        ensure_range(start, end)?;
        with_tx!(self, |db_tx| {
            let existing = available_budgets::Entity::find()
                .filter(available_budgets::Column::UserId.eq(ctx.user_id.clone()))
                .filter(available_budgets::Column::Currency.eq(currency.code()))
                .filter(available_budgets::Column::StartDate.eq(start))
                .filter(available_budgets::Column::EndDate.eq(end))
                .one(&db_tx)
                .await?;
            match existing {
                Some(model) => {
                    let mut active: available_budgets::ActiveModel = model.into();
                    active.amount = ActiveValue::Set(amount_to_storage(amount));
                    active.update(&db_tx).await?;
                }
                None => {
                    available_budgets::ActiveModel {
                        id: ActiveValue::Set(Uuid::new_v4().to_string()),
                        user_id: ActiveValue::Set(ctx.user_id.clone()),
                        currency: ActiveValue::Set(currency.code().to_string()),
                        start_date: ActiveValue::Set(start),
                        end_date: ActiveValue::Set(end),
                        amount: ActiveValue::Set(amount_to_storage(amount)),
                    }
                    .insert(&db_tx)
                    .await?;
                }
            }
            Ok(())
        })
    }

    /// Sum of withdrawals in `[start, end]` carrying any of `budgets`.
    ///
    /// An empty `accounts` selection means every asset account.
    pub async fn spent_in_period(
        &self,
        ctx: &UserContext,
        budgets: &[Uuid],
        accounts: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Decimal> {
        ensure_range(start, end)?;
        with_tx!(self, |db_tx| {
            self.require_budgets(&db_tx, ctx, budgets).await?;
            let accounts = if accounts.is_empty() {
                self.asset_account_ids(&db_tx, ctx).await?
            } else {
                self.require_accounts(&db_tx, ctx, accounts).await?;
                accounts.to_vec()
            };
            let collected = JournalQuery::new()
                .range(start, end)
                .types(&[JournalKind::Withdrawal])
                .budgets(budgets)
                .accounts(&accounts)
                .fetch(&db_tx, &ctx.user_id)
                .await?;
            checked_sum(collected.iter().map(|tx| tx.amount))
        })
    }

    /// Sum of negative withdrawal amounts in `[start, end]` without a budget.
    ///
    /// An empty `accounts` selection means every asset account.
    pub async fn spent_in_period_without_budget(
        &self,
        ctx: &UserContext,
        accounts: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Decimal> {
        ensure_range(start, end)?;
        with_tx!(self, |db_tx| {
            let accounts = if accounts.is_empty() {
                self.asset_account_ids(&db_tx, ctx).await?
            } else {
                self.require_accounts(&db_tx, ctx, accounts).await?;
                accounts.to_vec()
            };
            let collected = JournalQuery::new()
                .range(start, end)
                .types(&[JournalKind::Withdrawal])
                .without_budget()
                .accounts(&accounts)
                .sign(AmountSign::Negative)
                .fetch(&db_tx, &ctx.user_id)
                .await?;
            checked_sum(collected.iter().map(|tx| tx.amount))
        })
    }

    /// Postings in `[start, end]` whose effective budget is `budget_id`.
    pub async fn journals_for_budget(
        &self,
        ctx: &UserContext,
        budget_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<CollectedTransaction>> {
        ensure_range(start, end)?;
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, ctx, budget_id).await?;
            JournalQuery::new()
                .range(start, end)
                .budgets(&[budget_id])
                .fetch(&db_tx, &ctx.user_id)
                .await
        })
    }
}
