//! Period reports and chart data.
//!
//! Expenses are withdrawals and transfers with a negative amount on the
//! selected accounts; income is deposits and transfers with a positive amount.
//! A transfer between two selected accounts is neither.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AmountSign, BucketKey, ChartSeries, Granularity, JournalKind,
    JournalQuery, PeriodReport, PieSlice, ResultEngine, UserContext, accounts,
    aggregate::{
        cumulative, group_by_budget, group_by_opposing_account, group_by_tag,
        sum_by_tag_and_period,
    },
    budgets,
    chart::{retain_non_zero, sort_slices},
    util::{checked_sum, ensure_range, parse_uuid},
};

use super::{Engine, with_tx};

pub const NO_BUDGET_LABEL: &str = "No budget";
pub const OTHERS_LABEL: &str = "Everything else";
const UNKNOWN_ACCOUNT_LABEL: &str = "Unknown account";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieDirection {
    Expense,
    Income,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieGroupBy {
    Tag,
    Budget,
    Account,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieRequest {
    pub direction: PieDirection,
    pub group_by: PieGroupBy,
    pub accounts: Vec<Uuid>,
    pub tags: Vec<Uuid>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Add a slice for matching transactions that carry none of `tags`.
    pub others: bool,
}

fn direction_query(
    direction: PieDirection,
    accounts: &[Uuid],
    start: NaiveDate,
    end: NaiveDate,
) -> JournalQuery {
    let (kinds, sign) = match direction {
        PieDirection::Expense => (
            [JournalKind::Withdrawal, JournalKind::Transfer],
            AmountSign::Negative,
        ),
        PieDirection::Income => (
            [JournalKind::Deposit, JournalKind::Transfer],
            AmountSign::Positive,
        ),
    };
    JournalQuery::new()
        .accounts(accounts)
        .range(start, end)
        .types(&kinds)
        .sign(sign)
        .opposing_not_in(accounts)
}

impl Engine {
    /// Per-budget, per-period sums of every transaction on `accounts` whose
    /// effective budget is one of `budgets`.
    pub async fn budget_period_report(
        &self,
        ctx: &UserContext,
        budgets: &[Uuid],
        accounts: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<PeriodReport> {
        ensure_range(start, end)?;
        with_tx!(self, |db_tx| {
            self.budget_period_report_in(&db_tx, ctx, budgets, accounts, start, end)
                .await
        })
    }

    async fn budget_period_report_in(
        &self,
        db: &DatabaseTransaction,
        ctx: &UserContext,
        budgets: &[Uuid],
        accounts: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<PeriodReport> {
        let models = self.require_budgets(db, ctx, budgets).await?;
        self.require_accounts(db, ctx, accounts).await?;

        let mut buckets = Vec::with_capacity(models.len());
        for model in models {
            buckets.push((BucketKey::Budget(parse_uuid(&model.id, "budget")?), model.name));
        }
        let mut report = PeriodReport::new(Granularity::preferred(start, end), start, end, buckets);

        let collected = JournalQuery::new()
            .accounts(accounts)
            .range(start, end)
            .budgets(budgets)
            .fetch(db, &ctx.user_id)
            .await?;
        for tx in collected {
            if let Some(budget_id) = tx.budget_id {
                report.add(BucketKey::Budget(budget_id), tx.date, tx.amount)?;
            }
        }
        Ok(report)
    }

    /// Per-period sums of withdrawals on `accounts` without any budget.
    pub async fn no_budget_period_report(
        &self,
        ctx: &UserContext,
        accounts: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<PeriodReport> {
        ensure_range(start, end)?;
        with_tx!(self, |db_tx| {
            self.no_budget_period_report_in(&db_tx, ctx, accounts, start, end)
                .await
        })
    }

    async fn no_budget_period_report_in(
        &self,
        db: &DatabaseTransaction,
        ctx: &UserContext,
        accounts: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<PeriodReport> {
        self.require_accounts(db, ctx, accounts).await?;
        let mut report = PeriodReport::new(
            Granularity::preferred(start, end),
            start,
            end,
            [(BucketKey::NoBudget, NO_BUDGET_LABEL.to_string())],
        );
        let collected = JournalQuery::new()
            .accounts(accounts)
            .range(start, end)
            .types(&[JournalKind::Withdrawal])
            .without_budget()
            .fetch(db, &ctx.user_id)
            .await?;
        for tx in collected {
            report.add(BucketKey::NoBudget, tx.date, tx.amount)?;
        }
        Ok(report)
    }

    /// Per-tag, per-period sums of every transaction on `accounts` carrying
    /// one of `tags`. A transaction with several selected tags counts in full
    /// for each.
    pub async fn tag_period_report(
        &self,
        ctx: &UserContext,
        tags: &[Uuid],
        accounts: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<PeriodReport> {
        ensure_range(start, end)?;
        let db_tx = self.database.begin().await?;
        let models = self.require_tags(&db_tx, ctx, tags).await?;
        self.require_accounts(&db_tx, ctx, accounts).await?;

        let mut buckets = Vec::with_capacity(models.len());
        for model in models {
            buckets.push((BucketKey::Tag(parse_uuid(&model.id, "tag")?), model.tag));
        }
        let mut report = PeriodReport::new(Granularity::preferred(start, end), start, end, buckets);

        let collected = JournalQuery::new()
            .accounts(accounts)
            .range(start, end)
            .tags(tags)
            .fetch(&db_tx, &ctx.user_id)
            .await?;
        db_tx.commit().await?;
        for tx in collected {
            for tag in &tx.tag_ids {
                report.add(BucketKey::Tag(*tag), tx.date, tx.amount)?;
            }
        }
        Ok(report)
    }

    /// Income, expenses and their running totals per tag and sub-period.
    ///
    /// Series that sum to zero are dropped unless all of them do.
    pub async fn tag_main_chart(
        &self,
        ctx: &UserContext,
        tags: &[Uuid],
        accounts: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<ChartSeries>> {
        ensure_range(start, end)?;
        let db_tx = self.database.begin().await?;
        let models = self.require_tags(&db_tx, ctx, tags).await?;
        self.require_accounts(&db_tx, ctx, accounts).await?;
        let expenses = direction_query(PieDirection::Expense, accounts, start, end)
            .tags(tags)
            .fetch(&db_tx, &ctx.user_id)
            .await?;
        let income = direction_query(PieDirection::Income, accounts, start, end)
            .tags(tags)
            .fetch(&db_tx, &ctx.user_id)
            .await?;
        db_tx.commit().await?;

        let granularity = Granularity::preferred(start, end);
        let periods = granularity.sub_periods(start, end);
        let expenses = sum_by_tag_and_period(granularity, &periods, tags, &expenses)?;
        let income = sum_by_tag_and_period(granularity, &periods, tags, &income)?;

        let mut series = Vec::with_capacity(models.len() * 4);
        for model in models {
            let tag_id = parse_uuid(&model.id, "tag")?;
            let tag_in = income.get(&tag_id).cloned().unwrap_or_default();
            let tag_out = expenses.get(&tag_id).cloned().unwrap_or_default();
            let name = model.tag;
            series.push(
                ChartSeries::bar(format!("{tag_id}-in"), format!("{name} (income)"))
                    .with_entries(tag_in.clone()),
            );
            series.push(
                ChartSeries::bar(format!("{tag_id}-out"), format!("{name} (expenses)"))
                    .with_entries(tag_out.clone()),
            );
            series.push(
                ChartSeries::line(
                    format!("{tag_id}-total-in"),
                    format!("{name} (sum of income)"),
                )
                .with_entries(cumulative(&tag_in)?),
            );
            series.push(
                ChartSeries::line(
                    format!("{tag_id}-total-out"),
                    format!("{name} (sum of expenses)"),
                )
                .with_entries(cumulative(&tag_out)?),
            );
        }
        retain_non_zero(series)
    }

    /// One bar series per budget plus one for spending without a budget.
    pub async fn budget_period_chart(
        &self,
        ctx: &UserContext,
        budgets: &[Uuid],
        accounts: &[Uuid],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ResultEngine<Vec<ChartSeries>> {
        ensure_range(start, end)?;
        let db_tx = self.database.begin().await?;
        let budget_report = self
            .budget_period_report_in(&db_tx, ctx, budgets, accounts, start, end)
            .await?;
        let no_budget = self
            .no_budget_period_report_in(&db_tx, ctx, accounts, start, end)
            .await?;
        db_tx.commit().await?;

        let mut series = Vec::with_capacity(budgets.len() + 1);
        for budget_id in budgets {
            let key = BucketKey::Budget(*budget_id);
            if series.iter().any(|s: &ChartSeries| s.key == key.as_key()) {
                continue;
            }
            if let Some(bucket) = budget_report.get(&key) {
                series.push(
                    ChartSeries::bar(key.as_key(), bucket.name.clone())
                        .with_entries(bucket.entries.clone()),
                );
            }
        }
        if let Some(bucket) = no_budget.get(&BucketKey::NoBudget) {
            series.push(
                ChartSeries::bar(BucketKey::NoBudget.as_key(), bucket.name.clone())
                    .with_entries(bucket.entries.clone()),
            );
        }
        retain_non_zero(series)
    }

    /// Expense or income of tagged transactions, grouped by tag, budget or
    /// opposing account. Slice amounts are absolute values, largest first.
    pub async fn tag_pie(&self, ctx: &UserContext, req: PieRequest) -> ResultEngine<Vec<PieSlice>> {
        ensure_range(req.start, req.end)?;
        let db_tx = self.database.begin().await?;
        let tag_models = self.require_tags(&db_tx, ctx, &req.tags).await?;
        self.require_accounts(&db_tx, ctx, &req.accounts).await?;

        let tagged = direction_query(req.direction, &req.accounts, req.start, req.end)
            .tags(&req.tags)
            .fetch(&db_tx, &ctx.user_id)
            .await?;
        let others = if req.others {
            let all = direction_query(req.direction, &req.accounts, req.start, req.end)
                .fetch(&db_tx, &ctx.user_id)
                .await?;
            let rest = checked_sum(
                all.iter()
                    .filter(|tx| !tx.tag_ids.iter().any(|tag| req.tags.contains(tag)))
                    .map(|tx| tx.amount),
            )?;
            Some(rest)
        } else {
            None
        };

        let mut slices = match req.group_by {
            PieGroupBy::Tag => {
                let grouped = group_by_tag(&tagged)?;
                let mut slices = Vec::with_capacity(tag_models.len());
                for model in tag_models {
                    let tag_id = parse_uuid(&model.id, "tag")?;
                    if let Some(amount) = grouped.get(&tag_id) {
                        slices.push(PieSlice {
                            label: model.tag,
                            amount: amount.abs(),
                        });
                    }
                }
                slices
            }
            PieGroupBy::Budget => {
                let names = self.budget_names(&db_tx, ctx).await?;
                group_by_budget(&tagged)?
                    .into_iter()
                    .map(|(budget_id, amount)| PieSlice {
                        label: budget_id
                            .and_then(|id| names.get(&id).cloned())
                            .unwrap_or_else(|| NO_BUDGET_LABEL.to_string()),
                        amount: amount.abs(),
                    })
                    .collect()
            }
            PieGroupBy::Account => {
                let names = self.account_names(&db_tx, ctx).await?;
                group_by_opposing_account(&tagged)?
                    .into_iter()
                    .map(|(account_id, amount)| PieSlice {
                        label: account_id
                            .and_then(|id| names.get(&id).cloned())
                            .unwrap_or_else(|| UNKNOWN_ACCOUNT_LABEL.to_string()),
                        amount: amount.abs(),
                    })
                    .collect()
            }
        };
        db_tx.commit().await?;

        slices.retain(|slice| !slice.amount.is_zero());
        sort_slices(&mut slices);
        if let Some(rest) = others.filter(|rest| !rest.is_zero()) {
            slices.push(PieSlice {
                label: OTHERS_LABEL.to_string(),
                amount: rest.abs(),
            });
        }
        Ok(slices)
    }

    async fn budget_names(
        &self,
        db: &DatabaseTransaction,
        ctx: &UserContext,
    ) -> ResultEngine<HashMap<Uuid, String>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(ctx.user_id.clone()))
            .all(db)
            .await?;
        models
            .into_iter()
            .map(|m| Ok((parse_uuid(&m.id, "budget")?, m.name)))
            .collect()
    }

    async fn account_names(
        &self,
        db: &DatabaseTransaction,
        ctx: &UserContext,
    ) -> ResultEngine<HashMap<Uuid, String>> {
        let models = accounts::Entity::find()
            .filter(accounts::Column::UserId.eq(ctx.user_id.clone()))
            .all(db)
            .await?;
        models
            .into_iter()
            .map(|m| Ok((parse_uuid(&m.id, "account")?, m.name)))
            .collect()
    }
}
