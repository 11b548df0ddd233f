//! JSON request and response bodies of the HTTP API.
//!
//! Amounts travel as decimal strings (`"12.50"`), dates as `YYYY-MM-DD`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatFrequency {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "quarterly")]
    Quarterly,
    #[serde(rename = "half-year")]
    HalfYear,
    #[serde(rename = "yearly")]
    Yearly,
}

pub mod chart {
    use std::collections::BTreeMap;

    use super::*;

    /// Selection shared by the tag charts and reports.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagChartRequest {
        pub accounts: Vec<Uuid>,
        pub tags: Vec<Uuid>,
        pub start: NaiveDate,
        pub end: NaiveDate,
    }

    /// Selection shared by the budget charts and reports.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetChartRequest {
        pub accounts: Vec<Uuid>,
        #[serde(default)]
        pub budgets: Vec<Uuid>,
        pub start: NaiveDate,
        pub end: NaiveDate,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SeriesKind {
        Bar,
        Line,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartSeries {
        pub key: String,
        pub label: String,
        #[serde(rename = "type")]
        pub kind: SeriesKind,
        #[serde(rename = "yAxisID", skip_serializing_if = "Option::is_none", default)]
        pub y_axis: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub fill: Option<bool>,
        /// Period label to amount, in chronological order.
        pub entries: BTreeMap<String, Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ChartResponse {
        pub series: Vec<ChartSeries>,
    }

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

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PieRequest {
        pub direction: PieDirection,
        pub group_by: PieGroupBy,
        pub accounts: Vec<Uuid>,
        pub tags: Vec<Uuid>,
        pub start: NaiveDate,
        pub end: NaiveDate,
        /// Adds an "Everything else" slice for untagged spending.
        #[serde(default)]
        pub others: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PieSlice {
        pub label: String,
        pub amount: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PieResponse {
        pub slices: Vec<PieSlice>,
    }
}

pub mod report {
    use std::collections::BTreeMap;

    use super::*;

    /// What a bucket groups by. `id` is absent for the no-budget bucket.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BucketView {
        pub kind: String,
        pub id: Option<Uuid>,
        pub name: String,
        pub sum: Decimal,
        pub entries: BTreeMap<String, Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PeriodReportResponse {
        pub buckets: Vec<BucketView>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InitialLimit {
        pub amount: Decimal,
        pub period: RepeatFrequency,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub name: String,
        pub initial_limit: Option<InitialLimit>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub name: String,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Budget {
        pub id: Uuid,
        pub name: String,
        pub active: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetList {
        pub budgets: Vec<Budget>,
    }

    /// `active` filters the list; absent means every budget.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetListQuery {
        pub active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpentRequest {
        #[serde(default)]
        pub budgets: Vec<Uuid>,
        /// Empty means every asset account.
        #[serde(default)]
        pub accounts: Vec<Uuid>,
        pub start: NaiveDate,
        pub end: NaiveDate,
        /// Sum spending without any budget instead of `budgets`.
        #[serde(default)]
        pub without_budget: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpentResponse {
        pub amount: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AvailableBudgetSet {
        #[serde(default)]
        pub currency: Currency,
        pub start: NaiveDate,
        pub end: NaiveDate,
        pub amount: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AvailableBudgetGet {
        #[serde(default)]
        pub currency: Currency,
        pub start: NaiveDate,
        pub end: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AvailableBudget {
        pub currency: Currency,
        pub start: NaiveDate,
        pub end: NaiveDate,
        pub amount: Decimal,
    }
}

pub mod limit {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LimitSet {
        pub start: NaiveDate,
        pub end: NaiveDate,
        /// Zero or negative removes the limit for the period.
        pub amount: Decimal,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RepeatingLimitNew {
        /// Any date inside the period.
        pub start: NaiveDate,
        pub period: RepeatFrequency,
        pub amount: Decimal,
        #[serde(default)]
        pub repeats: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetLimit {
        pub id: Uuid,
        pub budget_id: Uuid,
        pub start_date: NaiveDate,
        pub end_date: NaiveDate,
        pub amount: Decimal,
        pub repeat_freq: Option<RepeatFrequency>,
        pub repeats: bool,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum LimitOutcome {
        Deleted,
        Updated,
        Created,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LimitSetResponse {
        pub outcome: LimitOutcome,
        pub limit: Option<BudgetLimit>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LimitRange {
        pub start: NaiveDate,
        pub end: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LimitList {
        pub limits: Vec<BudgetLimit>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CleanupResponse {
        pub removed: u64,
    }
}

pub mod account {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AccountKind {
        Asset,
        Expense,
        Revenue,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        pub kind: AccountKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Account {
        pub id: Uuid,
        pub name: String,
        pub kind: AccountKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountList {
        pub accounts: Vec<Account>,
    }
}

pub mod tag {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagNew {
        pub tag: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Tag {
        pub id: Uuid,
        pub tag: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TagList {
        pub tags: Vec<Tag>,
    }
}

pub mod journal {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum JournalKind {
        Withdrawal,
        Deposit,
        Transfer,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PostingNew {
        pub account_id: Uuid,
        /// Signed. The postings of a journal sum to zero.
        pub amount: Decimal,
        pub budget_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct JournalNew {
        pub kind: JournalKind,
        pub date: NaiveDate,
        pub description: Option<String>,
        pub budget_id: Option<Uuid>,
        #[serde(default)]
        pub tag_ids: Vec<Uuid>,
        pub postings: Vec<PostingNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct JournalCreated {
        pub id: Uuid,
    }
}
