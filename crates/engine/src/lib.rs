//! Budgetry engine.
//!
//! Owns the data model (sea-orm entities), the per-user repositories for
//! budgets, limits, tags and journals, and the report pipeline:
//! [`JournalQuery`] collects transactions, [`aggregate`] sums them per period
//! and bucket, [`chart`] shapes the result into series.
//!
//! Every operation takes an explicit [`UserContext`] and only ever sees rows
//! owned by that user.

pub use accounts::{Account, AccountKind};
pub use aggregate::{BucketKey, BucketReport, PeriodReport};
pub use budget_limits::BudgetLimit;
pub use budgets::Budget;
pub use chart::{ChartSeries, PieSlice, SeriesKind, retain_non_zero};
pub use collector::{AmountSign, CollectedTransaction, JournalFilter, JournalQuery};
pub use currency::Currency;
pub use error::EngineError;
pub use journals::JournalKind;
pub use ops::{
    BudgetStore, BudgetUpdate, Engine, EngineBuilder, InitialLimit, JournalStore, LimitStore,
    LimitUpdate, PieDirection, PieGroupBy, PieRequest, PostingStore,
};
pub use period::{Granularity, RepeatFrequency, SubPeriod};
pub use tags::Tag;

pub mod accounts;
pub mod aggregate;
pub mod available_budgets;
pub mod budget_limits;
pub mod budgets;
pub mod chart;
mod collector;
mod currency;
mod error;
pub mod journal_tags;
pub mod journals;
mod ops;
mod period;
pub mod tags;
pub mod transactions;
pub mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;

/// The user every engine operation runs on behalf of.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserContext {
    pub user_id: String,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}
