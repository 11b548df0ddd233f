//! Mapping between engine values and wire types.

use api_types::{
    account, budget, chart,
    journal::JournalKind,
    limit::{self, LimitOutcome},
    report::{BucketView, PeriodReportResponse},
    tag,
};
use engine::{BucketKey, LimitUpdate};

pub(crate) fn frequency_in(value: api_types::RepeatFrequency) -> engine::RepeatFrequency {
    use api_types::RepeatFrequency as Wire;
    match value {
        Wire::Daily => engine::RepeatFrequency::Daily,
        Wire::Weekly => engine::RepeatFrequency::Weekly,
        Wire::Monthly => engine::RepeatFrequency::Monthly,
        Wire::Quarterly => engine::RepeatFrequency::Quarterly,
        Wire::HalfYear => engine::RepeatFrequency::HalfYear,
        Wire::Yearly => engine::RepeatFrequency::Yearly,
    }
}

fn frequency_out(value: engine::RepeatFrequency) -> api_types::RepeatFrequency {
    use api_types::RepeatFrequency as Wire;
    match value {
        engine::RepeatFrequency::Daily => Wire::Daily,
        engine::RepeatFrequency::Weekly => Wire::Weekly,
        engine::RepeatFrequency::Monthly => Wire::Monthly,
        engine::RepeatFrequency::Quarterly => Wire::Quarterly,
        engine::RepeatFrequency::HalfYear => Wire::HalfYear,
        engine::RepeatFrequency::Yearly => Wire::Yearly,
    }
}

pub(crate) fn currency_in(value: api_types::Currency) -> engine::Currency {
    match value {
        api_types::Currency::Eur => engine::Currency::Eur,
        api_types::Currency::Usd => engine::Currency::Usd,
        api_types::Currency::Gbp => engine::Currency::Gbp,
    }
}

pub(crate) fn account_kind_in(value: account::AccountKind) -> engine::AccountKind {
    match value {
        account::AccountKind::Asset => engine::AccountKind::Asset,
        account::AccountKind::Expense => engine::AccountKind::Expense,
        account::AccountKind::Revenue => engine::AccountKind::Revenue,
    }
}

pub(crate) fn account_out(value: engine::Account) -> account::Account {
    let kind = match value.kind {
        engine::AccountKind::Asset => account::AccountKind::Asset,
        engine::AccountKind::Expense => account::AccountKind::Expense,
        engine::AccountKind::Revenue => account::AccountKind::Revenue,
    };
    account::Account {
        id: value.id,
        name: value.name,
        kind,
    }
}

pub(crate) fn journal_kind_in(value: JournalKind) -> engine::JournalKind {
    match value {
        JournalKind::Withdrawal => engine::JournalKind::Withdrawal,
        JournalKind::Deposit => engine::JournalKind::Deposit,
        JournalKind::Transfer => engine::JournalKind::Transfer,
    }
}

pub(crate) fn tag_out(value: engine::Tag) -> tag::Tag {
    tag::Tag {
        id: value.id,
        tag: value.tag,
    }
}

pub(crate) fn budget_out(value: engine::Budget) -> budget::Budget {
    budget::Budget {
        id: value.id,
        name: value.name,
        active: value.active,
    }
}

pub(crate) fn limit_out(value: engine::BudgetLimit) -> limit::BudgetLimit {
    limit::BudgetLimit {
        id: value.id,
        budget_id: value.budget_id,
        start_date: value.start_date,
        end_date: value.end_date,
        amount: value.amount,
        repeat_freq: value.repeat_freq.map(frequency_out),
        repeats: value.repeats,
    }
}

pub(crate) fn limit_update_out(value: LimitUpdate) -> limit::LimitSetResponse {
    let (outcome, limit) = match value {
        LimitUpdate::Deleted => (LimitOutcome::Deleted, None),
        LimitUpdate::Updated(limit) => (LimitOutcome::Updated, Some(limit)),
        LimitUpdate::Created(limit) => (LimitOutcome::Created, Some(limit)),
    };
    limit::LimitSetResponse {
        outcome,
        limit: limit.map(limit_out),
    }
}

pub(crate) fn series_out(value: engine::ChartSeries) -> chart::ChartSeries {
    let kind = match value.kind {
        engine::SeriesKind::Bar => chart::SeriesKind::Bar,
        engine::SeriesKind::Line => chart::SeriesKind::Line,
    };
    chart::ChartSeries {
        key: value.key,
        label: value.label,
        kind,
        y_axis: value.y_axis,
        fill: value.fill,
        entries: value.entries,
    }
}

pub(crate) fn pie_in(value: &chart::PieRequest) -> engine::PieRequest {
    engine::PieRequest {
        direction: match value.direction {
            chart::PieDirection::Expense => engine::PieDirection::Expense,
            chart::PieDirection::Income => engine::PieDirection::Income,
        },
        group_by: match value.group_by {
            chart::PieGroupBy::Tag => engine::PieGroupBy::Tag,
            chart::PieGroupBy::Budget => engine::PieGroupBy::Budget,
            chart::PieGroupBy::Account => engine::PieGroupBy::Account,
        },
        accounts: value.accounts.clone(),
        tags: value.tags.clone(),
        start: value.start,
        end: value.end,
        others: value.others,
    }
}

pub(crate) fn slice_out(value: engine::PieSlice) -> chart::PieSlice {
    chart::PieSlice {
        label: value.label,
        amount: value.amount,
    }
}

pub(crate) fn report_out(value: engine::PeriodReport) -> PeriodReportResponse {
    let buckets = value
        .buckets
        .into_iter()
        .map(|(key, bucket)| {
            let (kind, id) = match key {
                BucketKey::Budget(id) => ("budget", Some(id)),
                BucketKey::Tag(id) => ("tag", Some(id)),
                BucketKey::NoBudget => ("no_budget", None),
            };
            BucketView {
                kind: kind.to_string(),
                id,
                name: bucket.name,
                sum: bucket.sum,
                entries: bucket.entries,
            }
        })
        .collect();
    PeriodReportResponse { buckets }
}
