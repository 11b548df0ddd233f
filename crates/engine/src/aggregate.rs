//! Period aggregation.
//!
//! Turns collected transactions into per-bucket, per-sub-period decimal sums.
//! Nothing here touches the database.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CollectedTransaction, Granularity, ResultEngine, SubPeriod,
    util::checked_add,
};

/// What a report bucket groups by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum BucketKey {
    Budget(Uuid),
    Tag(Uuid),
    NoBudget,
}

impl BucketKey {
    /// Stable textual key, used for chart series ids.
    pub fn as_key(&self) -> String {
        match self {
            Self::Budget(id) => format!("budget-{id}"),
            Self::Tag(id) => format!("tag-{id}"),
            Self::NoBudget => "no-budget".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketReport {
    pub name: String,
    /// Total over the whole range.
    pub sum: Decimal,
    /// Period label to sum. Holds every sub-period of the range.
    pub entries: BTreeMap<String, Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub granularity: Granularity,
    pub buckets: BTreeMap<BucketKey, BucketReport>,
}

impl PeriodReport {
    /// Prepares zero-filled buckets for `[start, end]` split at `granularity`.
    pub fn new(
        granularity: Granularity,
        start: NaiveDate,
        end: NaiveDate,
        buckets: impl IntoIterator<Item = (BucketKey, String)>,
    ) -> Self {
        let entries = zero_entries(&granularity.sub_periods(start, end));
        let buckets = buckets
            .into_iter()
            .map(|(key, name)| {
                (
                    key,
                    BucketReport {
                        name,
                        sum: Decimal::ZERO,
                        entries: entries.clone(),
                    },
                )
            })
            .collect();
        Self {
            granularity,
            buckets,
        }
    }

    /// Adds `amount` on `date` to the bucket `key`.
    ///
    /// Amounts for unknown buckets or dates outside the prepared range are
    /// ignored. Fails with `InvalidAmount` when a sum leaves the decimal
    /// range, leaving the bucket untouched.
    pub fn add(&mut self, key: BucketKey, date: NaiveDate, amount: Decimal) -> ResultEngine<()> {
        let label = self.granularity.label(date);
        let Some(bucket) = self.buckets.get_mut(&key) else {
            return Ok(());
        };
        if let Some(entry) = bucket.entries.get_mut(&label) {
            let period = checked_add(*entry, amount)?;
            let sum = checked_add(bucket.sum, amount)?;
            *entry = period;
            bucket.sum = sum;
        }
        Ok(())
    }

    pub fn get(&self, key: &BucketKey) -> Option<&BucketReport> {
        self.buckets.get(key)
    }
}

/// Every sub-period label mapped to zero.
pub fn zero_entries(periods: &[SubPeriod]) -> BTreeMap<String, Decimal> {
    periods
        .iter()
        .map(|period| (period.label.clone(), Decimal::ZERO))
        .collect()
}

/// Sums amounts per tag. A transaction carrying several tags counts in full
/// for each of them.
pub fn group_by_tag(transactions: &[CollectedTransaction]) -> ResultEngine<HashMap<Uuid, Decimal>> {
    let mut grouped: HashMap<Uuid, Decimal> = HashMap::new();
    for tx in transactions {
        for tag in &tx.tag_ids {
            let sum = grouped.entry(*tag).or_default();
            *sum = checked_add(*sum, tx.amount)?;
        }
    }
    Ok(grouped)
}

fn group_by<K, F>(transactions: &[CollectedTransaction], key: F) -> ResultEngine<HashMap<K, Decimal>>
where
    K: Eq + std::hash::Hash,
    F: Fn(&CollectedTransaction) -> K,
{
    let mut grouped: HashMap<K, Decimal> = HashMap::new();
    for tx in transactions {
        let sum = grouped.entry(key(tx)).or_default();
        *sum = checked_add(*sum, tx.amount)?;
    }
    Ok(grouped)
}

/// Sums amounts per effective budget, `None` collecting those without one.
pub fn group_by_budget(
    transactions: &[CollectedTransaction],
) -> ResultEngine<HashMap<Option<Uuid>, Decimal>> {
    group_by(transactions, |tx| tx.budget_id)
}

/// Sums amounts per opposing account, `None` collecting those without one.
pub fn group_by_opposing_account(
    transactions: &[CollectedTransaction],
) -> ResultEngine<HashMap<Option<Uuid>, Decimal>> {
    group_by(transactions, |tx| tx.opposing_account_id)
}

/// Per-tag, per-period sums over `periods`, zero-filled for each tag in `tags`.
pub fn sum_by_tag_and_period(
    granularity: Granularity,
    periods: &[SubPeriod],
    tags: &[Uuid],
    transactions: &[CollectedTransaction],
) -> ResultEngine<HashMap<Uuid, BTreeMap<String, Decimal>>> {
    let zero = zero_entries(periods);
    let mut out: HashMap<Uuid, BTreeMap<String, Decimal>> =
        tags.iter().map(|tag| (*tag, zero.clone())).collect();
    for tx in transactions {
        let label = granularity.label(tx.date);
        for tag in &tx.tag_ids {
            if let Some(entry) = out.get_mut(tag).and_then(|entries| entries.get_mut(&label)) {
                *entry = checked_add(*entry, tx.amount)?;
            }
        }
    }
    Ok(out)
}

/// Running total of `entries` in label order.
pub fn cumulative(entries: &BTreeMap<String, Decimal>) -> ResultEngine<BTreeMap<String, Decimal>> {
    let mut running = Decimal::ZERO;
    let mut totals = BTreeMap::new();
    for (label, amount) in entries {
        running = checked_add(running, *amount)?;
        totals.insert(label.clone(), running);
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EngineError, JournalKind};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn tx(date: NaiveDate, amount: i64, tags: &[Uuid], budget: Option<Uuid>) -> CollectedTransaction {
        CollectedTransaction {
            transaction_id: Uuid::new_v4(),
            journal_id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            amount: Decimal::new(amount, 2),
            date,
            kind: JournalKind::Withdrawal,
            budget_id: budget,
            tag_ids: tags.to_vec(),
            opposing_account_id: None,
        }
    }

    #[test]
    fn tag_grouping_fans_out() {
        let (food, travel) = (Uuid::new_v4(), Uuid::new_v4());
        let txs = vec![
            tx(d(2017, 1, 3), -1050, &[food, travel], None),
            tx(d(2017, 1, 4), -250, &[food], None),
            tx(d(2017, 1, 5), -999, &[], None),
        ];
        let grouped = group_by_tag(&txs).unwrap();
        assert_eq!(grouped[&food], Decimal::new(-1300, 2));
        assert_eq!(grouped[&travel], Decimal::new(-1050, 2));
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn report_entries_are_zero_filled_and_sum_to_total() {
        let budget = Uuid::new_v4();
        let key = BucketKey::Budget(budget);
        let mut report = PeriodReport::new(
            Granularity::Month,
            d(2017, 1, 1),
            d(2017, 4, 30),
            [(key, "Groceries".to_string())],
        );
        report.add(key, d(2017, 1, 10), Decimal::new(-1001, 2)).unwrap();
        report.add(key, d(2017, 3, 31), Decimal::new(-2, 2)).unwrap();
        report.add(key, d(2017, 3, 1), Decimal::new(-1, 1)).unwrap();
        report.add(BucketKey::NoBudget, d(2017, 3, 1), Decimal::new(-500, 0)).unwrap();

        let bucket = report.get(&key).unwrap();
        assert_eq!(bucket.entries.len(), 4);
        assert_eq!(bucket.entries["2017-02"], Decimal::ZERO);
        assert_eq!(bucket.entries["2017-03"], Decimal::new(-12, 2));
        assert_eq!(bucket.sum, Decimal::new(-1013, 2));
        let per_period: Decimal = bucket.entries.values().copied().sum();
        assert_eq!(per_period, bucket.sum);
    }

    #[test]
    fn tag_period_sums_ignore_unselected_tags() {
        let (food, other) = (Uuid::new_v4(), Uuid::new_v4());
        let periods = Granularity::Day.sub_periods(d(2017, 1, 1), d(2017, 1, 3));
        let txs = vec![
            tx(d(2017, 1, 2), 100, &[food, other], None),
            tx(d(2017, 1, 2), 50, &[food], None),
        ];
        let sums = sum_by_tag_and_period(Granularity::Day, &periods, &[food], &txs).unwrap();
        assert_eq!(sums.len(), 1);
        assert_eq!(sums[&food]["2017-01-02"], Decimal::new(150, 2));
        assert_eq!(sums[&food]["2017-01-01"], Decimal::ZERO);
    }

    #[test]
    fn cumulative_runs_in_label_order() {
        let entries: BTreeMap<String, Decimal> = [
            ("2017-02".to_string(), Decimal::new(5, 0)),
            ("2017-01".to_string(), Decimal::new(1, 0)),
            ("2017-03".to_string(), Decimal::new(-2, 0)),
        ]
        .into_iter()
        .collect();
        let totals: Vec<_> = cumulative(&entries).unwrap().into_values().collect();
        assert_eq!(
            totals,
            [Decimal::new(1, 0), Decimal::new(6, 0), Decimal::new(4, 0)]
        );
    }

    #[test]
    fn overflowing_sums_are_rejected() {
        let budget = Uuid::new_v4();
        let key = BucketKey::Budget(budget);
        let mut report = PeriodReport::new(
            Granularity::Month,
            d(2017, 1, 1),
            d(2017, 1, 31),
            [(key, "Big".to_string())],
        );
        report.add(key, d(2017, 1, 2), Decimal::MAX).unwrap();
        let err = report.add(key, d(2017, 1, 3), Decimal::MAX).unwrap_err();
        assert_eq!(err, EngineError::InvalidAmount("amount too large".to_string()));
        assert_eq!(report.get(&key).unwrap().sum, Decimal::MAX);

        let mut big = tx(d(2017, 1, 2), 0, &[budget], Some(budget));
        big.amount = Decimal::MAX;
        let txs = vec![big.clone(), big];
        assert!(group_by_tag(&txs).is_err());
        assert!(group_by_budget(&txs).is_err());
        assert!(group_by_opposing_account(&txs).is_err());
    }

    #[test]
    fn budget_grouping_keeps_unbudgeted_apart() {
        let budget = Uuid::new_v4();
        let txs = vec![
            tx(d(2017, 1, 1), -100, &[], Some(budget)),
            tx(d(2017, 1, 1), -300, &[], None),
        ];
        let grouped = group_by_budget(&txs).unwrap();
        assert_eq!(grouped[&Some(budget)], Decimal::new(-100, 2));
        assert_eq!(grouped[&None], Decimal::new(-300, 2));
    }
}
