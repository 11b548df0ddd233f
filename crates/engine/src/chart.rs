//! Chart-ready series and pie slices.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ResultEngine, util::checked_sum};

pub const PRIMARY_AXIS: &str = "y-axis-0";
pub const SECONDARY_AXIS: &str = "y-axis-1";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub key: String,
    pub label: String,
    pub kind: SeriesKind,
    pub y_axis: Option<String>,
    pub fill: Option<bool>,
    pub entries: BTreeMap<String, Decimal>,
}

impl ChartSeries {
    pub fn bar(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: SeriesKind::Bar,
            y_axis: Some(PRIMARY_AXIS.to_string()),
            fill: None,
            entries: BTreeMap::new(),
        }
    }

    /// Unfilled line on the secondary axis.
    pub fn line(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: SeriesKind::Line,
            y_axis: Some(SECONDARY_AXIS.to_string()),
            fill: Some(false),
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entries(mut self, entries: BTreeMap<String, Decimal>) -> Self {
        self.entries = entries;
        self
    }

    pub fn total(&self) -> ResultEngine<Decimal> {
        checked_sum(self.entries.values().copied())
    }
}

/// Drops series whose entries sum to zero.
///
/// If every series sums to zero, all of them are kept.
pub fn retain_non_zero(series: Vec<ChartSeries>) -> ResultEngine<Vec<ChartSeries>> {
    let mut non_zero = Vec::with_capacity(series.len());
    for s in &series {
        non_zero.push(!s.total()?.is_zero());
    }
    if !non_zero.contains(&true) {
        return Ok(series);
    }
    Ok(series
        .into_iter()
        .zip(non_zero)
        .filter_map(|(s, keep)| keep.then_some(s))
        .collect())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub amount: Decimal,
}

/// Orders slices by descending amount, then by label.
pub fn sort_slices(slices: &mut [PieSlice]) {
    slices.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.label.cmp(&b.label)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(key: &str, values: &[i64]) -> ChartSeries {
        let entries = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("2017-0{}", i + 1), Decimal::new(*v, 2)))
            .collect();
        ChartSeries::bar(key, key).with_entries(entries)
    }

    #[test]
    fn zero_series_are_dropped() {
        let kept = retain_non_zero(vec![
            series("a", &[0, 0]),
            series("b", &[100, -50]),
            series("c", &[100, -100]),
        ])
        .unwrap();
        let keys: Vec<_> = kept.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["b"]);
    }

    #[test]
    fn all_zero_series_are_kept() {
        let kept = retain_non_zero(vec![series("a", &[0]), series("b", &[0, 0])]).unwrap();
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn line_series_are_unfilled_on_secondary_axis() {
        let line = ChartSeries::line("t", "t");
        assert_eq!(line.fill, Some(false));
        assert_eq!(line.y_axis.as_deref(), Some(SECONDARY_AXIS));
        assert_eq!(ChartSeries::bar("t", "t").y_axis.as_deref(), Some(PRIMARY_AXIS));
    }

    #[test]
    fn slices_sort_by_amount() {
        let mut slices = vec![
            PieSlice { label: "b".into(), amount: Decimal::new(1, 0) },
            PieSlice { label: "a".into(), amount: Decimal::new(5, 0) },
            PieSlice { label: "c".into(), amount: Decimal::new(1, 0) },
        ];
        sort_slices(&mut slices);
        let labels: Vec<_> = slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["a", "b", "c"]);
    }
}
