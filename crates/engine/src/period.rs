//! Calendar periods.
//!
//! Two related notions live here:
//!
//! - [`RepeatFrequency`]: the human period label a budget limit repeats on
//!   (`daily`, `weekly`, `monthly`, `quarterly`, `half-year`, `yearly`). Used to
//!   snap an arbitrary date to the start of its period.
//! - [`Granularity`]: the sub-period used to split a report range into chart
//!   entries. Chosen from the length of the range by [`Granularity::preferred`].
//!
//! Weeks start on Monday.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// How often a budget limit repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

impl RepeatFrequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::HalfYear => "half-year",
            Self::Yearly => "yearly",
        }
    }

    /// Snaps `date` to the first day of the period containing it.
    ///
    /// Half years start on 1 January (months 1-6) or 1 July (months 7-12).
    /// The month is inspected before snapping. Fails only for a week starting
    /// before the first representable date.
    pub fn start_of(self, date: NaiveDate) -> ResultEngine<NaiveDate> {
        let start = match self {
            Self::Daily => date,
            Self::Weekly => week_start(date).ok_or_else(|| self.out_of_range(date))?,
            Self::Monthly => month_start(date),
            Self::Quarterly => month_start(date) - Months::new(date.month0() % 3),
            Self::HalfYear => {
                let second_half = date.month() >= 7;
                let start = year_start(date);
                if second_half {
                    start + Months::new(6)
                } else {
                    start
                }
            }
            Self::Yearly => year_start(date),
        };
        Ok(start)
    }

    /// Last day (inclusive) of the period containing `date`.
    pub fn end_of(self, date: NaiveDate) -> ResultEngine<NaiveDate> {
        let start = self.start_of(date)?;
        let end = match self {
            Self::Daily => Some(start),
            Self::Weekly => start.checked_add_days(Days::new(6)),
            Self::Monthly => last_day_after_months(start, 1),
            Self::Quarterly => last_day_after_months(start, 3),
            Self::HalfYear => last_day_after_months(start, 6),
            Self::Yearly => last_day_after_months(start, 12),
        };
        end.ok_or_else(|| self.out_of_range(date))
    }

    fn out_of_range(self, date: NaiveDate) -> EngineError {
        EngineError::InvalidPeriod(format!(
            "the {self} period of {date} is out of the calendar range"
        ))
    }
}

impl core::fmt::Display for RepeatFrequency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for RepeatFrequency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "half-year" => Ok(Self::HalfYear),
            "yearly" => Ok(Self::Yearly),
            other => Err(EngineError::InvalidPeriod(format!(
                "unknown repeat frequency: {other}"
            ))),
        }
    }
}

/// Sub-period used to bucket report entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    /// Picks the sub-period for a report over `[start, end]`.
    ///
    /// - more than 12 whole months: year
    /// - more than 1 whole month: month
    /// - more than 31 days: week
    /// - otherwise: day
    pub fn preferred(start: NaiveDate, end: NaiveDate) -> Self {
        let months = whole_months_between(start, end);
        if months > 12 {
            Self::Year
        } else if months > 1 {
            Self::Month
        } else if (end - start).num_days() > 31 {
            Self::Week
        } else {
            Self::Day
        }
    }

    fn frequency(self) -> RepeatFrequency {
        match self {
            Self::Day => RepeatFrequency::Daily,
            Self::Week => RepeatFrequency::Weekly,
            Self::Month => RepeatFrequency::Monthly,
            Self::Year => RepeatFrequency::Yearly,
        }
    }

    /// End of the sub-period containing `date`, `None` past the calendar.
    fn end_of(self, date: NaiveDate) -> Option<NaiveDate> {
        self.frequency().end_of(date).ok()
    }

    /// Sortable label of the sub-period containing `date`.
    ///
    /// Lexicographic order of labels equals chronological order.
    pub fn label(self, date: NaiveDate) -> String {
        let format = match self {
            Self::Day => "%Y-%m-%d",
            Self::Week => "%G-W%V",
            Self::Month => "%Y-%m",
            Self::Year => "%Y",
        };
        date.format(format).to_string()
    }

    /// Splits `[start, end]` into consecutive sub-periods.
    ///
    /// The first and last sub-periods are clamped to the range, so every day of
    /// the range belongs to exactly one sub-period. Returns nothing when
    /// `start > end`.
    pub fn sub_periods(self, start: NaiveDate, end: NaiveDate) -> Vec<SubPeriod> {
        let mut out = Vec::new();
        let mut current = start;
        while current <= end {
            let period_end = self.end_of(current).map_or(end, |period_end| period_end.min(end));
            out.push(SubPeriod {
                start: current,
                end: period_end,
                label: self.label(current),
            });
            match period_end.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        out
    }
}

/// One slice of a report range, both ends inclusive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub label: String,
}

fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

fn year_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.ordinal0()))
}

/// Last day of the `months`-th month counted from `start`'s month.
fn last_day_after_months(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    let last_month = start.checked_add_months(Months::new(months - 1))?;
    if last_month.month() == 12 {
        NaiveDate::from_ymd_opt(last_month.year(), 12, 31)
    } else {
        NaiveDate::from_ymd_opt(last_month.year(), last_month.month() + 1, 1)?.pred_opt()
    }
}

/// Number of complete months from `start` to `end`.
fn whole_months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return -whole_months_between(end, start);
    }
    let mut months = i64::from(end.year() - start.year()) * 12 + i64::from(end.month())
        - i64::from(start.month());
    if end.day() < start.day() {
        months -= 1;
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn frequency_labels_round_trip() {
        for freq in [
            RepeatFrequency::Daily,
            RepeatFrequency::Weekly,
            RepeatFrequency::Monthly,
            RepeatFrequency::Quarterly,
            RepeatFrequency::HalfYear,
            RepeatFrequency::Yearly,
        ] {
            assert_eq!(RepeatFrequency::try_from(freq.as_str()).unwrap(), freq);
        }
        assert!(RepeatFrequency::try_from("fortnightly").is_err());
    }

    #[test]
    fn snaps_to_period_start() {
        let date = d(2017, 8, 17); // Thursday
        assert_eq!(RepeatFrequency::Daily.start_of(date).unwrap(), date);
        assert_eq!(RepeatFrequency::Weekly.start_of(date).unwrap(), d(2017, 8, 14));
        assert_eq!(RepeatFrequency::Monthly.start_of(date).unwrap(), d(2017, 8, 1));
        assert_eq!(RepeatFrequency::Quarterly.start_of(date).unwrap(), d(2017, 7, 1));
        assert_eq!(RepeatFrequency::Yearly.start_of(date).unwrap(), d(2017, 1, 1));
    }

    #[test]
    fn half_year_uses_month_before_snapping() {
        assert_eq!(RepeatFrequency::HalfYear.start_of(d(2017, 6, 30)).unwrap(), d(2017, 1, 1));
        assert_eq!(RepeatFrequency::HalfYear.start_of(d(2017, 7, 1)).unwrap(), d(2017, 7, 1));
        assert_eq!(RepeatFrequency::HalfYear.start_of(d(2017, 12, 31)).unwrap(), d(2017, 7, 1));
        assert_eq!(RepeatFrequency::HalfYear.end_of(d(2017, 2, 3)).unwrap(), d(2017, 6, 30));
        assert_eq!(RepeatFrequency::HalfYear.end_of(d(2017, 9, 3)).unwrap(), d(2017, 12, 31));
    }

    #[test]
    fn period_ends_are_inclusive() {
        assert_eq!(RepeatFrequency::Monthly.end_of(d(2016, 2, 10)).unwrap(), d(2016, 2, 29));
        assert_eq!(RepeatFrequency::Quarterly.end_of(d(2017, 11, 2)).unwrap(), d(2017, 12, 31));
        assert_eq!(RepeatFrequency::Weekly.end_of(d(2017, 8, 17)).unwrap(), d(2017, 8, 20));
        assert_eq!(RepeatFrequency::Yearly.end_of(d(2017, 3, 1)).unwrap(), d(2017, 12, 31));
    }

    #[test]
    fn periods_past_the_calendar_fail() {
        let last = NaiveDate::MAX;
        assert_eq!(RepeatFrequency::Yearly.end_of(last).unwrap(), last);
        assert_eq!(RepeatFrequency::Monthly.end_of(last).unwrap(), last);
        for freq in [RepeatFrequency::Weekly, RepeatFrequency::Quarterly] {
            match freq.end_of(last) {
                Ok(end) => assert_eq!(end, last),
                Err(err) => assert!(matches!(err, EngineError::InvalidPeriod(_))),
            }
        }
        match RepeatFrequency::Weekly.start_of(NaiveDate::MIN) {
            Ok(start) => assert_eq!(start, NaiveDate::MIN),
            Err(err) => assert!(matches!(err, EngineError::InvalidPeriod(_))),
        }

        let periods = Granularity::Week.sub_periods(last - Days::new(3), last);
        assert_eq!(periods.last().map(|p| p.end), Some(last));
    }

    #[test]
    fn preferred_granularity_follows_range_length() {
        assert_eq!(Granularity::preferred(d(2017, 1, 1), d(2017, 1, 31)), Granularity::Day);
        assert_eq!(Granularity::preferred(d(2017, 1, 1), d(2017, 2, 20)), Granularity::Week);
        assert_eq!(Granularity::preferred(d(2017, 1, 1), d(2017, 6, 30)), Granularity::Month);
        assert_eq!(Granularity::preferred(d(2017, 1, 1), d(2017, 12, 31)), Granularity::Month);
        assert_eq!(Granularity::preferred(d(2016, 1, 1), d(2017, 12, 31)), Granularity::Year);
    }

    #[test]
    fn sub_periods_cover_the_range_exactly() {
        let periods = Granularity::Month.sub_periods(d(2017, 1, 15), d(2017, 3, 10));
        let labels: Vec<_> = periods.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["2017-01", "2017-02", "2017-03"]);
        assert_eq!(periods[0].start, d(2017, 1, 15));
        assert_eq!(periods[0].end, d(2017, 1, 31));
        assert_eq!(periods[2].end, d(2017, 3, 10));

        let single = Granularity::Day.sub_periods(d(2017, 1, 1), d(2017, 1, 1));
        assert_eq!(single.len(), 1);
        assert!(Granularity::Day.sub_periods(d(2017, 1, 2), d(2017, 1, 1)).is_empty());
    }

    #[test]
    fn week_labels_use_iso_weeks() {
        assert_eq!(Granularity::Week.label(d(2017, 1, 1)), "2016-W52");
        assert_eq!(Granularity::Week.label(d(2017, 1, 2)), "2017-W01");
    }
}
