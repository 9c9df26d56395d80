//! Monthly search-traffic totals and month-against-median comparison.

use crate::domain::series::TimeSeries;
use chrono::Datelike;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    Higher,
    Lower,
    Equal,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Comparison::Higher => "higher",
            Comparison::Lower => "lower",
            Comparison::Equal => "equal",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthComparison {
    pub year: i32,
    pub month: u32,
    pub total: f64,
    pub median_monthly_total: f64,
    /// `None` when the median is zero.
    pub ratio: Option<f64>,
    pub comparison: Comparison,
}

/// Calendar-month totals from the first to the last observed month.
///
/// Months inside that span with no rows total 0, the way a calendar resample
/// would report them.
pub fn monthly_totals(series: &TimeSeries) -> Vec<MonthlyTotal> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Vec::new();
    };

    let mut sums: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for p in series.observed() {
        let entry = sums
            .entry((p.timestamp.year(), p.timestamp.month()))
            .or_insert((0.0, 0));
        entry.0 += p.value;
        entry.1 += 1;
    }

    let mut totals = Vec::new();
    let (mut year, mut month) = (first.timestamp.year(), first.timestamp.month());
    let end = (last.timestamp.year(), last.timestamp.month());
    while (year, month) <= end {
        let (total, rows) = sums.get(&(year, month)).copied().unwrap_or((0.0, 0));
        totals.push(MonthlyTotal {
            year,
            month,
            total,
            rows,
        });
        (year, month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
    }
    totals
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Compares one month's total against the median of all monthly totals.
///
/// Returns `None` for an empty series.
pub fn compare_month(series: &TimeSeries, year: i32, month: u32) -> Option<MonthComparison> {
    let totals = monthly_totals(series);
    let median_total = median(&totals.iter().map(|t| t.total).collect::<Vec<_>>())?;

    let total: f64 = series
        .observed()
        .filter(|p| p.timestamp.year() == year && p.timestamp.month() == month)
        .map(|p| p.value)
        .sum();

    let comparison = match total.partial_cmp(&median_total) {
        Some(Ordering::Greater) => Comparison::Higher,
        Some(Ordering::Less) => Comparison::Lower,
        _ => Comparison::Equal,
    };

    Some(MonthComparison {
        year,
        month,
        total,
        median_monthly_total: median_total,
        ratio: (median_total != 0.0).then(|| total / median_total),
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{TimePoint, Timestamp};
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn series(points: &[(Timestamp, f64)]) -> TimeSeries {
        TimeSeries::new(
            "search",
            points.iter().map(|(t, v)| TimePoint::new(*t, *v)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_monthly_totals_fill_empty_months() {
        let s = series(&[
            (ts(2019, 11, 3), 10.0),
            (ts(2019, 11, 4), 5.0),
            (ts(2020, 1, 10), 7.0),
        ]);
        let totals = monthly_totals(&s);

        assert_eq!(totals.len(), 3);
        assert_eq!((totals[0].year, totals[0].month, totals[0].total), (2019, 11, 15.0));
        assert_eq!((totals[1].month, totals[1].total, totals[1].rows), (12, 0.0, 0));
        assert_eq!((totals[2].year, totals[2].month), (2020, 1));
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_compare_month_against_median() {
        let s = series(&[
            (ts(2020, 3, 1), 10.0),
            (ts(2020, 4, 1), 12.0),
            (ts(2020, 5, 1), 30.0),
            (ts(2020, 5, 2), 10.0),
            (ts(2020, 6, 1), 11.0),
        ]);
        let cmp = compare_month(&s, 2020, 5).unwrap();

        assert_eq!(cmp.total, 40.0);
        assert_eq!(cmp.median_monthly_total, 11.5);
        assert_eq!(cmp.comparison, Comparison::Higher);
        assert!((cmp.ratio.unwrap() - 40.0 / 11.5).abs() < 1e-12);
    }

    #[test]
    fn test_compare_month_empty_series() {
        assert!(compare_month(&TimeSeries::empty("search"), 2020, 5).is_none());
    }
}
