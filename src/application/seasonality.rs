use crate::domain::seasonal::{BucketStats, SeasonalDecomposition, SeasonalProfile};
use crate::domain::series::{TimeSeries, Timestamp};
use crate::domain::table::AlignedTable;
use chrono::{Datelike, Timelike};
use std::collections::BTreeMap;
use tracing::debug;

/// Groups rows by `key` and averages each group, skipping missing values.
///
/// A bucket exists iff at least one row maps to it. Its mean is `None` when
/// none of those rows carried a value.
pub fn group_mean<K, I, F>(rows: I, key: F) -> SeasonalProfile<K>
where
    K: Ord + Copy,
    I: IntoIterator<Item = (Timestamp, Option<f64>)>,
    F: Fn(&Timestamp) -> K,
{
    let mut acc: BTreeMap<K, (f64, usize, usize)> = BTreeMap::new();
    for (ts, value) in rows {
        let entry = acc.entry(key(&ts)).or_insert((0.0, 0, 0));
        entry.1 += 1;
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            entry.0 += v;
            entry.2 += 1;
        }
    }

    let buckets = acc
        .into_iter()
        .map(|(k, (sum, rows, observations))| {
            let mean = (observations > 0).then(|| sum / observations as f64);
            (
                k,
                BucketStats {
                    mean,
                    rows,
                    observations,
                },
            )
        })
        .collect();

    SeasonalProfile::from_buckets(buckets)
}

pub fn hour_of_day(ts: &Timestamp) -> u32 {
    ts.hour()
}

/// 1 = Monday ..= 7 = Sunday.
pub fn iso_weekday(ts: &Timestamp) -> u32 {
    ts.weekday().number_from_monday()
}

/// ISO 8601 week number; week 53 only exists in long ISO years.
pub fn iso_week(ts: &Timestamp) -> u32 {
    ts.iso_week().week()
}

/// Hour-of-day, weekday, week-of-year and weekday-by-hour profiles.
pub fn decompose<I>(rows: I) -> SeasonalDecomposition
where
    I: IntoIterator<Item = (Timestamp, Option<f64>)>,
{
    let rows: Vec<(Timestamp, Option<f64>)> = rows.into_iter().collect();

    let decomposition = SeasonalDecomposition {
        hour_of_day: group_mean(rows.iter().copied(), hour_of_day),
        iso_weekday: group_mean(rows.iter().copied(), iso_weekday),
        iso_week: group_mean(rows.iter().copied(), iso_week),
        weekday_hour: group_mean(rows.iter().copied(), |ts| (iso_weekday(ts), hour_of_day(ts))),
    };

    debug!(
        "Seasonal profiles over {} rows: {} hours, {} weekdays, {} weeks",
        rows.len(),
        decomposition.hour_of_day.len(),
        decomposition.iso_weekday.len(),
        decomposition.iso_week.len()
    );
    decomposition
}

pub fn decompose_series(series: &TimeSeries) -> SeasonalDecomposition {
    decompose(series.iter().map(|p| (p.timestamp, Some(p.value))))
}

/// Profiles of the search column of an aligned table.
pub fn decompose_aligned(table: &AlignedTable) -> SeasonalDecomposition {
    decompose(table.rows().iter().map(|r| (r.timestamp, Some(r.search))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::TimePoint;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_hour_profile_means() {
        let rows = vec![
            (ts(2020, 5, 4, 9), Some(10.0)),
            (ts(2020, 5, 5, 9), Some(20.0)),
            (ts(2020, 5, 5, 10), Some(5.0)),
        ];
        let profile = group_mean(rows, hour_of_day);

        assert_eq!(profile.keys(), vec![9, 10]);
        assert_eq!(profile.mean(9), Some(15.0));
        assert_eq!(profile.get(9).unwrap().rows, 2);
        assert!(!profile.contains(11));
    }

    #[test]
    fn test_all_missing_bucket_is_undefined_not_zero() {
        let rows = vec![
            (ts(2020, 5, 4, 9), None),
            (ts(2020, 5, 4, 10), Some(3.0)),
        ];
        let profile = group_mean(rows, hour_of_day);

        assert!(profile.contains(9));
        assert_eq!(profile.mean(9), None);
        assert_eq!(profile.get(9).unwrap().observations, 0);
    }

    #[test]
    fn test_iso_weekday_numbering() {
        // 2020-05-04 is a Monday, 2020-05-10 a Sunday
        assert_eq!(iso_weekday(&ts(2020, 5, 4, 0)), 1);
        assert_eq!(iso_weekday(&ts(2020, 5, 10, 0)), 7);
    }

    #[test]
    fn test_week_53_only_when_observed() {
        // 2020-12-31 falls in ISO week 53 of 2020
        let with_53 = group_mean(vec![(ts(2020, 12, 31, 12), Some(1.0))], iso_week);
        assert_eq!(with_53.keys(), vec![53]);

        // 2019 has no week 53; 2019-12-30 is ISO week 1 of 2020
        let without = group_mean(
            vec![
                (ts(2019, 12, 23, 12), Some(1.0)),
                (ts(2019, 12, 30, 12), Some(2.0)),
            ],
            iso_week,
        );
        assert_eq!(without.keys(), vec![1, 52]);
    }

    #[test]
    fn test_decompose_series_covers_observed_buckets() {
        let start = ts(2020, 5, 4, 0);
        let points = (0..48)
            .map(|h| TimePoint::new(start + chrono::Duration::hours(h), h as f64))
            .collect();
        let series = TimeSeries::new("search", points).unwrap();

        let d = decompose_series(&series);
        assert_eq!(d.hour_of_day.len(), 24);
        assert_eq!(d.iso_weekday.keys(), vec![1, 2]);
        assert_eq!(d.weekday_hour.len(), 48);
        // Hour 0 on Monday (0) and Tuesday (24)
        assert_eq!(d.hour_of_day.mean(0), Some(12.0));
    }
}
