use crate::domain::series::TimeSeries;
use crate::domain::table::{AlignedRow, AlignedTable};
use std::cmp::Ordering;
use tracing::info;

/// Inner-joins the search and price series on timestamp.
///
/// A timestamp survives only if both sides carry a defined value there.
/// Nothing is filled: a forward-filled price across closed hours would invent
/// returns. Both inputs are sorted, so a single merge pass keeps the output
/// sorted as well.
pub fn align(search: &TimeSeries, close: &TimeSeries) -> AlignedTable {
    let (a, b) = (search.points(), close.points());
    let mut rows = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].timestamp.cmp(&b[j].timestamp) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                if !a[i].is_missing() && !b[j].is_missing() {
                    rows.push(AlignedRow {
                        timestamp: a[i].timestamp,
                        search: a[i].value,
                        close: b[j].value,
                    });
                }
                i += 1;
                j += 1;
            }
        }
    }

    info!(
        "Aligned {} rows ('{}': {}, '{}': {})",
        rows.len(),
        search.name(),
        a.len(),
        close.name(),
        b.len()
    );

    AlignedTable::from_sorted_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{TimePoint, Timestamp};
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2020, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn series(name: &str, points: &[(Timestamp, f64)]) -> TimeSeries {
        TimeSeries::new(
            name,
            points.iter().map(|(t, v)| TimePoint::new(*t, *v)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_align_keeps_only_shared_defined_timestamps() {
        let a = series(
            "search",
            &[
                (ts(1, 0), 10.0),
                (ts(1, 1), 20.0),
                (ts(1, 2), f64::NAN),
                (ts(1, 3), 30.0),
            ],
        );
        let b = series(
            "close",
            &[
                (ts(1, 0), 100.0),
                (ts(1, 1), f64::NAN),
                (ts(1, 2), 102.0),
                (ts(1, 3), 103.0),
            ],
        );

        let table = align(&a, &b);
        assert_eq!(table.timestamps(), vec![ts(1, 0), ts(1, 3)]);
        assert_eq!(table.search(), vec![10.0, 30.0]);
        assert_eq!(table.close(), vec![100.0, 103.0]);
    }

    #[test]
    fn test_align_disjoint_ranges() {
        let a = series("search", &[(ts(1, 0), 1.0), (ts(1, 1), 2.0)]);
        let b = series("close", &[(ts(2, 0), 1.0), (ts(2, 1), 2.0)]);
        assert!(align(&a, &b).is_empty());
    }

    #[test]
    fn test_align_weekend_gap_in_prices() {
        // Search is continuous; prices skip the 4th and 5th
        let search_points: Vec<(Timestamp, f64)> = (1..=7)
            .map(|d| (ts(d, 10), d as f64))
            .collect();
        let close_points: Vec<(Timestamp, f64)> = [1, 2, 3, 6, 7]
            .iter()
            .map(|&d| (ts(d, 10), 100.0 + d as f64))
            .collect();

        let table = align(
            &series("search", &search_points),
            &series("close", &close_points),
        );
        assert_eq!(table.len(), 5);
        assert!(table.len() <= search_points.len().min(close_points.len()));
        assert_eq!(table.search(), vec![1.0, 2.0, 3.0, 6.0, 7.0]);
    }
}
