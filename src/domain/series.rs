use crate::domain::errors::MalformedInputError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Canonical instant used across the pipeline (UTC, hourly granularity).
pub type Timestamp = NaiveDateTime;

/// Canonical text form used when writing timestamps back out.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl TimePoint {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// NaN marks a missing observation.
    pub fn is_missing(&self) -> bool {
        self.value.is_nan()
    }
}

/// Ordered, uniquely keyed sequence of observations.
///
/// Construction rejects any timestamp that is not strictly after its
/// predecessor, so every `TimeSeries` in circulation is sorted and unique.
/// Deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedSeries")]
pub struct TimeSeries {
    name: String,
    points: Vec<TimePoint>,
}

#[derive(Deserialize)]
struct UncheckedSeries {
    name: String,
    points: Vec<TimePoint>,
}

impl TryFrom<UncheckedSeries> for TimeSeries {
    type Error = MalformedInputError;

    fn try_from(raw: UncheckedSeries) -> Result<Self, Self::Error> {
        TimeSeries::new(raw.name, raw.points)
    }
}

impl TimeSeries {
    /// Builds a series from already ordered points.
    ///
    /// Positions in the error are 1-based indexes into `points`.
    pub fn new(
        name: impl Into<String>,
        points: Vec<TimePoint>,
    ) -> Result<Self, MalformedInputError> {
        for (i, pair) in points.windows(2).enumerate() {
            let (prev, curr) = (pair[0].timestamp, pair[1].timestamp);
            let line = i as u64 + 2;
            if curr == prev {
                return Err(MalformedInputError::DuplicateTimestamp {
                    line,
                    timestamp: curr.format(TIMESTAMP_FORMAT).to_string(),
                });
            }
            if curr < prev {
                return Err(MalformedInputError::NonMonotonicTimestamp {
                    line,
                    previous: prev.format(TIMESTAMP_FORMAT).to_string(),
                    current: curr.format(TIMESTAMP_FORMAT).to_string(),
                });
            }
        }

        Ok(Self {
            name: name.into(),
            points,
        })
    }

    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TimePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimePoint> {
        self.points.iter()
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Points with a defined value.
    pub fn observed(&self) -> impl Iterator<Item = &TimePoint> {
        self.points.iter().filter(|p| !p.is_missing())
    }

    pub fn slice_range(&self, range: DateRange) -> Self {
        self.slice(range.start, range.end)
    }

    /// Inclusive date-range slice as a new series.
    pub fn slice(&self, start: Timestamp, end: Timestamp) -> Self {
        let lo = self.points.partition_point(|p| p.timestamp < start);
        let hi = self.points.partition_point(|p| p.timestamp <= end);
        let points = if lo < hi {
            self.points[lo..hi].to_vec()
        } else {
            Vec::new()
        };

        Self {
            name: self.name.clone(),
            points,
        }
    }
}

/// Inclusive `[start, end]` window; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DateRange {
    /// `None` when `start` is after `end`.
    pub fn new(start: Option<Timestamp>, end: Option<Timestamp>) -> Option<Self> {
        let start = start.unwrap_or(NaiveDateTime::MIN);
        let end = end.unwrap_or(NaiveDateTime::MAX);
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2020, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_rejects_backwards_timestamp() {
        let points = vec![
            TimePoint::new(ts(1, 10), 1.0),
            TimePoint::new(ts(1, 9), 2.0),
        ];
        let err = TimeSeries::new("search", points).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::NonMonotonicTimestamp { line: 2, .. }
        ));
    }

    #[test]
    fn test_new_rejects_duplicate_timestamp() {
        let points = vec![
            TimePoint::new(ts(1, 9), 1.0),
            TimePoint::new(ts(1, 10), 1.0),
            TimePoint::new(ts(1, 10), 2.0),
        ];
        let err = TimeSeries::new("search", points).unwrap_err();
        assert!(matches!(
            err,
            MalformedInputError::DuplicateTimestamp { line: 3, .. }
        ));
    }

    #[test]
    fn test_slice_is_inclusive() {
        let points = (0..24).map(|h| TimePoint::new(ts(2, h), h as f64)).collect();
        let series = TimeSeries::new("search", points).unwrap();

        let sliced = series.slice(ts(2, 5), ts(2, 8));
        assert_eq!(sliced.values(), vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(sliced.name(), "search");

        let outside = series.slice(ts(3, 0), ts(4, 0));
        assert!(outside.is_empty());
    }

    #[test]
    fn test_deserialize_enforces_ordering() {
        let ordered = r#"{"name":"search","points":[
            {"timestamp":"2020-05-01T09:00:00","value":1.0},
            {"timestamp":"2020-05-01T10:00:00","value":2.0}]}"#;
        let series: TimeSeries = serde_json::from_str(ordered).unwrap();
        assert_eq!(series.timestamps(), vec![ts(1, 9), ts(1, 10)]);

        let backwards = r#"{"name":"search","points":[
            {"timestamp":"2020-05-01T10:00:00","value":1.0},
            {"timestamp":"2020-05-01T09:00:00","value":2.0}]}"#;
        let err = serde_json::from_str::<TimeSeries>(backwards).unwrap_err();
        assert!(err.to_string().contains("goes backwards"));
    }

    #[test]
    fn test_date_range_open_ends() {
        let from = DateRange::new(Some(ts(2, 0)), None).unwrap();
        assert!(from.contains(ts(2, 0)));
        assert!(from.contains(ts(30, 23)));
        assert!(!from.contains(ts(1, 23)));

        let until = DateRange::new(None, Some(ts(2, 0))).unwrap();
        assert!(until.contains(ts(1, 0)));
        assert!(!until.contains(ts(2, 1)));

        assert!(DateRange::new(Some(ts(3, 0)), Some(ts(2, 0))).is_none());
    }

    #[test]
    fn test_observed_skips_nan() {
        let points = vec![
            TimePoint::new(ts(1, 0), 1.0),
            TimePoint::new(ts(1, 1), f64::NAN),
            TimePoint::new(ts(1, 2), 3.0),
        ];
        let series = TimeSeries::new("search", points).unwrap();
        assert_eq!(series.observed().count(), 2);
    }
}
