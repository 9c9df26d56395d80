use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Mean and row count of one calendar bucket.
///
/// `mean` is `None` when every row in the bucket was missing; a bucket with no
/// rows at all is not present in its profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BucketStats {
    pub mean: Option<f64>,
    pub rows: usize,
    pub observations: usize,
}

/// Recurring calendar bucket -> mean of the metric.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalProfile<K: Ord> {
    buckets: BTreeMap<K, BucketStats>,
}

#[derive(Serialize)]
struct ProfileEntry<'a, K> {
    bucket: &'a K,
    #[serde(flatten)]
    stats: &'a BucketStats,
}

// Composite keys such as (weekday, hour) are not valid JSON object keys, so
// profiles serialize as a list of entries.
impl<K: Ord + Serialize> Serialize for SeasonalProfile<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.buckets
                .iter()
                .map(|(bucket, stats)| ProfileEntry { bucket, stats }),
        )
    }
}

impl<K: Ord + Copy> SeasonalProfile<K> {
    pub(crate) fn from_buckets(buckets: BTreeMap<K, BucketStats>) -> Self {
        Self { buckets }
    }

    pub fn get(&self, key: K) -> Option<&BucketStats> {
        self.buckets.get(&key)
    }

    pub fn mean(&self, key: K) -> Option<f64> {
        self.buckets.get(&key).and_then(|b| b.mean)
    }

    pub fn contains(&self, key: K) -> bool {
        self.buckets.contains_key(&key)
    }

    pub fn keys(&self) -> Vec<K> {
        self.buckets.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &BucketStats)> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Bucket with the highest defined mean.
    pub fn peak(&self) -> Option<(K, f64)> {
        self.defined()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Bucket with the lowest defined mean.
    pub fn trough(&self) -> Option<(K, f64)> {
        self.defined()
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    fn defined(&self) -> impl Iterator<Item = (K, f64)> + '_ {
        self.buckets
            .iter()
            .filter_map(|(k, b)| b.mean.map(|m| (*k, m)))
    }
}

/// Every calendar grouping of one series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalDecomposition {
    /// Hour of day, 0..=23.
    pub hour_of_day: SeasonalProfile<u32>,
    /// ISO weekday, 1 = Monday ..= 7 = Sunday.
    pub iso_weekday: SeasonalProfile<u32>,
    /// ISO week of year, 1..=53.
    pub iso_week: SeasonalProfile<u32>,
    /// (ISO weekday, hour of day).
    pub weekday_hour: SeasonalProfile<(u32, u32)>,
}

pub fn weekday_name(iso_weekday: u32) -> &'static str {
    match iso_weekday {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "?",
    }
}
