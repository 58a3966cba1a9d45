use super::coerce::{coerce, MetricValue};
use super::grid::Grid;
use super::matcher::ColumnMatch;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Separator between the period label and the metric name in record keys.
pub const KEY_SEPARATOR: &str = " - ";

/// Per-period mapping of `"{period} - {metric}"` to a typed value.
///
/// Keys keep their first-insertion position; re-inserting a key replaces
/// the value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodRecord {
    entries: Vec<(String, MetricValue)>,
}

impl PeriodRecord {
    pub fn key(period: &str, metric: &str) -> String {
        format!("{period}{KEY_SEPARATOR}{metric}")
    }

    pub fn insert(&mut self, key: String, value: MetricValue) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PeriodRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, MetricValue)> for PeriodRecord {
    fn from_iter<I: IntoIterator<Item = (K, MetricValue)>>(iter: I) -> Self {
        let mut record = PeriodRecord::default();
        for (key, value) in iter {
            record.insert(key.into(), value);
        }
        record
    }
}

/// Walks the metric rows once per match and collects the coerced values.
///
/// Rows without a metric name or without a value in the matched column are
/// skipped for that column. Records that end up empty are not emitted.
pub fn build_records(grid: &Grid, matches: &[ColumnMatch]) -> Vec<PeriodRecord> {
    matches
        .iter()
        .filter_map(|matched| {
            let mut record = PeriodRecord::default();
            for row in grid.metric_rows() {
                let metric = row.first().and_then(|cell| cell.as_text());
                let value = row.get(matched.column).and_then(|cell| cell.as_text());
                if let (Some(metric), Some(value)) = (metric, value) {
                    record.insert(PeriodRecord::key(&matched.period, metric), coerce(value));
                }
            }
            (!record.is_empty()).then_some(record)
        })
        .collect()
}
