use super::coerce::MetricValue;
use super::records::{PeriodRecord, KEY_SEPARATOR};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write;

/// Period label used for record keys that carry no period prefix.
const UNLABELLED_PERIOD: &str = "기간";
const METRIC_HEADER: &str = "지표";

/// Metric-by-period pivot of a set of period records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FinancialTable {
    pub periods: Vec<String>,
    pub rows: Vec<MetricRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricRow {
    pub metric: String,
    pub values: HashMap<String, MetricValue>,
}

impl FinancialTable {
    /// Periods are sorted ascending; metrics keep their first-seen order.
    pub fn from_records(records: &[PeriodRecord]) -> Self {
        let mut periods = BTreeSet::new();
        let mut rows: Vec<MetricRow> = Vec::new();

        for (key, value) in records.iter().flat_map(|record| record.iter()) {
            let (period, metric) = key
                .split_once(KEY_SEPARATOR)
                .unwrap_or((UNLABELLED_PERIOD, key));
            periods.insert(period.to_string());

            let index = match rows.iter().position(|row| row.metric == metric) {
                Some(index) => index,
                None => {
                    rows.push(MetricRow {
                        metric: metric.to_string(),
                        values: HashMap::new(),
                    });
                    rows.len() - 1
                }
            };
            rows[index]
                .values
                .insert(period.to_string(), value.clone());
        }

        Self {
            periods: periods.into_iter().collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders a pipe table with a `지표` column followed by one column per period.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let header = std::iter::once(METRIC_HEADER).chain(self.periods.iter().map(String::as_str));
        push_row(&mut out, header);

        let divider = std::iter::once(":---")
            .chain(self.periods.iter().map(|_| "---:"));
        push_row(&mut out, divider);

        for row in &self.rows {
            let cells: Vec<String> = std::iter::once(row.metric.clone())
                .chain(self.periods.iter().map(|period| {
                    row.values
                        .get(period)
                        .map(ToString::to_string)
                        .unwrap_or_default()
                }))
                .collect();
            push_row(&mut out, cells.iter().map(String::as_str));
        }

        out
    }
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for cell in cells {
        let _ = write!(out, " {} |", cell.replace('|', "\\|"));
    }
    out.push('\n');
}
