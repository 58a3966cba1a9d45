use super::grid::Grid;
use serde::Serialize;
use tracing::{debug, warn};

/// Grids wider than this are eligible for the positional fallback.
const FALLBACK_MIN_COLUMNS: usize = 3;
const FALLBACK_COLUMNS: [usize; 2] = [1, 2];

/// Association between a requested period label and a grid column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMatch {
    pub period: String,
    pub column: usize,
}

impl ColumnMatch {
    pub fn new(period: impl Into<String>, column: usize) -> Self {
        Self {
            period: period.into(),
            column,
        }
    }
}

/// Locates the header column for each requested period, in request order.
///
/// Each label takes the first header cell whose text is exactly equal to it.
/// Labels with no such cell are dropped. A header column may serve several
/// labels. When nothing matched and the grid is wider than three columns,
/// columns 1 and 2 are returned under their own header labels instead.
pub fn match_periods<S: AsRef<str>>(grid: &Grid, requested: &[S]) -> Vec<ColumnMatch> {
    let Some(header) = grid.period_header() else {
        return Vec::new();
    };

    let mut matches = Vec::with_capacity(requested.len());
    for period in requested.iter().map(AsRef::as_ref) {
        match header.iter().position(|cell| cell.as_text() == Some(period)) {
            Some(column) => {
                debug!(period, column, "matched requested period");
                matches.push(ColumnMatch::new(period, column));
            }
            None => warn!(period, "requested period not present in table header"),
        }
    }

    if matches.is_empty() && grid.column_count() > FALLBACK_MIN_COLUMNS {
        warn!(
            requested = requested.len(),
            "no requested period matched; falling back to the first two period columns"
        );
        matches = FALLBACK_COLUMNS
            .iter()
            .map(|&column| {
                let label = header[column].as_text().unwrap_or_default();
                ColumnMatch::new(label, column)
            })
            .collect();
    }

    matches
}
