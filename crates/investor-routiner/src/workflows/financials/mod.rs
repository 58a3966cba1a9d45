//! Financial statement extraction and period matching.
//!
//! A [`Grid`] scraped from an item page is reduced to one [`PeriodRecord`]
//! per requested reporting period. Data-quality problems never surface as
//! errors: unmatched periods, sparse rows and unparseable values only shrink
//! or degrade the output.

mod acquirer;
mod coerce;
mod export;
mod extract;
mod grid;
mod matcher;
mod records;
mod table;

pub use acquirer::{AcquisitionFailure, NaverTableAcquirer, TableAcquirer};
pub use coerce::{coerce, MetricValue};
pub use export::{export_grid_csv, write_grid_csv, ExportError};
pub use extract::extract_grid;
pub use grid::{Cell, Grid, FIRST_METRIC_ROW, PERIOD_HEADER_ROW};
pub use matcher::{match_periods, ColumnMatch};
pub use records::{build_records, PeriodRecord, KEY_SEPARATOR};
pub use table::{FinancialTable, MetricRow};

/// Matches the requested periods against the grid header and builds the
/// per-period records in request order.
pub fn period_records<S: AsRef<str>>(grid: &Grid, requested: &[S]) -> Vec<PeriodRecord> {
    let matches = match_periods(grid, requested);
    build_records(grid, &matches)
}
