use super::grid::{Cell, Grid};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write financial table export: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode financial table as CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes every grid row as CSV, prefixed with a UTF-8 byte order mark so
/// spreadsheet tools pick up the Korean labels.
pub fn write_grid_csv<W: Write>(grid: &Grid, mut writer: W) -> Result<(), ExportError> {
    writer.write_all(UTF8_BOM)?;
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in grid.rows() {
        csv_writer.write_record(row.iter().map(|cell| match cell {
            Cell::Text(value) => value.as_str(),
            Cell::Missing => "",
        }))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Saves the grid as `{dir}/{stock_code}_financials.csv`, creating `dir` if needed.
pub fn export_grid_csv(
    grid: &Grid,
    dir: impl AsRef<Path>,
    stock_code: &str,
) -> Result<PathBuf, ExportError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{stock_code}_financials.csv"));
    let file = File::create(&path)?;
    write_grid_csv(grid, BufWriter::new(file))?;
    Ok(path)
}
