use serde::Serialize;

/// Row holding the reporting period labels.
pub const PERIOD_HEADER_ROW: usize = 0;
/// First row carrying metric values; row 1 is the accounting-standard label row.
pub const FIRST_METRIC_ROW: usize = 2;

/// A single table cell as scraped from the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Missing,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Blank text is treated the same as an absent cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) if !value.trim().is_empty() => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.as_text().is_none()
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map(Cell::from).unwrap_or(Cell::Missing)
    }
}

/// Rectangular table extracted from the financial statement region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Builds a grid, padding short rows with missing cells.
    pub fn new(mut rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Missing);
        }
        Self { rows }
    }

    pub fn from_text_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<Cell>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn period_header(&self) -> Option<&[Cell]> {
        self.rows.get(PERIOD_HEADER_ROW).map(Vec::as_slice)
    }

    pub fn metric_rows(&self) -> &[Vec<Cell>] {
        self.rows.get(FIRST_METRIC_ROW..).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }
}
