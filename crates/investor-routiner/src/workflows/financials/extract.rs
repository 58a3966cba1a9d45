use super::acquirer::AcquisitionFailure;
use super::grid::{Cell, Grid};
use scraper::{ElementRef, Html, Selector};

/// Region of the item page holding the financial summary table.
const REGION_SELECTOR: &str = "div.section.cop_analysis";
const PREFERRED_TABLE_SELECTOR: &str = "div.sub_section table";
const TABLE_SELECTOR: &str = "table";
const ROW_SELECTOR: &str = "tr";
const MAX_SPAN: usize = 64;

/// Cell pinned to later rows by a `rowspan` attribute.
struct CarriedCell {
    text: Option<String>,
    rows_left: usize,
}

/// Extracts the financial summary table of an item page into a [`Grid`].
///
/// Row and column spans are expanded, the leading title row is discarded,
/// and columns that are empty in every remaining row are dropped.
pub fn extract_grid(html: &str) -> Result<Grid, AcquisitionFailure> {
    let region_selector = selector(REGION_SELECTOR)?;
    let preferred_selector = selector(PREFERRED_TABLE_SELECTOR)?;
    let table_selector = selector(TABLE_SELECTOR)?;
    let row_selector = selector(ROW_SELECTOR)?;

    let document = Html::parse_document(html);
    let region = document
        .select(&region_selector)
        .next()
        .ok_or_else(|| AcquisitionFailure::Structure {
            detail: "financial statement region not found; the page layout may have changed"
                .to_string(),
        })?;
    let table = region
        .select(&preferred_selector)
        .next()
        .or_else(|| region.select(&table_selector).next())
        .ok_or_else(|| AcquisitionFailure::Structure {
            detail: "financial statement region contains no table".to_string(),
        })?;

    let mut rows = expand_rows(table, &row_selector);
    if rows.len() < 2 {
        return Err(AcquisitionFailure::Structure {
            detail: "financial statement table has no data rows".to_string(),
        });
    }
    rows.remove(0);

    Ok(Grid::new(drop_empty_columns(rows)))
}

fn selector(source: &str) -> Result<Selector, AcquisitionFailure> {
    Selector::parse(source).map_err(|err| AcquisitionFailure::Parser {
        detail: format!("invalid selector '{source}': {err}"),
    })
}

fn expand_rows(table: ElementRef<'_>, row_selector: &Selector) -> Vec<Vec<Option<String>>> {
    let mut carried: Vec<Option<CarriedCell>> = Vec::new();
    let mut rows = Vec::new();

    for tr in table.select(row_selector) {
        let mut row = Vec::new();
        let mut cells = tr
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|element| matches!(element.value().name(), "th" | "td"));

        loop {
            if let Some(text) = take_carried(&mut carried, row.len()) {
                row.push(text);
                continue;
            }
            let Some(cell) = cells.next() else { break };

            let text = cell_text(cell);
            let colspan = span_attr(cell, "colspan");
            let rowspan = span_attr(cell, "rowspan");
            for _ in 0..colspan {
                if rowspan > 1 {
                    let column = row.len();
                    if carried.len() <= column {
                        carried.resize_with(column + 1, || None);
                    }
                    carried[column] = Some(CarriedCell {
                        text: text.clone(),
                        rows_left: rowspan - 1,
                    });
                }
                row.push(text.clone());
            }
        }

        while row.len() < carried.len() {
            let text = take_carried(&mut carried, row.len()).unwrap_or(None);
            row.push(text);
        }

        rows.push(row);
    }

    rows
}

fn take_carried(carried: &mut [Option<CarriedCell>], column: usize) -> Option<Option<String>> {
    let slot = carried.get_mut(column)?;
    let cell = slot.as_mut()?;
    let text = cell.text.clone();
    cell.rows_left -= 1;
    if cell.rows_left == 0 {
        *slot = None;
    }
    Some(text)
}

fn cell_text(cell: ElementRef<'_>) -> Option<String> {
    let raw = cell.text().collect::<String>();
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn span_attr(cell: ElementRef<'_>, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}

fn drop_empty_columns(rows: Vec<Vec<Option<String>>>) -> Vec<Vec<Cell>> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let keep: Vec<bool> = (0..width)
        .map(|column| {
            rows.iter()
                .any(|row| matches!(row.get(column), Some(Some(_))))
        })
        .collect();

    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .filter(|(column, _)| keep[*column])
                .map(|(_, text)| text.map(Cell::Text).unwrap_or(Cell::Missing))
                .collect()
        })
        .collect()
}
