use std::collections::BTreeSet;

use crate::models::{Document, EMPTY_TEXT_MARKER, TableCell};
use crate::options::PageAlignment;
use crate::report::{AnalysisReport, MergedCellFinding, PageRef};

/// A cell is merged when it spans more than one row or column.
#[must_use]
pub fn is_merged(cell: &TableCell) -> bool {
    cell.row_span > 1 || cell.col_span > 1
}

/// Scans every table of `document` for merged cells, resolving pages with
/// [`PageAlignment::Flattened`].
#[must_use]
pub fn analyze(document: &Document) -> AnalysisReport {
    analyze_with(document, PageAlignment::default())
}

#[must_use]
pub fn analyze_with(document: &Document, alignment: PageAlignment) -> AnalysisReport {
    let flattened_pages = document
        .tables
        .iter()
        .flat_map(|table| table.page_numbers())
        .collect::<Vec<_>>();
    let page_count = flattened_pages.iter().collect::<BTreeSet<_>>().len();

    let mut findings = Vec::new();
    let mut merged_pages = BTreeSet::new();

    for (table_index, table) in document.tables.iter().enumerate() {
        let page = PageRef::from(match alignment {
            PageAlignment::Flattened => flattened_pages.get(table_index).copied(),
            PageAlignment::PerTable => table.page_numbers().next(),
        });

        for (row_index, row) in table.grid().iter().enumerate() {
            for (col_index, cell) in row.iter().enumerate() {
                if !is_merged(cell) {
                    continue;
                }

                findings.push(MergedCellFinding {
                    table: table_index,
                    page,
                    row: row_index,
                    column: col_index,
                    row_span: cell.row_span,
                    col_span: cell.col_span,
                    text_preview: if cell.text.is_empty() {
                        EMPTY_TEXT_MARKER.to_string()
                    } else {
                        cell.text.clone()
                    },
                });

                if let Some(number) = page.number() {
                    merged_pages.insert(number);
                }
            }
        }
    }

    AnalysisReport {
        table_count: document.tables.len(),
        findings,
        merged_pages: merged_pages.into_iter().collect(),
        page_count: (page_count > 0).then_some(page_count),
    }
}
