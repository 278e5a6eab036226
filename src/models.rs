use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_OUTPUT_FILE: &str = "results.json";
pub const DEFAULT_DOCLING_BIN: &str = "docling";
pub const DOCLING_BIN_ENV: &str = "DOCLING_BIN";
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["pdf", "json"];
pub const MAX_PREVIEW_LENGTH: usize = 30;
pub const EMPTY_TEXT_MARKER: &str = "[empty]";
/// Largest `num_rows * num_cols` a grid is rebuilt for.
pub const MAX_GRID_POSITIONS: usize = 1 << 20;

/// The subset of a docling document that the audit reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    #[serde(default)]
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    #[serde(default)]
    pub prov: Vec<Provenance>,
    #[serde(default)]
    pub data: TableData,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Provenance {
    pub page_no: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableData {
    #[serde(default)]
    pub table_cells: Vec<TableCell>,
    #[serde(default)]
    pub num_rows: usize,
    #[serde(default)]
    pub num_cols: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Vec<Vec<TableCell>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableCell {
    #[serde(default = "one")]
    pub row_span: u32,
    #[serde(default = "one")]
    pub col_span: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(default)]
    pub start_row_offset_idx: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_row_offset_idx: Option<usize>,
    #[serde(default)]
    pub start_col_offset_idx: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_col_offset_idx: Option<usize>,
}

impl Default for TableCell {
    fn default() -> Self {
        Self {
            row_span: 1,
            col_span: 1,
            text: String::new(),
            start_row_offset_idx: 0,
            end_row_offset_idx: None,
            start_col_offset_idx: 0,
            end_col_offset_idx: None,
        }
    }
}

impl TableCell {
    #[must_use]
    pub fn new(row_span: u32, col_span: u32, text: impl Into<String>) -> Self {
        Self {
            row_span,
            col_span,
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at(mut self, row: usize, column: usize) -> Self {
        self.start_row_offset_idx = row;
        self.start_col_offset_idx = column;
        self
    }

    fn row_range(&self, limit: usize) -> std::ops::Range<usize> {
        clamped_range(self.start_row_offset_idx, self.end_row_offset_idx, self.row_span, limit)
    }

    fn col_range(&self, limit: usize) -> std::ops::Range<usize> {
        clamped_range(self.start_col_offset_idx, self.end_col_offset_idx, self.col_span, limit)
    }
}

/// End offsets saturate and are capped at `limit`, the declared grid extent.
fn clamped_range(
    start: usize,
    end: Option<usize>,
    span: u32,
    limit: usize,
) -> std::ops::Range<usize> {
    let end = end
        .unwrap_or_else(|| start.saturating_add(span.max(1) as usize))
        .min(limit);
    start.min(end)..end
}

impl Document {
    /// Rejects tables whose declared shape is too large to rebuild a grid for.
    pub fn check_shapes(&self) -> Result<(), String> {
        for (index, table) in self.tables.iter().enumerate() {
            if table.data.grid.is_none() && !table.data.has_plausible_shape() {
                return Err(format!(
                    "table {index} declares an implausible shape of {} x {}",
                    table.data.num_rows, table.data.num_cols
                ));
            }
        }
        Ok(())
    }
}

impl Table {
    #[must_use]
    pub fn new(pages: &[u32], grid: Vec<Vec<TableCell>>) -> Self {
        Self {
            prov: pages.iter().map(|&page_no| Provenance { page_no }).collect(),
            data: TableData {
                num_rows: grid.len(),
                num_cols: grid.iter().map(Vec::len).max().unwrap_or(0),
                grid: Some(grid),
                ..TableData::default()
            },
        }
    }

    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.prov.iter().map(|prov| prov.page_no)
    }

    /// Row-major cell grid. Exports without a serialized grid get one rebuilt
    /// from `table_cells`, with a spanning cell repeated at every position it
    /// covers.
    #[must_use]
    pub fn grid(&self) -> Cow<'_, [Vec<TableCell>]> {
        match &self.data.grid {
            Some(grid) => Cow::Borrowed(grid.as_slice()),
            None => Cow::Owned(self.data.rebuild_grid()),
        }
    }
}

impl TableData {
    fn has_plausible_shape(&self) -> bool {
        self.num_rows <= MAX_GRID_POSITIONS
            && self.num_cols <= MAX_GRID_POSITIONS
            && self
                .num_rows
                .checked_mul(self.num_cols)
                .is_some_and(|positions| positions <= MAX_GRID_POSITIONS)
    }

    /// Oversized shapes rebuild to an empty grid; loaders reject them first.
    fn rebuild_grid(&self) -> Vec<Vec<TableCell>> {
        if !self.has_plausible_shape() {
            return Vec::new();
        }

        let mut grid = vec![vec![TableCell::default(); self.num_cols]; self.num_rows];
        for cell in &self.table_cells {
            for row in cell.row_range(self.num_rows) {
                for column in cell.col_range(self.num_cols) {
                    if let Some(slot) = grid.get_mut(row).and_then(|cells| cells.get_mut(column)) {
                        slot.clone_from(cell);
                    }
                }
            }
        }
        grid
    }
}

fn one() -> u32 {
    1
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::analysis::analyze;
    use crate::models::{Document, Table, TableCell, TableData};

    #[test]
    fn missing_spans_and_null_text_use_defaults() {
        let json = r#"{"tables":[{"prov":[{"page_no":2}],"data":{"grid":[[{"text":null}]]}}]}"#;
        let document: Document = serde_json::from_str(json).expect("document should parse");

        let grid = document.tables[0].grid();
        assert_eq!(grid[0][0].row_span, 1);
        assert_eq!(grid[0][0].col_span, 1);
        assert_eq!(grid[0][0].text, "");
        assert_eq!(document.tables[0].page_numbers().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn rebuilds_grid_from_table_cells_when_absent() {
        let json = r#"{"tables":[{"prov":[],"data":{"num_rows":2,"num_cols":2,"table_cells":[
            {"row_span":2,"col_span":1,"text":"tall","start_row_offset_idx":0,"end_row_offset_idx":2,"start_col_offset_idx":0,"end_col_offset_idx":1},
            {"text":"x","start_row_offset_idx":0,"start_col_offset_idx":1}
        ]}}]}"#;
        let document: Document = serde_json::from_str(json).expect("document should parse");

        let grid = document.tables[0].grid();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0][0].text, "tall");
        assert_eq!(grid[1][0].text, "tall");
        assert_eq!(grid[0][1].text, "x");
        assert_eq!(grid[1][1], TableCell::default());
    }

    #[test]
    fn rebuilt_grid_ignores_cells_outside_declared_shape() {
        let json = r#"{"tables":[{"data":{"num_rows":1,"num_cols":1,"table_cells":[
            {"col_span":3,"text":"wide","start_row_offset_idx":0,"start_col_offset_idx":0}
        ]}}]}"#;
        let document: Document = serde_json::from_str(json).expect("document should parse");

        let grid = document.tables[0].grid();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].len(), 1);
        assert_eq!(grid[0][0].col_span, 3);
    }

    #[test]
    fn offsets_near_usize_max_do_not_overflow() {
        let json = r#"{"tables":[{"data":{"num_rows":2,"num_cols":2,"table_cells":[
            {"row_span":2,"text":"far","start_row_offset_idx":18446744073709551615,"start_col_offset_idx":0},
            {"col_span":2,"text":"edge","start_row_offset_idx":1,"start_col_offset_idx":18446744073709551615}
        ]}}]}"#;
        let document: Document = serde_json::from_str(json).expect("document should parse");

        let grid = document.tables[0].grid();
        assert_eq!(grid.len(), 2);
        assert!(grid.iter().flatten().all(|cell| cell == &TableCell::default()));
    }

    #[test]
    fn huge_end_offsets_are_clamped_to_the_grid() {
        let json = r#"{"tables":[{"data":{"num_rows":1,"num_cols":1,"table_cells":[
            {"row_span":2,"text":"long","start_row_offset_idx":0,"end_row_offset_idx":100000000000000,
             "start_col_offset_idx":0,"end_col_offset_idx":100000000000000}
        ]}}]}"#;
        let document: Document = serde_json::from_str(json).expect("document should parse");

        let report = analyze(&document);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].text_preview, "long");
    }

    #[test]
    fn implausible_shapes_are_rejected_and_never_allocated() {
        for (rows, cols) in [
            (1_000_000_000_000_usize, 0_usize),
            (0, 1_000_000_000_000),
            (usize::MAX, 2),
            (4096, 4096),
        ] {
            let document = Document {
                tables: vec![Table {
                    prov: Vec::new(),
                    data: TableData {
                        num_rows: rows,
                        num_cols: cols,
                        ..TableData::default()
                    },
                }],
            };

            let err = document.check_shapes().expect_err("shape should be rejected");
            assert!(err.contains("implausible shape"), "{err}");
            assert!(document.tables[0].grid().is_empty());
            assert_eq!(analyze(&document).table_count, 1);
        }
    }

    #[test]
    fn serialized_grid_skips_shape_check() {
        let mut table = Table::new(&[1], vec![vec![TableCell::new(1, 1, "a")]]);
        table.data.num_rows = usize::MAX;
        let document = Document {
            tables: vec![table],
        };
        assert_eq!(document.check_shapes(), Ok(()));
    }
}
