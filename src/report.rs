use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

pub const UNKNOWN_LABEL: &str = "unknown";

/// Page a finding was attributed to. Serialized as a bare integer, or as the
/// string `"unknown"` when provenance could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "PageRepr", from = "PageRepr")]
pub enum PageRef {
    Number(u32),
    Unknown,
}

impl PageRef {
    #[must_use]
    pub const fn number(self) -> Option<u32> {
        match self {
            Self::Number(page) => Some(page),
            Self::Unknown => None,
        }
    }
}

impl From<Option<u32>> for PageRef {
    fn from(page: Option<u32>) -> Self {
        page.map_or(Self::Unknown, Self::Number)
    }
}

impl Display for PageRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(page) => write!(f, "{page}"),
            Self::Unknown => f.write_str(UNKNOWN_LABEL),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PageRepr {
    Number(u32),
    Label(String),
}

impl From<PageRef> for PageRepr {
    fn from(page: PageRef) -> Self {
        match page {
            PageRef::Number(page) => Self::Number(page),
            PageRef::Unknown => Self::Label(UNKNOWN_LABEL.to_string()),
        }
    }
}

impl From<PageRepr> for PageRef {
    fn from(repr: PageRepr) -> Self {
        match repr {
            PageRepr::Number(page) => Self::Number(page),
            PageRepr::Label(_) => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedCellFinding {
    pub table: usize,
    pub page: PageRef,
    pub row: usize,
    pub column: usize,
    #[serde(rename = "rowspan")]
    pub row_span: u32,
    #[serde(rename = "colspan")]
    pub col_span: u32,
    #[serde(rename = "text")]
    pub text_preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub table_count: usize,
    #[serde(rename = "merged_table_cells")]
    pub findings: Vec<MergedCellFinding>,
    #[serde(rename = "merged_cell_pages")]
    pub merged_pages: Vec<u32>,
    #[serde(with = "unknown_when_none")]
    pub page_count: Option<usize>,
}

impl AnalysisReport {
    /// Number of distinct tables holding at least one merged cell.
    #[must_use]
    pub fn tables_with_merged_cells(&self) -> usize {
        self.findings
            .iter()
            .map(|finding| finding.table)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

mod unknown_when_none {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::UNKNOWN_LABEL;

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum CountRepr {
        Count(usize),
        Label(String),
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(count) => CountRepr::Count(*count),
            None => CountRepr::Label(UNKNOWN_LABEL.to_string()),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match CountRepr::deserialize(deserializer)? {
            CountRepr::Count(count) => Some(count),
            CountRepr::Label(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::report::{AnalysisReport, MergedCellFinding, PageRef};

    fn finding(table: usize, page: PageRef) -> MergedCellFinding {
        MergedCellFinding {
            table,
            page,
            row: 0,
            column: 1,
            row_span: 2,
            col_span: 1,
            text_preview: "b".to_string(),
        }
    }

    #[test]
    fn serializes_with_persisted_key_names() {
        let report = AnalysisReport {
            table_count: 1,
            findings: vec![finding(0, PageRef::Number(4))],
            merged_pages: vec![4],
            page_count: Some(1),
        };

        let value = serde_json::to_value(&report).expect("report should serialize");
        assert_eq!(
            value,
            json!({
                "table_count": 1,
                "merged_table_cells": [{
                    "table": 0,
                    "page": 4,
                    "row": 0,
                    "column": 1,
                    "rowspan": 2,
                    "colspan": 1,
                    "text": "b"
                }],
                "merged_cell_pages": [4],
                "page_count": 1
            })
        );
    }

    #[test]
    fn unknown_page_and_count_serialize_as_label() {
        let report = AnalysisReport {
            table_count: 1,
            findings: vec![finding(0, PageRef::Unknown)],
            merged_pages: Vec::new(),
            page_count: None,
        };

        let value = serde_json::to_value(&report).expect("report should serialize");
        assert_eq!(value["merged_table_cells"][0]["page"], json!("unknown"));
        assert_eq!(value["page_count"], json!("unknown"));

        let back: AnalysisReport = serde_json::from_value(value).expect("report should parse");
        assert_eq!(back, report);
    }

    #[test]
    fn counts_distinct_tables_with_findings() {
        let report = AnalysisReport {
            table_count: 3,
            findings: vec![
                finding(0, PageRef::Number(1)),
                finding(2, PageRef::Unknown),
                finding(0, PageRef::Number(1)),
            ],
            merged_pages: vec![1],
            page_count: Some(2),
        };

        assert_eq!(report.tables_with_merged_cells(), 2);
    }
}
