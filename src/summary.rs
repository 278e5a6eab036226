use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::page_ranges::format_ranges;
use crate::report::{AnalysisReport, UNKNOWN_LABEL};

const RULE_WIDTH: usize = 50;

/// Trims `text` and cuts it to `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

fn write_report<W: Write>(
    writer: &mut W,
    report: &AnalysisReport,
    preview_len: usize,
) -> io::Result<()> {
    if report.table_count == 0 {
        return writeln!(writer, "  No tables detected in this document.");
    }

    writeln!(
        writer,
        "  Found {} table(s); {} table(s) have merged cells.",
        report.table_count,
        report.tables_with_merged_cells()
    )?;

    if report.findings.is_empty() {
        return writeln!(writer, "  Tables detected, but no merged cells found.");
    }

    let pages = if report.merged_pages.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        format_ranges(report.merged_pages.iter().copied())
    };
    writeln!(writer, "  Merged table cells detected on pages: {pages}")?;

    for finding in &report.findings {
        writeln!(
            writer,
            "   - Page {}: \"{}\" (row={}, column={}, rowspan={}, colspan={})",
            finding.page,
            preview(&finding.text_preview, preview_len),
            finding.row,
            finding.column,
            finding.row_span,
            finding.col_span
        )?;
    }
    Ok(())
}

/// Renders a per-file, human readable account of merged cells.
pub fn write_summary<W: Write>(
    mut writer: W,
    results: &BTreeMap<PathBuf, AnalysisReport>,
    preview_len: usize,
) -> io::Result<()> {
    writeln!(writer, "Summary Report")?;
    writeln!(writer, "{}", "=".repeat(RULE_WIDTH))?;
    for (path, report) in results {
        writeln!(writer)?;
        writeln!(writer, "File: {}", path.display())?;
        write_report(&mut writer, report, preview_len)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::{preview, write_summary};
    use crate::report::{AnalysisReport, MergedCellFinding, PageRef};

    fn render(results: &BTreeMap<PathBuf, AnalysisReport>) -> String {
        let mut buffer = Vec::new();
        write_summary(&mut buffer, results, 30).expect("summary should render");
        String::from_utf8(buffer).expect("utf-8 summary")
    }

    fn finding(page: PageRef, text: &str) -> MergedCellFinding {
        MergedCellFinding {
            table: 0,
            page,
            row: 1,
            column: 2,
            row_span: 1,
            col_span: 2,
            text_preview: text.to_string(),
        }
    }

    #[test]
    fn preview_trims_and_truncates_on_char_boundaries() {
        assert_eq!(preview("  short  ", 30), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ééééé", 2), "éé...");
        assert_eq!(preview("exact", 5), "exact");
    }

    #[test]
    fn reports_documents_without_tables_or_merges() {
        let results = BTreeMap::from([
            (
                PathBuf::from("empty.pdf"),
                AnalysisReport {
                    table_count: 0,
                    findings: Vec::new(),
                    merged_pages: Vec::new(),
                    page_count: None,
                },
            ),
            (
                PathBuf::from("plain.pdf"),
                AnalysisReport {
                    table_count: 2,
                    findings: Vec::new(),
                    merged_pages: Vec::new(),
                    page_count: Some(2),
                },
            ),
        ]);

        let summary = render(&results);
        assert!(summary.contains("File: empty.pdf\n  No tables detected in this document."));
        assert!(summary.contains("Found 2 table(s); 0 table(s) have merged cells."));
        assert!(summary.contains("Tables detected, but no merged cells found."));
    }

    #[test]
    fn lists_pages_as_ranges_and_findings() {
        let results = BTreeMap::from([(
            PathBuf::from("merged.pdf"),
            AnalysisReport {
                table_count: 1,
                findings: vec![
                    finding(PageRef::Number(1), "Quarterly revenue by region and segment"),
                    finding(PageRef::Unknown, "[empty]"),
                ],
                merged_pages: vec![1, 2, 3, 7],
                page_count: Some(4),
            },
        )]);

        let summary = render(&results);
        assert!(summary.contains("Merged table cells detected on pages: 1-3, 7"));
        assert!(summary.contains(
            "   - Page 1: \"Quarterly revenue by region an...\" (row=1, column=2, rowspan=1, colspan=2)"
        ));
        assert!(summary.contains("   - Page unknown: \"[empty]\""));
    }
}
