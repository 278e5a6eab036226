pub mod analysis;
pub mod converter;
pub mod discovery;
pub mod error;
pub mod models;
pub mod options;
pub mod output;
pub mod page_ranges;
pub mod pipeline;
pub mod report;
pub mod summary;

pub use analysis::{analyze, analyze_with, is_merged};
pub use converter::{DoclingCliConverter, DocumentConverter, ExtensionRouter, JsonDocumentLoader};
pub use error::AuditError;
pub use models::{Document, Table, TableCell};
pub use options::{AuditOptions, PageAlignment};
pub use page_ranges::{PageRanges, format_ranges};
pub use pipeline::{AuditRun, FileFailure, audit_files};
pub use report::{AnalysisReport, MergedCellFinding, PageRef};
