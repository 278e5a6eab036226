use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::analysis::analyze_with;
use crate::converter::DocumentConverter;
use crate::error::AuditError;
use crate::options::PageAlignment;
use crate::report::AnalysisReport;

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: AuditError,
}

#[derive(Debug, Default)]
pub struct AuditRun {
    pub results: BTreeMap<PathBuf, AnalysisReport>,
    pub failures: Vec<FileFailure>,
}

impl AuditRun {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

pub fn audit_file<C>(
    path: &Path,
    converter: &C,
    alignment: PageAlignment,
) -> Result<AnalysisReport, AuditError>
where
    C: DocumentConverter + ?Sized,
{
    let document = converter.convert(path)?;
    Ok(analyze_with(&document, alignment))
}

/// Converts and analyzes every file. A file that fails to convert is logged,
/// recorded in [`AuditRun::failures`], and left out of the results.
pub fn audit_files<C>(files: &[PathBuf], converter: &C, alignment: PageAlignment) -> AuditRun
where
    C: DocumentConverter + ?Sized,
{
    let mut run = AuditRun::default();

    for path in files {
        info!(path = %path.display(), "converting and analyzing");
        match audit_file(path, converter, alignment) {
            Ok(report) => {
                info!(
                    path = %path.display(),
                    tables = report.table_count,
                    merged_cells = report.findings.len(),
                    "analysis completed"
                );
                run.results.insert(path.clone(), report);
            }
            Err(error) => {
                error!(path = %path.display(), "failed to process: {error}");
                run.failures.push(FileFailure {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    run
}
