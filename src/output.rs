use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::error::AuditError;
use crate::models::DEFAULT_OUTPUT_FILE;
use crate::report::AnalysisReport;

const MAX_NAME_ATTEMPTS: usize = 100;

/// `results.json` at 12:30:05 UTC becomes `results_20250101_123005_UTC.json`;
/// later attempts append `_1`, `_2`, ... to the stem.
#[must_use]
pub fn timestamped_path(requested: &Path, now: DateTime<Utc>, attempt: usize) -> PathBuf {
    let stem = requested
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}_{}_UTC", now.format("%Y%m%d_%H%M%S"));
    if attempt > 0 {
        name.push_str(&format!("_{attempt}"));
    }
    if let Some(ext) = requested.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    requested.with_file_name(name)
}

fn output_candidates(requested: &Path, now: DateTime<Utc>) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(MAX_NAME_ATTEMPTS + 1);
    if requested != Path::new(DEFAULT_OUTPUT_FILE) && !requested.exists() {
        candidates.push(requested.to_path_buf());
    }
    candidates.extend((0..MAX_NAME_ATTEMPTS).map(|attempt| timestamped_path(requested, now, attempt)));
    candidates
}

fn create_fresh(requested: &Path, now: DateTime<Utc>) -> Result<(File, PathBuf), AuditError> {
    for candidate in output_candidates(requested, now) {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((file, candidate)),
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {}
            Err(error) => return Err(error.into()),
        }
    }

    Err(AuditError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!(
            "no free output name derived from '{}'",
            requested.display()
        ),
    )))
}

pub fn write_results<W: Write>(
    writer: W,
    results: &BTreeMap<PathBuf, AnalysisReport>,
) -> Result<(), AuditError> {
    let keyed = results
        .iter()
        .map(|(path, report)| (path.display().to_string(), report))
        .collect::<BTreeMap<_, _>>();

    let mut serializer =
        serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(b"    "));
    keyed.serialize(&mut serializer)?;
    Ok(())
}

/// Writes `results` as JSON without ever replacing an existing file. Returns
/// the path actually written.
pub fn save_results(
    results: &BTreeMap<PathBuf, AnalysisReport>,
    requested: &Path,
) -> Result<PathBuf, AuditError> {
    save_results_at(results, requested, Utc::now())
}

pub fn save_results_at(
    results: &BTreeMap<PathBuf, AnalysisReport>,
    requested: &Path,
    now: DateTime<Utc>,
) -> Result<PathBuf, AuditError> {
    let (file, written) = create_fresh(requested, now)?;
    if written != requested {
        info!(
            requested = %requested.display(),
            written = %written.display(),
            "output file exists or is the default name; saving under a timestamped name"
        );
    }

    let mut writer = BufWriter::new(file);
    write_results(&mut writer, results)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    info!(path = %written.display(), "results saved");
    Ok(written)
}
