use std::path::PathBuf;
use std::str::FromStr;

use crate::models::{
    DEFAULT_DOCLING_BIN, DEFAULT_OUTPUT_FILE, DOCLING_BIN_ENV, MAX_PREVIEW_LENGTH,
    SUPPORTED_EXTENSIONS,
};

/// How a table is matched to the page it is reported on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageAlignment {
    /// Table `i` takes the `i`-th page of every table's provenance pages
    /// concatenated in table order.
    #[default]
    Flattened,
    /// Table `i` takes the first page of its own provenance.
    PerTable,
}

impl FromStr for PageAlignment {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flattened" => Ok(Self::Flattened),
            "per-table" | "per_table" => Ok(Self::PerTable),
            other => Err(format!(
                "unknown page alignment '{other}', expected 'flattened' or 'per-table'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditOptions {
    pub extensions: Vec<String>,
    pub preview_len: usize,
    pub page_alignment: PageAlignment,
    pub docling_bin: String,
    pub work_dir: PathBuf,
    pub output: PathBuf,
}

impl AuditOptions {
    /// Defaults with the docling executable taken from `DOCLING_BIN` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Ok(bin) = std::env::var(DOCLING_BIN_ENV)
            && !bin.trim().is_empty()
        {
            options.docling_bin = bin;
        }
        options
    }
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            extensions: SUPPORTED_EXTENSIONS.iter().map(ToString::to_string).collect(),
            preview_len: MAX_PREVIEW_LENGTH,
            page_alignment: PageAlignment::default(),
            docling_bin: DEFAULT_DOCLING_BIN.to_string(),
            work_dir: std::env::temp_dir().join("illuminator"),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}
