use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::AuditError;
use crate::models::Document;

const STDERR_TAIL_LINES: usize = 5;

/// Turns a source file into the document model the audit reads.
pub trait DocumentConverter {
    fn convert(&self, path: &Path) -> Result<Document, AuditError>;
}

/// Loads a document that docling already exported as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocumentLoader;

impl JsonDocumentLoader {
    pub fn parse(path: &Path, json: &str) -> Result<Document, AuditError> {
        let document: Document = serde_json::from_str(json).map_err(|error| {
            AuditError::conversion(path, format!("invalid docling JSON: {error}"))
        })?;
        document
            .check_shapes()
            .map_err(|message| AuditError::conversion(path, message))?;
        Ok(document)
    }
}

impl DocumentConverter for JsonDocumentLoader {
    fn convert(&self, path: &Path) -> Result<Document, AuditError> {
        let json = fs::read_to_string(path)
            .map_err(|error| AuditError::conversion(path, error.to_string()))?;
        Self::parse(path, &json)
    }
}

/// Runs the external `docling` command and loads its JSON export.
#[derive(Debug, Clone)]
pub struct DoclingCliConverter {
    program: String,
    work_dir: PathBuf,
}

impl DoclingCliConverter {
    #[must_use]
    pub fn new(program: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
        }
    }

    fn exported_json_path(&self, source: &Path) -> Result<PathBuf, AuditError> {
        let stem = source
            .file_stem()
            .ok_or_else(|| AuditError::conversion(source, "input path has no file name"))?;
        let mut file_name = stem.to_os_string();
        file_name.push(".json");
        Ok(self.work_dir.join(file_name))
    }
}

impl DocumentConverter for DoclingCliConverter {
    fn convert(&self, path: &Path) -> Result<Document, AuditError> {
        fs::create_dir_all(&self.work_dir)?;
        let exported = self.exported_json_path(path)?;
        match fs::remove_file(&exported) {
            Ok(()) => debug!(export = %exported.display(), "removed stale docling export"),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => return Err(error.into()),
        }

        debug!(program = %self.program, input = %path.display(), "running docling");
        let output = Command::new(&self.program)
            .arg(path)
            .args(["--to", "json", "--output"])
            .arg(&self.work_dir)
            .output()
            .map_err(|source| AuditError::ConverterUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail = stderr
                .lines()
                .rev()
                .take(STDERR_TAIL_LINES)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(AuditError::conversion(
                path,
                format!("docling exited with {}: {tail}", output.status),
            ));
        }

        if !exported.is_file() {
            return Err(AuditError::conversion(
                path,
                format!("docling did not write '{}'", exported.display()),
            ));
        }

        info!(export = %exported.display(), "docling export written");
        JsonDocumentLoader.convert(&exported)
    }
}

/// Picks a converter from the input's file extension.
#[derive(Debug, Clone)]
pub struct ExtensionRouter {
    json: JsonDocumentLoader,
    docling: DoclingCliConverter,
}

impl ExtensionRouter {
    #[must_use]
    pub fn new(docling: DoclingCliConverter) -> Self {
        Self {
            json: JsonDocumentLoader,
            docling,
        }
    }
}

impl DocumentConverter for ExtensionRouter {
    fn convert(&self, path: &Path) -> Result<Document, AuditError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => self.json.convert(path),
            Some("pdf") => self.docling.convert(path),
            _ => Err(AuditError::UnsupportedInput {
                path: path.to_path_buf(),
            }),
        }
    }
}
