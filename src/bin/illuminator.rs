use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use illuminator::discovery::supported_files;
use illuminator::models::{DEFAULT_OUTPUT_FILE, DOCLING_BIN_ENV};
use illuminator::output::save_results;
use illuminator::summary::write_summary;
use illuminator::{
    AuditError, AuditOptions, AuditRun, DoclingCliConverter, ExtensionRouter, PageAlignment,
    audit_files,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "illuminator",
    version,
    about = "Report merged table cells in documents converted by docling"
)]
struct Cli {
    /// Path to a PDF or docling JSON file, or a directory of them.
    #[arg(short, long)]
    file: PathBuf,

    /// Where to save the JSON results. Existing files are never overwritten.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// How tables are matched to pages: flattened or per-table.
    #[arg(long, default_value = "flattened")]
    page_alignment: String,

    /// docling executable used for PDF inputs.
    #[arg(long, env = DOCLING_BIN_ENV)]
    docling_bin: Option<String>,

    /// Directory receiving docling JSON exports.
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Maximum characters of cell text shown per finding.
    #[arg(long)]
    preview_len: Option<usize>,

    /// Print the summary without saving results.
    #[arg(long)]
    summary_only: bool,

    /// Prefix log lines with timestamps.
    #[arg(long)]
    timestamps: bool,
}

fn parse_options(cli: &Cli) -> Result<AuditOptions> {
    let page_alignment = PageAlignment::from_str(&cli.page_alignment)
        .map_err(|error| anyhow!(AuditError::InvalidOption(error)))
        .context("failed to parse --page-alignment")?;

    let mut options = AuditOptions::from_env();
    options.page_alignment = page_alignment;
    options.output.clone_from(&cli.output);
    if let Some(bin) = &cli.docling_bin {
        options.docling_bin.clone_from(bin);
    }
    if let Some(work_dir) = &cli.work_dir {
        options.work_dir.clone_from(work_dir);
    }
    if let Some(preview_len) = cli.preview_len {
        if preview_len == 0 {
            anyhow::bail!(AuditError::InvalidOption(
                "--preview-len must be at least 1".to_string()
            ));
        }
        options.preview_len = preview_len;
    }
    Ok(options)
}

fn run(cli: &Cli) -> Result<Option<AuditRun>> {
    let options = parse_options(cli)?;
    let files = supported_files(&cli.file, &options.extensions)
        .with_context(|| format!("failed to list inputs under '{}'", cli.file.display()))?;
    if files.is_empty() {
        error!("{}", AuditError::NoInputFiles { path: cli.file.clone() });
        return Ok(None);
    }
    info!(count = files.len(), "inputs discovered");

    let converter = ExtensionRouter::new(DoclingCliConverter::new(
        options.docling_bin.clone(),
        options.work_dir.clone(),
    ));
    let audit = audit_files(&files, &converter, options.page_alignment);

    write_summary(std::io::stdout().lock(), &audit.results, options.preview_len)
        .context("failed to print summary")?;

    if !cli.summary_only {
        let written = save_results(&audit.results, &options.output)
            .with_context(|| format!("failed to save results to '{}'", options.output.display()))?;
        info!(path = %written.display(), files = audit.results.len(), "report written");
    }

    Ok(Some(audit))
}

fn init_tracing(timestamps: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("illuminator=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.timestamps);

    match run(&cli) {
        Ok(Some(audit)) if audit.failures.is_empty() => ExitCode::SUCCESS,
        Ok(Some(audit)) => {
            error!(failed = audit.failures.len(), "some files could not be processed");
            if audit.is_empty() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Ok(None) => ExitCode::from(2),
        Err(error) => {
            error!("{error:#}");
            ExitCode::from(1)
        }
    }
}
