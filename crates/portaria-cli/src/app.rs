//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use portaria_core::{DocumentTemplate, GenerationRequest, HeaderRequest, Pipeline};
use portaria_data::{CsvProvider, ExcelProvider, GoogleSheetsProvider, SourceProvider};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::{Settings, SourceKind};

#[derive(Parser)]
#[command(name = "portaria")]
#[command(author, version, about = "Spreadsheet rows in, portaria document out", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// Settings file (defaults to ./portaria.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Read rows from a local CSV file instead of Google Sheets
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "xlsx")]
    pub csv: Option<PathBuf>,

    /// Read rows from a local Excel workbook (the tab names the worksheet)
    #[arg(long, global = true, value_name = "PATH")]
    pub xlsx: Option<PathBuf>,

    /// Document template TOML, replacing the [document] settings section
    #[arg(long, global = true, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// 1-indexed row holding the column names
    #[arg(long, global = true, value_name = "ROW")]
    pub header_row: Option<u32>,
}

impl GlobalArgs {
    /// Source kind and the file path standing in for the link, if any
    fn source_override(&self) -> Option<(SourceKind, &Path)> {
        if let Some(path) = &self.csv {
            Some((SourceKind::Csv, path.as_path()))
        } else {
            self.xlsx.as_deref().map(|path| (SourceKind::Xlsx, path))
        }
    }

    /// Link given on the command line, falling back to the local file path
    fn resolve_link(&self, link: Option<String>) -> String {
        link.or_else(|| {
            self.source_override()
                .map(|(_, path)| path.display().to_string())
        })
        .unwrap_or_default()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the header columns of a sheet tab as index|name
    Columns {
        /// Spreadsheet link or id
        #[arg(short, long)]
        link: Option<String>,

        /// Tab (worksheet) name
        #[arg(short, long)]
        tab: String,

        /// Print a JSON object instead of one column per line
        #[arg(long)]
        json: bool,
    },

    /// Generate the portaria DOCX
    Generate {
        /// Spreadsheet link or id
        #[arg(short, long)]
        link: Option<String>,

        /// Tab (worksheet) name
        #[arg(short, long)]
        tab: String,

        /// Grouping column letter (A, B, ..., AA)
        #[arg(short, long)]
        group: String,

        /// Comma-separated exclusion terms
        #[arg(short, long)]
        exclude: Option<String>,

        /// Comma-separated 0-based column indices to drop
        #[arg(short, long)]
        remove: Option<String>,

        /// Output file or directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// DOCX/DOTX whose styles, headers and footers are reused
        #[arg(long, value_name = "PATH")]
        base_template: Option<PathBuf>,
    },

    /// Write the default document template as TOML
    InitTemplate {
        /// Output file (stdout when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Columns { link, tab, json } => {
            let settings = load_settings(&global)?;
            let pipeline = build_pipeline(&settings)?;
            let request = HeaderRequest {
                link: global.resolve_link(link),
                tab,
            };
            columns_command(&pipeline, &request, json, &mut io::stdout().lock())?;
        }
        Commands::Generate {
            link,
            tab,
            group,
            exclude,
            remove,
            output,
            base_template,
        } => {
            let mut settings = load_settings(&global)?;
            if base_template.is_some() {
                settings.output.base_template = base_template;
            }
            let pipeline = build_pipeline(&settings)?;
            let request = GenerationRequest {
                link: global.resolve_link(link),
                tab,
                group_column: group,
                exclusion_terms: exclude,
                removed_columns: remove,
            };
            let target = output_path(output.as_deref(), &settings.output.filename);
            let written = generate_command(&pipeline, &request, &target)?;
            println!("{}", written.display());
        }
        Commands::InitTemplate { output, force } => {
            init_template_command(output.as_deref(), force, &mut io::stdout().lock())?;
        }
    }

    Ok(())
}

/// Settings file plus command-line overrides
pub fn load_settings(global: &GlobalArgs) -> Result<Settings> {
    let mut settings = Settings::load(global.config.as_deref())?;

    if let Some(path) = &global.template {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?;
        settings.document = DocumentTemplate::from_toml(&content)
            .with_context(|| format!("Invalid template: {}", path.display()))?;
    }
    if let Some(row) = global.header_row {
        settings.layout.header_row = row;
    }
    if let Some((kind, _)) = global.source_override() {
        settings.source.kind = kind;
    }

    settings
        .layout
        .validate()
        .context("Invalid sheet layout")?;
    Ok(settings)
}

/// Build the row source provider selected by the settings
pub fn build_provider(settings: &Settings) -> Result<Box<dyn SourceProvider>> {
    let layout = settings.layout.clone();
    let provider: Box<dyn SourceProvider> = match settings.source.kind {
        SourceKind::Google => {
            let config = settings.source.sheets_config(&layout);
            Box::new(
                GoogleSheetsProvider::new(config).context("Failed to create Sheets client")?,
            )
        }
        SourceKind::Csv => Box::new(CsvProvider::new(layout)),
        SourceKind::Xlsx => Box::new(ExcelProvider::new(layout)),
    };
    debug!(kind = ?settings.source.kind, "Selected row source");
    Ok(provider)
}

/// Build the pipeline for a run
pub fn build_pipeline(settings: &Settings) -> Result<Pipeline> {
    let provider = build_provider(settings)?;
    let mut pipeline = Pipeline::new(
        provider,
        settings.document.clone(),
        settings.layout.clone(),
    )
    .with_filename(settings.output.filename.clone());

    if let Some(path) = &settings.output.base_template {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read base template: {}", path.display()))?;
        info!(path = %path.display(), "Using base template");
        pipeline = pipeline.with_base_template(bytes);
    }

    Ok(pipeline)
}

/// Print the header columns of a tab
///
/// Failures surface as an `ErrorPayload` inside the returned error.
pub fn columns_command(
    pipeline: &Pipeline,
    request: &HeaderRequest,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let listing = pipeline.columns(request)?;

    if json {
        serde_json::to_writer(&mut *out, &listing).context("Failed to serialize columns")?;
        writeln!(out)?;
    } else {
        for column in &listing.columns {
            writeln!(out, "{}", column)?;
        }
    }
    Ok(())
}

/// Generate the document and write it to `output`
///
/// Returns the written path. Failures surface as an `ErrorPayload` inside the
/// returned error and leave no file behind.
pub fn generate_command(
    pipeline: &Pipeline,
    request: &GenerationRequest,
    output: &Path,
) -> Result<PathBuf> {
    let doc = pipeline.generate(request)?;

    write_atomic(output, &doc.bytes)?;
    info!(
        path = %output.display(),
        annexes = doc.groups,
        rows = doc.stats.kept,
        excluded = doc.stats.excluded,
        "Wrote portaria"
    );
    Ok(output.to_path_buf())
}

/// Export the default document template
pub fn init_template_command(output: Option<&Path>, force: bool, out: &mut impl Write) -> Result<()> {
    let toml = DocumentTemplate::default()
        .to_toml()
        .context("Failed to serialize the default template")?;

    match output {
        Some(path) => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            write_atomic(path, toml.as_bytes())?;
            writeln!(out, "{}", path.display())?;
        }
        None => out.write_all(toml.as_bytes())?,
    }
    Ok(())
}

/// Output file for `--output`: a directory gets the configured file name
pub fn output_path(output: Option<&Path>, filename: &str) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(filename),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(filename),
    }
}

/// Write through a temporary file in the target directory, then rename
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
