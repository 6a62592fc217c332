//! Pipeline orchestrator
//!
//! Wires a row source provider, the engine, the composer and the DOCX writer
//! into the two operations exposed to callers: header discovery and document
//! generation. A [`Pipeline`] is built once per process and only takes `&self`,
//! so it can be shared between concurrent requests.

use portaria_data::{header_from_rows, SheetId, SheetLayout, SourceProvider};
use portaria_ooxml::{DocxWriter, DOCX_MIME_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::composer::Composer;
use crate::engine::{Engine, EngineStats};
use crate::error::{ErrorPayload, PipelineError, Result, ShapeViolation};
use crate::request::{GenerationRequest, HeaderRequest};
use crate::template::DocumentTemplate;

/// Attachment filename used when none is configured
pub const DEFAULT_FILENAME: &str = "Portaria_CCM.docx";

/// A generated document ready to be returned or written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    /// Number of annexes in the document
    pub groups: usize,
    pub stats: EngineStats,
}

/// Header discovery result: `"index|name"` for every non-blank header cell
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnListing {
    pub columns: Vec<String>,
}

/// Request orchestrator
pub struct Pipeline {
    provider: Box<dyn SourceProvider>,
    template: DocumentTemplate,
    layout: SheetLayout,
    base_template: Option<Vec<u8>>,
    filename: String,
}

impl Pipeline {
    pub fn new(
        provider: Box<dyn SourceProvider>,
        template: DocumentTemplate,
        layout: SheetLayout,
    ) -> Self {
        Self {
            provider,
            template,
            layout,
            base_template: None,
            filename: DEFAULT_FILENAME.to_string(),
        }
    }

    /// Render into this DOCX/DOTX instead of a blank package
    pub fn with_base_template(mut self, bytes: Vec<u8>) -> Self {
        self.base_template = Some(bytes);
        self
    }

    /// Attachment filename of generated documents
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn template(&self) -> &DocumentTemplate {
        &self.template
    }

    pub fn layout(&self) -> &SheetLayout {
        &self.layout
    }

    /// Generate a document, mapping any failure to an [`ErrorPayload`]
    pub fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GeneratedDocument, ErrorPayload> {
        self.try_generate(request).map_err(|err| {
            warn!(kind = err.kind(), status = err.status(), "Generation failed: {}", err);
            err.to_payload()
        })
    }

    /// List header columns, mapping any failure to an [`ErrorPayload`]
    pub fn columns(
        &self,
        request: &HeaderRequest,
    ) -> std::result::Result<ColumnListing, ErrorPayload> {
        self.try_columns(request).map_err(|err| {
            warn!(kind = err.kind(), status = err.status(), "Header discovery failed: {}", err);
            err.to_payload()
        })
    }

    /// Generate a document
    pub fn try_generate(&self, request: &GenerationRequest) -> Result<GeneratedDocument> {
        let parsed = request.parse()?;
        info!(
            tab = %parsed.tab,
            group_column = parsed.group.index(),
            exclusion_terms = parsed.filter.terms().len(),
            removed_columns = parsed.removed.len(),
            "Generating portaria"
        );

        let sheet = self.sheet_id(&parsed.link)?;
        let source = self.provider.open(&sheet, &parsed.tab)?;
        let rows = source.fetch_all()?;
        debug!(rows = rows.len(), "Fetched sheet rows");

        if rows.len() < self.layout.header_row as usize {
            return Err(ShapeViolation::SheetTooShort {
                rows: rows.len(),
                header_row: self.layout.header_row,
            }
            .into());
        }
        let header = header_from_rows(&rows, &self.layout)?;
        let data = &rows[self.layout.data_offset().min(rows.len())..];

        let engine = Engine::new(parsed.filter, parsed.removed, parsed.group);
        let output = engine.run(&header, data)?;

        let doc = Composer::new(&self.template).compose(&output.columns, &output.groups)?;
        let bytes = match &self.base_template {
            Some(base) => DocxWriter::generate_with_template(&doc, base)?,
            None => DocxWriter::generate(&doc)?,
        };

        info!(
            bytes = bytes.len(),
            annexes = output.groups.len(),
            rows = output.stats.kept,
            "Generated portaria"
        );

        Ok(GeneratedDocument {
            bytes,
            filename: self.filename.clone(),
            content_type: DOCX_MIME_TYPE.to_string(),
            groups: output.groups.len(),
            stats: output.stats,
        })
    }

    /// List header columns
    pub fn try_columns(&self, request: &HeaderRequest) -> Result<ColumnListing> {
        let (link, tab) = request.parse()?;
        let sheet = self.sheet_id(&link)?;
        let source = self.provider.open(&sheet, &tab)?;
        let header = source.fetch_header()?;

        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                let name = name.trim();
                (!name.is_empty()).then(|| format!("{}|{}", i, name))
            })
            .collect();
        debug!(tab = %tab, columns = columns.len(), "Listed header columns");

        Ok(ColumnListing { columns })
    }

    fn sheet_id(&self, link: &str) -> Result<SheetId> {
        self.provider.sheet_id(link).ok_or_else(|| {
            PipelineError::InputValidation(format!("Cannot read a spreadsheet id from '{}'", link))
        })
    }
}
