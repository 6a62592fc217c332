//! portaria-core - spreadsheet rows in, portaria document out
//!
//! Core library for portaria: boundary parsing of requests, the filter and
//! grouping engine, the document composer and the pipeline that ties them to a
//! row source and the DOCX writer.
//!
//! # Example
//!
//! ```
//! use portaria_core::{DocumentTemplate, GenerationRequest, Pipeline};
//! use portaria_data::{MemoryProvider, SheetLayout};
//!
//! let provider = MemoryProvider::new().with_table(
//!     "planilha",
//!     "Dados",
//!     vec![
//!         vec!["PORTARIA"],
//!         vec![],
//!         vec![],
//!         vec!["Nome", "", "Escola", "Status"],
//!         vec!["Ana", "", "A", "FALSE"],
//!         vec!["Bia", "", "B", "ATIVO"],
//!     ],
//! );
//! let pipeline = Pipeline::new(
//!     Box::new(provider),
//!     DocumentTemplate::default(),
//!     SheetLayout::default(),
//! );
//!
//! let request = GenerationRequest {
//!     link: "planilha".into(),
//!     tab: "Dados".into(),
//!     group_column: "C".into(),
//!     exclusion_terms: Some("false".into()),
//!     removed_columns: Some("1".into()),
//! };
//! let doc = pipeline.generate(&request).unwrap();
//! assert_eq!(doc.groups, 1);
//! assert_eq!(doc.filename, "Portaria_CCM.docx");
//! ```

pub mod composer;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod request;
pub mod template;

// Re-export main types
pub use composer::Composer;
pub use engine::{ColumnSpec, Engine, EngineOutput, EngineStats, Group, Groups, DEFAULT_GROUP};
pub use error::{ErrorPayload, PipelineError, Result, ShapeViolation};
pub use pipeline::{ColumnListing, GeneratedDocument, Pipeline, DEFAULT_FILENAME};
pub use request::{
    FilterConfig, GenerationRequest, GroupColumn, HeaderRequest, ParsedRequest, RemovedColumns,
};
pub use template::{AnnexStyle, DocumentTemplate, PreambleBlock, RoleStyle, RoleStyles};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
