//! portaria CLI - Command-line interface library
//!
//! This library provides the CLI functionality for portaria:
//! - Columns: list the header columns of a sheet tab
//! - Generate: build the portaria DOCX from a sheet tab
//! - InitTemplate: export the default document template for editing
//!
//! # Binary Usage
//!
//! ```bash
//! # Discover the columns of a tab
//! portaria columns --link https://docs.google.com/spreadsheets/d/<id>/edit --tab Escolas
//!
//! # Generate, grouping by column C and dropping rows marked FALSE
//! portaria generate --link <id> --tab Escolas --group C --exclude false --remove 1
//!
//! # Same from a local CSV export
//! portaria --csv escolas.csv generate --tab Escolas --group C
//!
//! # Start a custom template
//! portaria init-template --output modelo.toml
//! portaria --template modelo.toml generate --link <id> --tab Escolas --group C
//! ```
//!
//! Failed runs print the JSON error payload (`{"error": ..., "status": ...}`)
//! on stderr and exit non-zero.

pub mod app;
pub mod config;

// Re-export main entry point and types
pub use app::{
    build_pipeline, build_provider, columns_command, generate_command, init_template_command,
    load_settings, output_path, run_cli, write_atomic, GlobalArgs,
};
pub use config::{OutputSettings, Settings, SourceKind, SourceSettings, DEFAULT_CONFIG_FILE};

/// Exit code for errors
///
/// Request validation failures (status 400) exit with 2, everything else with 1.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<portaria_core::ErrorPayload>() {
        Some(payload) if payload.status == 400 => 2,
        _ => 1,
    }
}

/// Report a failed run on stderr
///
/// Pipeline failures are printed as their JSON payload so callers can parse
/// them; other errors get the full context chain.
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<portaria_core::ErrorPayload>() {
        Some(payload) => match serde_json::to_string(payload) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("Error: {}", payload),
        },
        None => eprintln!("Error: {:#}", err),
    }
}
