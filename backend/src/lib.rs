//! # smsgen - outbound SMS message file generation
//!
//! smsgen turns a contact list and a set of spintax message templates into a
//! CSV of `phone,message` rows, one per valid phone number of every contact,
//! skipping numbers on a do-not-contact (DNC) list.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Contacts   │────▶│   Fields    │────▶│  Generator  │────▶│  Messages   │
//! │  Templates  │     │  Phone/DNC  │     │  (spintax)  │     │  CSV/parts  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use smsgen::{run, MessageGenerator, OutputWriter, RunRequest};
//!
//! let request = RunRequest::new("contacts.csv", "templates.csv").with_split("1000");
//! let report = run(&request, &mut MessageGenerator::from_entropy(), &OutputWriter::new("uploads"))?;
//! println!("{} created, {} blocked: {:?}", report.created_count, report.blocked_count, report.files);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`config`] - Runtime configuration
//! - [`parser`] - CSV decoding with auto-detection
//! - [`sources`] - DNC and template loaders
//! - [`generate`] - Phone rules, field resolution, spintax, generator
//! - [`output`] - Message file writer and splitter
//! - [`pipeline`] - File-level run
//! - [`api`] - HTTP API server and logging

// Core modules
pub mod config;
pub mod error;

// Parsing and loading
pub mod parser;
pub mod sources;

// Generation
pub mod generate;

// Output
pub mod output;
pub mod pipeline;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    GenerateError,
    OutputError,
    RequiredField,
    RunError,
    ServerError,
    SourceError,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::Config;

// =============================================================================
// Re-exports - Parsing and loading
// =============================================================================

pub use parser::{
    parse_contacts_file,
    parse_table,
    detect_delimiter,
    detect_encoding,
    ContactRow,
    ContactTable,
    RowError,
};

pub use sources::{load_dnc, load_templates, DncSet};

// =============================================================================
// Re-exports - Generation
// =============================================================================

pub use generate::{
    expand_spintax,
    is_valid_phone,
    normalize_phone,
    resolve_fields,
    FieldMap,
    GenerationResult,
    MessageGenerator,
    MessageRecord,
};

// =============================================================================
// Re-exports - Output and pipeline
// =============================================================================

pub use output::{parse_split_count, OutputWriter};

pub use pipeline::{run, RunReport, RunRequest};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, FileLink, GenerateResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, sanitize_filename, start_server};
}
