//! Message generation module.
//!
//! - Phone: normalization and validation
//! - Fields: column role resolution
//! - Spintax: random alternative expansion
//! - Generator: the per-contact, per-phone orchestrator

pub mod fields;
pub mod generator;
pub mod phone;
pub mod spintax;

pub use fields::{resolve_fields, FieldMap};
pub use generator::{GenerationResult, MessageGenerator, MessageRecord};
pub use phone::{is_header_token, is_valid_phone, normalize_phone};
pub use spintax::expand_spintax;
