//! Input loaders for the DNC list and message templates.
//!
//! Contacts are read by [`crate::parser::parse_contacts_file`].

pub mod dnc;
pub mod templates;

pub use dnc::{load_dnc, DncSet};
pub use templates::load_templates;
