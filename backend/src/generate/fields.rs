//! Column role resolution for contact tables.
//!
//! Matching is exact on the header literal; there is no fuzzy matching.

use crate::error::{GenerateError, GenerateResult, RequiredField};

pub const PHONE_COLUMNS: [&str; 3] = ["phone_1", "phone_2", "phone_3"];
pub const NAME_COLUMN: &str = "first_name";
pub const ADDRESS_COLUMN: &str = "associated_property_address_line_1";

/// Which columns hold phone numbers, the contact name and the address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    /// Phone columns in header order
    pub phone_columns: Vec<String>,
    pub name_column: Option<String>,
    pub address_column: Option<String>,
}

impl FieldMap {
    /// Identify the roles present in `headers` without checking completeness.
    pub fn identify(headers: &[String]) -> Self {
        let has = |name: &str| headers.iter().any(|h| h == name);

        Self {
            phone_columns: headers
                .iter()
                .filter(|h| PHONE_COLUMNS.contains(&h.as_str()))
                .cloned()
                .collect(),
            name_column: has(NAME_COLUMN).then(|| NAME_COLUMN.to_string()),
            address_column: has(ADDRESS_COLUMN).then(|| ADDRESS_COLUMN.to_string()),
        }
    }

    /// First missing role, checked phone -> name -> address.
    pub fn missing(&self) -> Option<RequiredField> {
        if self.phone_columns.is_empty() {
            Some(RequiredField::Phone)
        } else if self.name_column.is_none() {
            Some(RequiredField::Name)
        } else if self.address_column.is_none() {
            Some(RequiredField::Address)
        } else {
            None
        }
    }
}

/// Resolve the field map, failing if any role is unresolved.
pub fn resolve_fields(headers: &[String]) -> GenerateResult<FieldMap> {
    let map = FieldMap::identify(headers);
    match map.missing() {
        Some(which) => Err(GenerateError::MissingRequiredField { which }),
        None => Ok(map),
    }
}
