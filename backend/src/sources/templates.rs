//! Message template loading.

use std::path::Path;

use crate::error::{GenerateError, GenerateResult, SourceError};
use crate::parser::{cell_reader, read_text};

/// Load every cell of every row as a template, in file order.
///
/// A missing file or a file with no cells is fatal for the run.
pub fn load_templates(path: &Path) -> GenerateResult<Vec<String>> {
    let (content, _) = read_text(path)?;

    let mut templates = Vec::new();
    let mut reader = cell_reader(&content, ',');
    for result in reader.records() {
        let record = result.map_err(SourceError::from)?;
        templates.extend(record.iter().map(str::to_string));
    }

    if templates.is_empty() {
        return Err(GenerateError::MissingTemplates);
    }

    Ok(templates)
}
