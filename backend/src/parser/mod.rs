//! CSV reading with encoding and delimiter auto-detection.
//!
//! Turns raw input files into decoded text and tabular rows.
//! No message-generation logic here.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::api::logs::log_warning;
use crate::error::{SourceError, SourceResult};

/// One contact record: column name -> cell value.
pub type ContactRow = HashMap<String, String>;

/// A malformed contact cell, with context
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => {
                write!(f, "Line {}, column '{}' (value '{}'): {}", self.line, col, val, self.message)
            }
            (Some(col), None) => {
                write!(f, "Line {}, column '{}': {}", self.line, col, self.message)
            }
            _ => {
                write!(f, "Line {}: {}", self.line, self.message)
            }
        }
    }
}

impl RowError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Parsed contacts table with metadata
#[derive(Debug, Clone, Default)]
pub struct ContactTable {
    /// Column headers, in file order
    pub headers: Vec<String>,
    /// Data rows keyed by header
    pub rows: Vec<ContactRow>,
    /// Cells dropped as malformed (undecodable, or beyond the header row)
    pub skipped: Vec<RowError>,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
}

impl ContactTable {
    /// Build a table from headers and rows of cells, in file order.
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|cells| {
                let cells: Vec<String> = cells.into_iter().map(Into::into).collect();
                row_from_cells(&headers, &cells)
            })
            .collect();

        Self {
            headers,
            rows,
            skipped: Vec::new(),
            encoding: "utf-8".to_string(),
            delimiter: ',',
        }
    }

    /// Number of distinct rows with at least one dropped cell.
    pub fn skipped_rows(&self) -> usize {
        self.skipped.iter().map(|e| e.line).collect::<HashSet<_>>().len()
    }
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is always UTF-8; chardet only guesses for other bytes.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8. A leading BOM is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let decoded = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to `,` when none of the candidates appear.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Read a file and decode it with the detected encoding.
///
/// Returns the decoded text and the encoding name.
pub fn read_text<P: AsRef<Path>>(path: P) -> SourceResult<(String, String)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| SourceError::from_io(path, e))?;
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);
    Ok((content, encoding))
}

/// Headerless, ragged-row CSV reader over decoded text.
pub fn cell_reader(content: &str, delimiter: char) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(content.as_bytes())
}

/// Parse a table with a header row.
///
/// Each row becomes a map keyed by header. Missing trailing cells are
/// empty strings. Malformed cells are dropped from their row and recorded
/// in `skipped`: cells holding undecodable characters are left empty and
/// cells beyond the header row are ignored. Rows the reader rejects are
/// recorded too and parsing continues.
pub fn parse_table(content: &str, delimiter: char) -> SourceResult<ContactTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter as u8)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut skipped = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let line_num = idx + 2; // +1 for 0-index, +1 for header

        match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line() as usize).unwrap_or(line_num);
                let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
                skipped.extend(drop_malformed_cells(&headers, &mut cells, line));
                rows.push(row_from_cells(&headers, &cells));
            }
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(line_num);
                skipped.push(RowError::new(line, e.to_string()));
            }
        }
    }

    Ok(ContactTable {
        headers,
        rows,
        skipped,
        encoding: "utf-8".to_string(),
        delimiter,
    })
}

/// Parse a contacts file with auto-detection of encoding and delimiter.
pub fn parse_contacts_file<P: AsRef<Path>>(path: P) -> SourceResult<ContactTable> {
    let (content, encoding) = read_text(path)?;
    let delimiter = detect_delimiter(&content);
    let mut table = parse_table(&content, delimiter)?;
    table.encoding = encoding;

    for row_error in &table.skipped {
        log_warning(format!("Skipping malformed contact cell: {}", row_error));
    }

    Ok(table)
}

/// Blank undecodable cells and report them, plus any cells past the header.
fn drop_malformed_cells(headers: &[String], cells: &mut [String], line: usize) -> Vec<RowError> {
    let mut errors = Vec::new();

    for (header, cell) in headers.iter().zip(cells.iter_mut()) {
        if cell.contains(char::REPLACEMENT_CHARACTER) {
            errors.push(
                RowError::new(line, "undecodable characters, cell left empty")
                    .with_column(header.as_str())
                    .with_value(cell.as_str()),
            );
            cell.clear();
        }
    }

    if cells.len() > headers.len() {
        let extra = cells.len() - headers.len();
        errors.push(
            RowError::new(line, format!("{} cell(s) beyond the header row ignored", extra))
                .with_column(format!("#{}", headers.len() + 1))
                .with_value(cells[headers.len()].as_str()),
        );
    }

    errors
}

fn row_from_cells(headers: &[String], cells: &[String]) -> ContactRow {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| (header.clone(), cells.get(i).cloned().unwrap_or_default()))
        .collect()
}
