//! Do-not-contact list loading.
//!
//! Loading is best-effort: a missing or unreadable file never aborts a run.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::api::logs::{log_error, log_warning};
use crate::error::SourceError;
use crate::generate::phone::{is_header_token, normalize_phone};

/// Normalized phone numbers that must not be messaged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DncSet {
    numbers: HashSet<String>,
}

impl DncSet {
    /// Add a raw number. Empty and header-like values are ignored.
    pub fn insert(&mut self, raw: &str) -> bool {
        let phone = normalize_phone(raw);
        if phone.is_empty() || is_header_token(&phone) {
            return false;
        }
        self.numbers.insert(phone)
    }

    /// Exact match on an already normalized number.
    pub fn contains(&self, normalized: &str) -> bool {
        self.numbers.contains(normalized)
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for DncSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = DncSet::default();
        for raw in iter {
            set.insert(raw.as_ref());
        }
        set
    }
}

/// Load the DNC set from the first column of a UTF-8 CSV file.
///
/// No path gives an empty set. A missing file logs a warning and gives an
/// empty set; any other error logs it and keeps what was read so far.
pub fn load_dnc(path: Option<&Path>) -> DncSet {
    let mut set = DncSet::default();
    let Some(path) = path else {
        return set;
    };

    let file = match File::open(path).map_err(|e| SourceError::from_io(path, e)) {
        Ok(file) => file,
        Err(SourceError::NotFound(p)) => {
            log_warning(format!("DNC file '{}' not found, continuing without it", p.display()));
            return set;
        }
        Err(e) => {
            log_error(format!("Error processing DNC file: {}", e));
            return set;
        }
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    for result in reader.records() {
        match result {
            Ok(record) => {
                if let Some(first) = record.get(0) {
                    set.insert(first);
                }
            }
            Err(e) => {
                log_error(format!("Error processing DNC file: {}", e));
                break;
            }
        }
    }

    set
}
