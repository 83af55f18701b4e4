//! File-level entry point: input files in, message files out.
//!
//! # Example
//!
//! ```rust,ignore
//! use smsgen::pipeline::{run, RunRequest};
//! use smsgen::{MessageGenerator, OutputWriter};
//!
//! let request = RunRequest::new("contacts.csv", "templates.csv").with_dnc("dnc.csv");
//! let report = run(&request, &mut MessageGenerator::from_entropy(), &OutputWriter::new("uploads"))?;
//! println!("{} created, {} blocked", report.created_count, report.blocked_count);
//! ```

use rand::Rng;
use std::path::PathBuf;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::error::{GenerateError, RunResult};
use crate::generate::{resolve_fields, MessageGenerator};
use crate::output::{parse_split_count, OutputWriter};
use crate::parser::parse_contacts_file;
use crate::sources::{load_dnc, load_templates};

/// Inputs of one generation run.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub contacts: PathBuf,
    pub templates: PathBuf,
    pub dnc: Option<PathBuf>,
    /// Raw messages-per-file value; `None` means no split
    pub messages_per_file: Option<String>,
}

impl RunRequest {
    pub fn new(contacts: impl Into<PathBuf>, templates: impl Into<PathBuf>) -> Self {
        Self {
            contacts: contacts.into(),
            templates: templates.into(),
            ..Default::default()
        }
    }

    pub fn with_dnc(mut self, dnc: impl Into<PathBuf>) -> Self {
        self.dnc = Some(dnc.into());
        self
    }

    pub fn with_split(mut self, messages_per_file: impl Into<String>) -> Self {
        self.messages_per_file = Some(messages_per_file.into());
        self
    }
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Output file names, relative to the writer's directory
    pub files: Vec<String>,
    pub created_count: usize,
    pub blocked_count: usize,
    /// Whether `files` are split parts
    pub split: bool,
    /// Contact rows with malformed cells dropped
    pub skipped_rows: usize,
}

/// Load inputs, generate messages, write them and optionally split.
///
/// Template and contacts problems abort the run before anything is
/// written. A bad messages-per-file value falls back to a single file.
pub fn run<R: Rng>(
    request: &RunRequest,
    generator: &mut MessageGenerator<R>,
    writer: &OutputWriter,
) -> RunResult<RunReport> {
    log_info("📝 Loading templates...");
    let templates = load_templates(&request.templates)?;
    log_success(format!("{} templates", templates.len()));

    log_info(format!("📖 Reading contacts: {}", request.contacts.display()));
    let contacts = parse_contacts_file(&request.contacts).map_err(GenerateError::from)?;
    log_success(format!(
        "Read {} rows (encoding: {}, delimiter: '{}')",
        contacts.rows.len(),
        contacts.encoding,
        format_delimiter(contacts.delimiter)
    ));
    let skipped_rows = contacts.skipped_rows();

    let fields = resolve_fields(&contacts.headers)?;
    log_info(format!("Phone columns: {}", fields.phone_columns.join(", ")));

    let dnc = load_dnc(request.dnc.as_deref());
    if request.dnc.is_some() {
        log_info(format!("🚫 {} DNC numbers loaded", dnc.len()));
    }

    log_info("⚙️  Generating messages...");
    let result = generator.generate(contacts, &templates, Some(&dnc))?;
    log_success(format!(
        "{} messages created, {} blocked",
        result.created_count, result.blocked_count
    ));

    let file_name = writer.write_output(&result.records)?;
    log_success(format!("💾 Written: {}", writer.dir().join(&file_name).display()));

    let mut files = vec![file_name.clone()];
    let mut split = false;

    if let Some(raw) = &request.messages_per_file {
        match parse_split_count(raw) {
            Ok(per_file) => {
                let parts = writer.split_output(writer.dir().join(&file_name), per_file)?;
                if parts.is_empty() {
                    log_warning("Nothing to split, keeping the single file");
                } else {
                    log_success(format!("✂️  Split into {} files of up to {}", parts.len(), per_file));
                    files = parts;
                    split = true;
                }
            }
            Err(e) => log_warning(format!("{}, keeping the single file", e)),
        }
    }

    Ok(RunReport {
        files,
        created_count: result.created_count,
        blocked_count: result.blocked_count,
        split,
        skipped_rows,
    })
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RequiredField, RunError};
    use chrono::NaiveDate;
    use std::fs;
    use std::path::Path;

    const CONTACTS: &str = "phone_1,phone_2,first_name,associated_property_address_line_1\n\
        5551234567,abc,Jo,1 Main St\n";

    fn writer(dir: &Path) -> OutputWriter {
        OutputWriter::with_date(dir.join("out"), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_end_to_end_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let request = RunRequest::new(
            write(dir.path(), "contacts.csv", CONTACTS),
            write(dir.path(), "templates.csv", "Hi {name} at {address}\n"),
        );
        let w = writer(dir.path());

        let report = run(&request, &mut MessageGenerator::seeded(1), &w).unwrap();

        assert_eq!(report.files, vec!["01-02-2024-Messages.csv"]);
        assert_eq!(report.created_count, 1);
        assert_eq!(report.blocked_count, 0);
        assert!(!report.split);

        let raw = fs::read_to_string(w.dir().join(&report.files[0])).unwrap();
        assert_eq!(raw, "5551234567,Hi Jo at 1 Main St\r\n");
    }

    #[test]
    fn test_utf8_punctuation_survives_substitution() {
        let dir = tempfile::tempdir().unwrap();
        let request = RunRequest::new(
            write(
                dir.path(),
                "contacts.csv",
                "phone_1,first_name,associated_property_address_line_1\n5551234567,Jo,12 O\u{2019}Brien Rd",
            ),
            write(dir.path(), "templates.csv", "About {address}\n"),
        );
        let w = writer(dir.path());

        let report = run(&request, &mut MessageGenerator::seeded(1), &w).unwrap();

        let raw = fs::read_to_string(w.dir().join(&report.files[0])).unwrap();
        assert_eq!(raw, "5551234567,About 12 O\u{2019}Brien Rd\r\n");
    }

    #[test]
    fn test_malformed_cells_are_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let request = RunRequest::new(
            write(
                dir.path(),
                "contacts.csv",
                "phone_1,first_name,associated_property_address_line_1\n\
                 5551234567,Jo,1 Main St,stray\n\
                 5557654321,Al,2 Oak Ave\n",
            ),
            write(dir.path(), "templates.csv", "Hi {name}\n"),
        );

        let report = run(&request, &mut MessageGenerator::seeded(2), &writer(dir.path())).unwrap();

        assert_eq!(report.skipped_rows, 1);
        assert_eq!(report.created_count, 2);
    }

    #[test]
    fn test_dnc_blocks_and_reports_zero_created() {
        let dir = tempfile::tempdir().unwrap();
        let request = RunRequest::new(
            write(dir.path(), "contacts.csv", CONTACTS),
            write(dir.path(), "templates.csv", "Hi\n"),
        )
        .with_dnc(write(dir.path(), "dnc.csv", "phone\n555-123-4567\n"));

        let report = run(&request, &mut MessageGenerator::seeded(2), &writer(dir.path())).unwrap();

        assert_eq!(report.created_count, 0);
        assert_eq!(report.blocked_count, 1);
        assert_eq!(report.files.len(), 1);
    }

    #[test]
    fn test_missing_dnc_file_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let request = RunRequest::new(
            write(dir.path(), "contacts.csv", CONTACTS),
            write(dir.path(), "templates.csv", "Hi\n"),
        )
        .with_dnc(dir.path().join("nope.csv"));

        let report = run(&request, &mut MessageGenerator::seeded(3), &writer(dir.path())).unwrap();
        assert_eq!(report.created_count, 1);
    }

    #[test]
    fn test_split_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut contacts = String::from("phone_1,first_name,associated_property_address_line_1\n");
        for i in 0..25 {
            contacts.push_str(&format!("555000{:04},N{},{} Main St\n", i, i, i));
        }
        let contacts = write(dir.path(), "contacts.csv", &contacts);
        let templates = write(dir.path(), "templates.csv", "Hi {name}\n");
        let w = writer(dir.path());

        let request = RunRequest::new(&contacts, &templates).with_split("10");
        let report = run(&request, &mut MessageGenerator::seeded(4), &w).unwrap();
        assert!(report.split);
        assert_eq!(report.files.len(), 3);

        let request = RunRequest::new(&contacts, &templates).with_split("zero");
        let report = run(&request, &mut MessageGenerator::seeded(4), &w).unwrap();
        assert!(!report.split);
        assert_eq!(report.files, vec!["01-02-2024-Messages.csv"]);
    }

    #[test]
    fn test_missing_templates_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let request = RunRequest::new(
            write(dir.path(), "contacts.csv", CONTACTS),
            write(dir.path(), "templates.csv", ""),
        );
        let w = writer(dir.path());

        let err = run(&request, &mut MessageGenerator::seeded(5), &w).unwrap_err();

        assert!(matches!(err, RunError::Generate(GenerateError::MissingTemplates)));
        assert!(!w.dir().exists());
    }

    #[test]
    fn test_missing_field_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let request = RunRequest::new(
            write(dir.path(), "contacts.csv", "phone_1,first_name\n5551234567,Jo\n"),
            write(dir.path(), "templates.csv", "Hi\n"),
        );

        let err = run(&request, &mut MessageGenerator::seeded(6), &writer(dir.path())).unwrap_err();

        assert!(matches!(
            err,
            RunError::Generate(GenerateError::MissingRequiredField { which: RequiredField::Address })
        ));
    }

    #[test]
    fn test_missing_contacts_file() {
        let dir = tempfile::tempdir().unwrap();
        let request = RunRequest::new(
            dir.path().join("contacts.csv"),
            write(dir.path(), "templates.csv", "Hi\n"),
        );

        let err = run(&request, &mut MessageGenerator::seeded(7), &writer(dir.path())).unwrap_err();
        assert!(matches!(err, RunError::Generate(GenerateError::SourceNotFound(_))));
    }
}
