//! Generated message files: writing and splitting.
//!
//! File names depend only on the calendar date, so a second run on the same
//! day overwrites the first one. Concurrent same-day runs race on the same
//! name and the last writer wins.

use chrono::{Local, NaiveDate};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::error::{OutputError, OutputResult};
use crate::generate::phone::{is_header_token, normalize_phone};
use crate::generate::MessageRecord;

const DATE_FORMAT: &str = "%m-%d-%Y";

/// Parse a messages-per-file value. Only positive integers are accepted.
pub fn parse_split_count(raw: &str) -> OutputResult<NonZeroUsize> {
    raw.trim()
        .parse::<NonZeroUsize>()
        .map_err(|_| OutputError::InvalidSplitCount(raw.to_string()))
}

/// Writes message files into a directory, named by date.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    date: NaiveDate,
}

impl OutputWriter {
    /// Writer for today's local date.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_date(dir, Local::now().date_naive())
    }

    pub fn with_date(dir: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self { dir: dir.into(), date }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `MM-DD-YYYY-Messages.csv`
    pub fn messages_file_name(&self) -> String {
        format!("{}-Messages.csv", self.date.format(DATE_FORMAT))
    }

    /// `MM-DD-YYYY-Messages-Part-N.csv`, `part` is 1-based
    pub fn part_file_name(&self, part: usize) -> String {
        format!("{}-Messages-Part-{}.csv", self.date.format(DATE_FORMAT), part)
    }

    /// Write one `phone,message` row per record and return the file name.
    ///
    /// Records whose phone looks like a header are skipped.
    pub fn write_output(&self, records: &[MessageRecord]) -> OutputResult<String> {
        fs::create_dir_all(&self.dir)?;
        let file_name = self.messages_file_name();
        let mut writer = csv_writer(&self.dir.join(&file_name))?;

        for record in records {
            if is_header_token(&record.phone) {
                continue;
            }
            writer.write_record([normalize_phone(&record.phone).as_str(), record.message.as_str()])?;
        }
        writer.flush()?;

        Ok(file_name)
    }

    /// Split a message file into parts of at most `per_file` rows, written
    /// into this writer's directory.
    ///
    /// Parts are contiguous slices in original order. An empty input file
    /// produces no parts.
    pub fn split_output(&self, source: impl AsRef<Path>, per_file: NonZeroUsize) -> OutputResult<Vec<String>> {
        let rows = read_rows(source.as_ref())?;
        if !rows.is_empty() {
            fs::create_dir_all(&self.dir)?;
        }
        let per_file = per_file.get();
        let num_files = rows.len().div_ceil(per_file);

        let mut files = Vec::with_capacity(num_files);
        for (i, chunk) in rows.chunks(per_file).enumerate() {
            let part_name = self.part_file_name(i + 1);
            let mut writer = csv_writer(&self.dir.join(&part_name))?;
            for row in chunk {
                writer.write_record(row)?;
            }
            writer.flush()?;
            files.push(part_name);
        }

        Ok(files)
    }
}

fn csv_writer(path: &Path) -> OutputResult<csv::Writer<fs::File>> {
    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::CRLF)
        .from_path(path)?)
}

/// Every row of a message file except header-like ones.
fn read_rows(path: &Path) -> OutputResult<Vec<csv::StringRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.get(0).is_some_and(is_header_token) {
            continue;
        }
        rows.push(record);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writer(dir: &Path) -> OutputWriter {
        OutputWriter::with_date(dir, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap())
    }

    fn records(n: usize) -> Vec<MessageRecord> {
        (0..n)
            .map(|i| MessageRecord {
                phone: format!("555{:07}", i),
                message: format!("Message {}", i),
            })
            .collect()
    }

    fn read_back(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_file_names_use_date() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());
        assert_eq!(w.messages_file_name(), "03-07-2024-Messages.csv");
        assert_eq!(w.part_file_name(2), "03-07-2024-Messages-Part-2.csv");
    }

    #[test]
    fn test_write_output_rows() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());
        let mut recs = records(2);
        recs.push(MessageRecord {
            phone: "Phone".into(),
            message: "stray header".into(),
        });
        recs.push(MessageRecord {
            phone: "5550000009".into(),
            message: "Hi Jo, \"quoted\" text".into(),
        });

        let name = w.write_output(&recs).unwrap();
        let rows = read_back(&dir.path().join(&name));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["5550000000", "Message 0"]);
        assert_eq!(rows[2], vec!["5550000009", "Hi Jo, \"quoted\" text"]);
    }

    #[test]
    fn test_minimal_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());
        let recs = vec![
            MessageRecord { phone: "5551234567".into(), message: "plain".into() },
            MessageRecord { phone: "5557654321".into(), message: "a, b".into() },
        ];

        let name = w.write_output(&recs).unwrap();
        let raw = fs::read_to_string(dir.path().join(name)).unwrap();

        assert_eq!(raw, "5551234567,plain\r\n5557654321,\"a, b\"\r\n");
    }

    #[test]
    fn test_same_day_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());

        let first = w.write_output(&records(5)).unwrap();
        let second = w.write_output(&records(2)).unwrap();

        assert_eq!(first, second);
        assert_eq!(read_back(&dir.path().join(second)).len(), 2);
    }

    #[test]
    fn test_split_2500_by_1000() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());
        let name = w.write_output(&records(2500)).unwrap();
        let original = read_back(&dir.path().join(&name));

        let parts = w.split_output(dir.path().join(&name), NonZeroUsize::new(1000).unwrap()).unwrap();

        assert_eq!(
            parts,
            vec![
                "03-07-2024-Messages-Part-1.csv",
                "03-07-2024-Messages-Part-2.csv",
                "03-07-2024-Messages-Part-3.csv",
            ]
        );
        let sizes: Vec<usize> = parts
            .iter()
            .map(|p| read_back(&dir.path().join(p)).len())
            .collect();
        assert_eq!(sizes, vec![1000, 1000, 500]);

        let joined: Vec<Vec<String>> = parts
            .iter()
            .flat_map(|p| read_back(&dir.path().join(p)))
            .collect();
        assert_eq!(joined, original);
    }

    #[test]
    fn test_split_exact_multiple_and_empty() {
        let dir = tempfile::tempdir().unwrap();
        let w = writer(dir.path());

        let name = w.write_output(&records(4)).unwrap();
        let parts = w.split_output(dir.path().join(&name), NonZeroUsize::new(2).unwrap()).unwrap();
        assert_eq!(parts.len(), 2);

        let name = w.write_output(&[]).unwrap();
        let parts = w.split_output(dir.path().join(&name), NonZeroUsize::new(2).unwrap()).unwrap();
        assert!(parts.is_empty());
    }

    #[test]
    fn test_split_skips_header_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.csv");
        fs::write(&path, "phone,message\n5551234567,hi\nNUMBER,x\n5557654321,yo\n").unwrap();

        let w = writer(dir.path());
        let parts = w.split_output(&path, NonZeroUsize::new(10).unwrap()).unwrap();

        assert_eq!(parts.len(), 1);
        assert_eq!(
            read_back(&dir.path().join(&parts[0])),
            vec![vec!["5551234567", "hi"], vec!["5557654321", "yo"]]
        );
    }

    #[test]
    fn test_split_into_another_directory() {
        let dir = tempfile::tempdir().unwrap();
        let source = writer(&dir.path().join("in"));
        let name = source.write_output(&records(3)).unwrap();

        let target = writer(&dir.path().join("parts"));
        let parts = target
            .split_output(source.dir().join(&name), NonZeroUsize::new(2).unwrap())
            .unwrap();

        assert_eq!(parts.len(), 2);
        assert!(dir.path().join("parts").join(&parts[0]).exists());
        assert!(!dir.path().join("in").join(&parts[0]).exists());
        assert_eq!(read_back(&dir.path().join("parts").join(&parts[1])).len(), 1);
    }

    #[test]
    fn test_parse_split_count() {
        assert_eq!(parse_split_count("1000").unwrap().get(), 1000);
        assert_eq!(parse_split_count(" 25 ").unwrap().get(), 25);
        assert!(matches!(parse_split_count("0"), Err(OutputError::InvalidSplitCount(_))));
        assert!(matches!(parse_split_count("-5"), Err(OutputError::InvalidSplitCount(_))));
        assert!(matches!(parse_split_count("ten"), Err(OutputError::InvalidSplitCount(_))));
        assert!(parse_split_count("").is_err());
    }
}
