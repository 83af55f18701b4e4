//! Runtime configuration for the CLI and HTTP layer.
//!
//! Built once at startup from the environment (after `.env` is loaded)
//! and passed down explicitly. The generation core takes no configuration.

use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MESSAGES_PER_FILE: usize = 1000;
pub const DEFAULT_PORT: u16 = 3000;

/// Boundary layer settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Where uploads are saved and generated files are written
    pub upload_dir: PathBuf,
    /// Lowercase file extensions accepted for uploads
    pub allowed_extensions: Vec<String>,
    /// Split size used when a request asks to split without a valid count
    pub default_messages_per_file: usize,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            allowed_extensions: vec!["csv".to_string()],
            default_messages_per_file: DEFAULT_MESSAGES_PER_FILE,
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Read `SMSGEN_UPLOAD_DIR`, `SMSGEN_ALLOWED_EXTENSIONS` (comma separated),
    /// `SMSGEN_MESSAGES_PER_FILE` and `SMSGEN_PORT`. Unset or unparseable
    /// values keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("SMSGEN_UPLOAD_DIR") {
            if !dir.trim().is_empty() {
                config.upload_dir = PathBuf::from(dir);
            }
        }

        if let Ok(exts) = env::var("SMSGEN_ALLOWED_EXTENSIONS") {
            let exts = parse_extensions(&exts);
            if !exts.is_empty() {
                config.allowed_extensions = exts;
            }
        }

        if let Some(n) = env::var("SMSGEN_MESSAGES_PER_FILE")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
        {
            config.default_messages_per_file = n;
        }

        if let Some(port) = env::var("SMSGEN_PORT").ok().and_then(|v| v.trim().parse().ok()) {
            config.port = port;
        }

        config
    }

    /// Whether an uploaded file name has an allowed extension.
    pub fn allowed_file(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .is_some_and(|e| self.allowed_extensions.contains(&e))
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.default_messages_per_file, 1000);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_allowed_file() {
        let config = Config::default();
        assert!(config.allowed_file("contacts.csv"));
        assert!(config.allowed_file("Contacts.CSV"));
        assert!(!config.allowed_file("contacts.xlsx"));
        assert!(!config.allowed_file("csv"));
        assert!(!config.allowed_file(""));
    }

    #[test]
    fn test_parse_extensions() {
        assert_eq!(parse_extensions("csv, .TXT,,tsv"), vec!["csv", "txt", "tsv"]);
    }
}
