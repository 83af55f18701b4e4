//! REST API types.
//!
//! Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::pipeline::RunReport;

/// Response sent after a successful generation run.
///
/// Counts are always present, including when nothing was created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready" when messages were created, "empty" otherwise
    pub status: String,

    /// Generated files, each downloadable from `/api/download/{name}`
    pub files: Vec<FileLink>,

    pub messages_created: usize,

    pub messages_blocked: usize,

    /// Whether the output was split into parts
    pub split: bool,

    /// Contact rows skipped as unparseable
    pub skipped_rows: usize,
}

/// A generated file and where to fetch it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLink {
    pub name: String,
    pub url: String,
}

impl FileLink {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let url = format!("/api/download/{}", name);
        Self { name, url }
    }
}

impl From<RunReport> for GenerateResponse {
    fn from(report: RunReport) -> Self {
        GenerateResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if report.created_count > 0 { "ready" } else { "empty" }.to_string(),
            files: report.files.into_iter().map(FileLink::new).collect(),
            messages_created: report.created_count,
            messages_blocked: report.blocked_count,
            split: report.split,
            skipped_rows: report.skipped_rows,
        }
    }
}

/// Create an error response. No file was produced.
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "files": [],
        "messagesCreated": 0,
        "messagesBlocked": 0
    })
}
