//! HTTP Server for the smsgen API.
//!
//! Thin upload/download layer over [`crate::pipeline::run`]. Uploads are
//! saved into the configured upload directory, generated files are written
//! next to them and served back by name.
//!
//! # API Endpoints
//!
//! | Method | Path                        | Description                          |
//! |--------|-----------------------------|--------------------------------------|
//! | GET    | `/health`                   | Health check                         |
//! | POST   | `/api/generate`             | Upload contacts/templates/DNC, generate |
//! | GET    | `/api/download/{filename}`  | Download a generated file            |
//! | GET    | `/api/logs`                 | SSE stream for real-time logs        |

use axum::{
    extract::{Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, GenerateResponse};
use crate::config::Config;
use crate::error::{ServerError, ServerResult};
use crate::generate::MessageGenerator;
use crate::output::OutputWriter;
use crate::pipeline::{run, RunRequest};

type ApiError = (StatusCode, Json<Value>);

/// Build the application router.
pub fn router(config: Arc<Config>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/generate", post(generate))
        .route("/api/download/{filename}", get(download))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(config)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 smsgen server running on http://localhost:{}", config.port);
    println!("   POST /api/generate            - Upload contacts + templates (+ DNC)");
    println!("   GET  /api/download/{{file}}     - Download a generated file");
    println!("   GET  /api/logs                - SSE log stream");
    println!("   GET  /health                  - Health check");
    println!();
    println!("📁 Upload directory: {}", config.upload_dir.display());

    let app = router(Arc::new(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "smsgen",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "generate": "POST /api/generate",
            "download": "GET /api/download/{filename}",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// An uploaded file part
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// Everything the generate form can send
#[derive(Default)]
struct GenerateForm {
    contacts: Option<Upload>,
    templates: Option<Upload>,
    dnc: Option<Upload>,
    split: bool,
    messages_per_file: Option<String>,
}

/// Generate endpoint
async fn generate(
    State(config): State<Arc<Config>>,
    multipart: Multipart,
) -> Result<Json<GenerateResponse>, ApiError> {
    let form = read_form(multipart).await.map_err(reject)?;

    let request = save_uploads(&config, form).await.map_err(reject)?;

    println!("\n{}", "=".repeat(70));
    println!("📄 NEW RUN: {} + {}", request.contacts.display(), request.templates.display());
    println!("{}\n", "=".repeat(70));

    let upload_dir = config.upload_dir.clone();
    let report = tokio::task::spawn_blocking(move || {
        let writer = OutputWriter::new(upload_dir);
        run(&request, &mut MessageGenerator::from_entropy(), &writer)
    })
    .await
    .map_err(|e| reject(ServerError::Internal(e.to_string())))?
    .map_err(|e| reject(e.into()))?;

    Ok(Json(GenerateResponse::from(report)))
}

async fn read_form(mut multipart: Multipart) -> ServerResult<GenerateForm> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "contacts" | "templates" | "dnc" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec();
                if file_name.is_empty() {
                    continue;
                }
                let upload = Some(Upload { file_name, bytes });
                match name.as_str() {
                    "contacts" => form.contacts = upload,
                    "templates" => form.templates = upload,
                    _ => form.dnc = upload,
                }
            }
            "split" => {
                let value = field.text().await.unwrap_or_default();
                form.split = value.trim().eq_ignore_ascii_case("yes");
            }
            "messages_per_file" => {
                form.messages_per_file = field.text().await.ok();
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Check extensions, save uploads and build the run request.
async fn save_uploads(config: &Config, form: GenerateForm) -> ServerResult<RunRequest> {
    let contacts = form
        .contacts
        .ok_or_else(|| ServerError::BadRequest("No contacts file provided".into()))?;
    let templates = form
        .templates
        .ok_or_else(|| ServerError::BadRequest("No templates file provided".into()))?;

    for upload in [&contacts, &templates] {
        if !config.allowed_file(&upload.file_name) {
            return Err(ServerError::BadRequest(format!(
                "File type not allowed: '{}' (allowed: {})",
                upload.file_name,
                config.allowed_extensions.join(", ")
            )));
        }
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    let mut request = RunRequest::new(
        save_upload(config, "contacts", contacts).await?,
        save_upload(config, "templates", templates).await?,
    );
    if let Some(dnc) = form.dnc {
        request.dnc = Some(save_upload(config, "dnc", dnc).await?);
    }
    if form.split {
        request.messages_per_file = Some(
            form.messages_per_file
                .unwrap_or_else(|| config.default_messages_per_file.to_string()),
        );
    }

    Ok(request)
}

async fn save_upload(config: &Config, role: &str, upload: Upload) -> ServerResult<PathBuf> {
    let name = sanitize_filename(&upload.file_name)
        .ok_or_else(|| ServerError::BadRequest(format!("Invalid file name: '{}'", upload.file_name)))?;
    let path = config.upload_dir.join(format!("{}_{}", role, name));

    tokio::fs::write(&path, &upload.bytes)
        .await
        .map_err(|e| ServerError::Internal(format!("Cannot save upload: {}", e)))?;

    Ok(path)
}

/// Download a generated file as an attachment
async fn download(
    State(config): State<Arc<Config>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let safe = sanitize_filename(&filename)
        .filter(|s| *s == filename)
        .ok_or_else(|| reject(ServerError::BadRequest(format!("Invalid file name: '{}'", filename))))?;

    let bytes = tokio::fs::read(config.upload_dir.join(&safe)).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            (StatusCode::NOT_FOUND, Json(error_response(&format!("File not found: {}", safe))))
        } else {
            reject(ServerError::Internal(e.to_string()))
        }
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", safe)),
        ],
        bytes,
    ))
}

/// Map a server error to a status code and JSON body.
///
/// Fatal input problems (missing templates, missing columns, unreadable
/// contacts) are 422 so callers can tell them apart from server faults.
fn reject(err: ServerError) -> ApiError {
    let status = match &err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Run(run) if run.is_input_problem() => StatusCode::UNPROCESSABLE_ENTITY,
        ServerError::Run(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    log_error(err.to_string());
    (status, Json(error_response(&err.to_string())))
}

/// Reduce an uploaded file name to a safe base name.
///
/// Keeps the last path component and only ASCII letters, digits, `.`, `_`
/// and `-`; whitespace becomes `_`; leading dots are dropped.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");

    let cleaned: String = base
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') => Some(c),
            c if c.is_whitespace() => Some('_'),
            _ => None,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
