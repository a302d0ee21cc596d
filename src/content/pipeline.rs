//! Per-request content decisions.
//!
//! Evaluated in precedence order for GET: site-wide zip download, path
//! resolution (with traversal rejection), 404, forced gzip download,
//! negotiated gzip, plain file. POST is a log sink that always answers 200.

use crate::config::Config;
use crate::content::archive;
use crate::http::mime;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::logging::access::{AccessLog, LogEntry};
use std::path::{Component, Path};

const NOT_FOUND_FALLBACK: &str = "<h1>404 - Archivo no encontrado</h1>";
const NOT_FOUND_DETAIL: &str = "Archivo no encontrado";
const SITE_ZIP_FILENAME: &str = "wwwroot.zip";

/// Drives one GET request through the pipeline and produces the response.
pub async fn handle_get(
    req: &Request,
    cfg: &Config,
    log: &AccessLog,
    client_ip: &str,
) -> Response {
    // A sitezip download short-circuits path resolution entirely.
    if req.query_contains("download=sitezip") {
        log_request(log, client_ip, &req.path, None, &req.query);
        return site_zip(cfg).await;
    }

    // "/" means the welcome file, for GET only.
    let resolved = if req.path == "/" {
        format!("/{}", cfg.welcome_file)
    } else {
        req.path.clone()
    };

    // Refuse anything that could climb out of the document root.
    if escapes_root(&resolved) {
        log_request(
            log,
            client_ip,
            &resolved,
            Some("path escapes document root".to_string()),
            &req.query,
        );
        return Response::empty(StatusCode::Forbidden);
    }

    let full = cfg.document_root.join(resolved.trim_start_matches('/'));

    let is_file = tokio::fs::metadata(&full)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        log_request(
            log,
            client_ip,
            &resolved,
            Some(NOT_FOUND_DETAIL.to_string()),
            &req.query,
        );
        return not_found(cfg).await;
    }

    let bytes = match tokio::fs::read(&full).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("failed to read {}: {}", full.display(), e);
            log_request(log, client_ip, &resolved, Some(e.to_string()), &req.query);
            return Response::empty(StatusCode::InternalServerError);
        }
    };

    log_request(log, client_ip, &resolved, None, &req.query);

    // Explicit download request beats content negotiation.
    if req.query_contains("download=gzip") {
        return forced_gzip(&full, &bytes);
    }

    let content_type = mime::content_type_for(&full);

    if req.accepts_gzip {
        return match archive::gzip_bytes(&bytes) {
            Ok(compressed) => ResponseBuilder::new(StatusCode::Ok)
                .header("Content-Type", content_type)
                .header("Content-Encoding", "gzip")
                .body(compressed)
                .build(),
            Err(e) => {
                tracing::error!("gzip failed for {}: {}", full.display(), e);
                Response::empty(StatusCode::InternalServerError)
            }
        };
    }

    ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", content_type)
        .body(bytes)
        .build()
}

/// POST is a generic log sink: the body is recorded through the access
/// logger and the answer is always an empty 200.
pub fn handle_post(req: &Request, log: &AccessLog, client_ip: &str) -> Response {
    let body = String::from_utf8_lossy(&req.body).into_owned();
    log.record(LogEntry::new(client_ip, "POST", &req.path).with_body(body));

    Response::empty(StatusCode::Ok)
}

/// One entry for the resolved path (with the failure detail when there is
/// one), then a second entry carrying the raw query string when non-empty.
fn log_request(
    log: &AccessLog,
    client_ip: &str,
    path: &str,
    detail: Option<String>,
    query: &str,
) {
    let entry = LogEntry::new(client_ip, "GET", path);
    log.record(match detail {
        Some(detail) => entry.with_error(detail),
        None => entry,
    });

    if !query.is_empty() {
        log.record(LogEntry::new(client_ip, "GET", query));
    }
}

fn escapes_root(path: &str) -> bool {
    Path::new(path)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
}

async fn not_found(cfg: &Config) -> Response {
    // A 404.html at the document root overrides the built-in page.
    let body = match tokio::fs::read(cfg.document_root.join("404.html")).await {
        Ok(bytes) => bytes,
        Err(_) => NOT_FOUND_FALLBACK.as_bytes().to_vec(),
    };

    ResponseBuilder::new(StatusCode::NotFound)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(body)
        .build()
}

fn forced_gzip(full: &Path, bytes: &[u8]) -> Response {
    let filename = full
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match archive::gzip_bytes(bytes) {
        Ok(compressed) => ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "application/gzip")
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{}.gz\"", filename),
            )
            .body(compressed)
            .build(),
        Err(e) => {
            tracing::error!("gzip failed for {}: {}", full.display(), e);
            Response::empty(StatusCode::InternalServerError)
        }
    }
}

async fn site_zip(cfg: &Config) -> Response {
    // Walking and compressing the whole root is blocking work; keep it off
    // the request tasks' threads.
    let root = cfg.document_root.clone();
    let archived = tokio::task::spawn_blocking(move || archive::zip_directory(&root)).await;

    match archived {
        Ok(Ok(bytes)) => ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "application/zip")
            .header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", SITE_ZIP_FILENAME),
            )
            .body(bytes)
            .build(),
        Ok(Err(e)) => {
            tracing::error!("site archive failed: {:#}", e);
            Response::empty(StatusCode::InternalServerError)
        }
        Err(e) => {
            tracing::error!("site archive task failed: {}", e);
            Response::empty(StatusCode::InternalServerError)
        }
    }
}
