use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use rand::Rng;
use regex::Regex;
use serde_json::json;

use crate::{error::HttpError, middleware::auth, AppState};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_FOLDER: &str = "general";
const ALLOWED_TYPES: &str = r"^(jpeg|jpg|png|webp|avif|pdf)$";

pub fn upload_handler() -> Router {
    Router::new()
        .route("/", post(upload_file))
        .route_layer(middleware::from_fn(auth))
        // Room for the multipart envelope around a maximum-size file.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
}

/// Keeps `[a-z0-9_-]`; anything that sanitizes to nothing becomes `general`.
pub fn sanitize_folder(raw: Option<&str>) -> String {
    let folder: String = raw
        .unwrap_or_default()
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect();

    if folder.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        folder
    }
}

fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

fn mime_subtype(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim();
    let (_, subtype) = essence.split_once('/')?;
    Some(subtype.to_lowercase())
}

/// Both the extension and the MIME subtype have to be on the allow list.
pub fn checked_extension(file_name: &str, content_type: &str) -> Result<String, HttpError> {
    let allowed = Regex::new(ALLOWED_TYPES).map_err(|e| HttpError::server_error(e.to_string()))?;

    let ext = file_extension(file_name).filter(|ext| allowed.is_match(ext));
    let subtype = mime_subtype(content_type).filter(|subtype| allowed.is_match(subtype));

    match (ext, subtype) {
        (Some(ext), Some(_)) => Ok(ext),
        _ => Err(HttpError::bad_request(
            "Only images (jpeg, jpg, png, webp, avif) and PDF files are allowed",
        )),
    }
}

pub fn stored_file_name(ext: &str) -> String {
    let random: [u8; 8] = rand::rng().random();
    format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        hex::encode(random),
        ext
    )
}

pub async fn upload_file(
    Extension(app_state): Extension<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpError> {
    let mut folder: Option<String> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(format!("Multipart error: {}", e)))?
    {
        let field_name = field.name().map(|name| name.to_string());
        match field_name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| HttpError::bad_request(format!("Read error: {}", e)))?;
                file = Some((file_name, content_type, data.to_vec()));
            }
            Some("folder") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| HttpError::bad_request(format!("Read error: {}", e)))?;
                folder = Some(value);
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| HttpError::bad_request("No file uploaded"))?;

    if data.len() > MAX_UPLOAD_BYTES {
        return Err(HttpError::new(
            "File must not be larger than 5MB",
            StatusCode::PAYLOAD_TOO_LARGE,
        ));
    }

    let ext = checked_extension(&file_name, &content_type)?;
    let folder = sanitize_folder(folder.as_deref());
    let name = stored_file_name(&ext);

    let dir = PathBuf::from(&app_state.env.upload_dir).join(&folder);
    tokio::fs::create_dir_all(&dir).await.map_err(|e| {
        tracing::error!("Failed to create upload directory {:?}: {}", dir, e);
        HttpError::server_error("Failed to store file")
    })?;

    let path = dir.join(&name);
    tokio::fs::write(&path, &data).await.map_err(|e| {
        tracing::error!("Failed to write upload {:?}: {}", path, e);
        HttpError::server_error("Failed to store file")
    })?;

    tracing::info!("Stored upload {:?} ({} bytes)", path, data.len());

    Ok(Json(json!({
        "url": format!("/uploads/{}/{}", folder, name),
    })))
}
