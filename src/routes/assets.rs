use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_embed::Embed;

use crate::state::AppState;
use crate::uploads;

#[derive(Embed)]
#[folder = "assets/"]
struct Assets;

fn file_response(path: &str, data: Vec<u8>, cache: &'static str) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CACHE_CONTROL, cache.to_string()),
        ],
        data,
    )
        .into_response()
}

/// Bundled stylesheet and other static files compiled into the binary.
pub async fn serve(Path(path): Path<String>) -> Response {
    match Assets::get(&path) {
        Some(file) => file_response(&path, file.data.to_vec(), "public, max-age=86400"),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Uploaded images, read from the public dir on every request since a
/// re-upload under the same name replaces the file.
pub async fn serve_upload(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    let Some(disk) = uploads::resolve(&state.config.public_dir(), &path) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match tokio::fs::read(&disk).await {
        Ok(data) => file_response(&path, data, "no-cache"),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
