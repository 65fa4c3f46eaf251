//! Multipart form reading and image storage under the public directory.
//!
//! Files keep their uploaded name: a second upload with the same name
//! overwrites the first. Only the final path component of the client's
//! filename is used.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use axum::extract::Multipart;

use crate::error::AppResult;

/// Web path prefix (and subdirectory of the public dir) for uploaded images.
pub const IMAGE_ROOT: &str = "image";
pub const POST_IMAGES: &str = "";
pub const AVATARS: &str = "user_image";

#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A fully buffered multipart form: text fields plus file fields.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let bytes = field.bytes().await?;
                    // Browsers submit an empty part for an untouched file input
                    if let Some(file_name) = sanitize_file_name(&file_name) {
                        if !bytes.is_empty() {
                            form.files.insert(
                                name,
                                Upload {
                                    file_name,
                                    bytes: bytes.to_vec(),
                                },
                            );
                        }
                    }
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Text field value, or "" when absent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn take_file(&mut self, name: &str) -> Option<Upload> {
        self.files.remove(name)
    }
}

/// Final path component of a client-supplied filename, or `None` if nothing
/// usable is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

/// `/image/<subdir>/<name>`, as stored on rows and used in `<img src>`.
pub fn web_path(subdir: &str, file_name: &str) -> String {
    if subdir.is_empty() {
        format!("/{}/{}", IMAGE_ROOT, file_name)
    } else {
        format!("/{}/{}/{}", IMAGE_ROOT, subdir, file_name)
    }
}

/// Map a path below `/image/` onto the public dir. Anything that could
/// escape it (`..`, absolute paths) is `None`.
pub fn resolve(public_dir: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(public_dir.join(IMAGE_ROOT).join(relative))
}

/// Write `upload` below the public dir and return its web path.
pub async fn save_image(public_dir: &Path, subdir: &str, upload: &Upload) -> AppResult<String> {
    let web = web_path(subdir, &upload.file_name);
    let disk = public_dir.join(web.trim_start_matches('/'));

    if let Some(parent) = disk.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&disk, &upload.bytes).await?;
    tracing::info!("Stored upload at {}", disk.display());

    Ok(web)
}
