//! Image Store
//!
//! Handles uploaded images for menu items and restaurant profiles.
//! Supports multiple image formats (PNG, JPEG, WebP) and converts to JPG.
//! File writes are not transactional with the rows that reference them;
//! callers run the compensating delete when a row write fails.

use std::fs;
use std::io::Cursor;
use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::utils::AppError;

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// JPEG quality for stored images (85% - maintains color appeal while
/// controlling file size)
const JPEG_QUALITY: u8 = 85;

/// Image categories, doubling as storage subdirectories.
///
/// The serving endpoint only ever resolves these two names, which is what
/// makes `/api/images/{type}/{filename}` traversal-safe on the type segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Items,
    Profiles,
}

impl ImageKind {
    pub fn dir(&self) -> &'static str {
        match self {
            ImageKind::Items => "items",
            ImageKind::Profiles => "profiles",
        }
    }

    /// Parse a URL path segment; anything outside the allow list is rejected
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "items" => Some(ImageKind::Items),
            "profiles" => Some(ImageKind::Profiles),
            _ => None,
        }
    }
}

/// File-backed image store rooted at `work_dir/uploads`
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Validate, re-encode and store an uploaded image.
    ///
    /// Returns the relative path (e.g. `items/<uuid>.jpg`) to persist on the
    /// owning row.
    pub fn save(
        &self,
        kind: ImageKind,
        data: &[u8],
        original_filename: &str,
    ) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::validation("Empty file provided".to_string()));
        }

        let ext = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str().map(|s| s.to_string()))
            .ok_or_else(|| {
                AppError::validation(format!("Invalid file extension for: {}", original_filename))
            })?;

        validate_image(data, &ext)?;
        let compressed = compress_to_jpeg(data)?;

        let dir = self.root.join(kind.dir());
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::internal(format!("Failed to create images directory: {}", e)))?;

        let filename = format!("{}.jpg", Uuid::new_v4());
        let file_path = dir.join(&filename);
        fs::write(&file_path, &compressed)
            .map_err(|e| AppError::internal(format!("Failed to save file: {}", e)))?;

        tracing::info!(
            original_name = %original_filename,
            stored = %file_path.display(),
            size = compressed.len(),
            "Image stored"
        );

        Ok(format!("{}/{}", kind.dir(), filename))
    }

    /// Best-effort delete of a stored image; failures are logged, never
    /// propagated.
    pub fn delete(&self, relative_path: &str) {
        let Some(path) = self.resolve_relative(relative_path) else {
            tracing::warn!(path = %relative_path, "Refusing to delete path outside image store");
            return;
        };
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "Failed to delete stored image");
        }
    }

    /// Resolve a (type, filename) pair for serving.
    ///
    /// The filename must be a single plain path component; anything with
    /// separators or `..` resolves to None, as does a missing file.
    pub fn open(&self, kind: ImageKind, filename: &str) -> Option<PathBuf> {
        if !is_plain_filename(filename) {
            return None;
        }
        let path = self.root.join(kind.dir()).join(filename);
        path.is_file().then_some(path)
    }

    /// Validate a stored relative path ("{type}/{filename}") against the
    /// store root.
    fn resolve_relative(&self, relative_path: &str) -> Option<PathBuf> {
        let (kind, filename) = relative_path.split_once('/')?;
        let kind = ImageKind::parse(kind)?;
        if !is_plain_filename(filename) {
            return None;
        }
        Some(self.root.join(kind.dir()).join(filename))
    }
}

/// A single normal path component: no separators, no `..`, no drive prefixes
fn is_plain_filename(filename: &str) -> bool {
    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Validate image file: size, extension and decodability
fn validate_image(data: &[u8], ext: &str) -> Result<(), AppError> {
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::validation(format!(
            "File too large. Maximum size is {} bytes ({}MB)",
            MAX_FILE_SIZE,
            MAX_FILE_SIZE / 1024 / 1024
        )));
    }

    let ext_lower = ext.to_lowercase();
    if !SUPPORTED_FORMATS.contains(&ext_lower.as_str()) {
        return Err(AppError::validation(format!(
            "Unsupported file format '{}'. Supported: {}",
            ext_lower,
            SUPPORTED_FORMATS.join(", ")
        )));
    }

    if let Err(e) = image::load_from_memory(data) {
        return Err(AppError::validation(format!(
            "Invalid image file ({}): {}",
            ext_lower, e
        )));
    }

    Ok(())
}

/// Re-encode to JPEG with quality setting
fn compress_to_jpeg(data: &[u8]) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Invalid image: {}", e)))?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to compress image: {}", e)))?;
    }

    Ok(buffer)
}
