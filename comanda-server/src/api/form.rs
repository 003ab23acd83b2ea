//! Multipart form helper
//!
//! Item and restaurant mutations arrive as multipart forms (text fields plus
//! an optional image). This collects the whole form up front so handlers can
//! validate before any file is stored.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::utils::AppError;

/// One uploaded file field
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A fully read multipart form
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    /// Drain a multipart request. Fields with a filename are collected as
    /// files, everything else as UTF-8 text.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(|s| s.to_string()) else {
                continue;
            };

            if let Some(filename) = field.file_name().map(|s| s.to_string()) {
                let data = field.bytes().await?.to_vec();
                form.files.insert(name, UploadedFile { filename, data });
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Invalid field {name}: {e}")))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    /// Required text field
    pub fn require_text(&self, name: &str) -> Result<&str, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::validation(format!("{name} is required")))
    }

    /// Optional numeric field; a present but unparsable value is an error
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        match self.text(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|_| AppError::validation(format!("{name} is not a valid number"))),
        }
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }
}
