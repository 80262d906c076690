//! Multipart form collection shared by the signup and product handlers.

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::error::AppError;

/// One uploaded file part.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// A fully read multipart form: text fields plus file parts by name.
#[derive(Debug, Default)]
pub struct SubmittedForm {
    texts: HashMap<String, String>,
    files: HashMap<String, Vec<UploadedFile>>,
}

impl SubmittedForm {
    /// Read every part of a multipart body into memory.
    ///
    /// Browsers submit an empty file part for file inputs the user left
    /// blank; those parts are dropped here.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` on a malformed multipart body.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if let Some(filename) = field.file_name().map(str::to_owned) {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let data = field.bytes().await.map_err(malformed)?;
                if filename.is_empty() && data.is_empty() {
                    continue;
                }
                form.files.entry(name).or_default().push(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            } else {
                let value = field.text().await.map_err(malformed)?;
                form.texts.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Get a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.texts.get(name).map(String::as_str)
    }

    /// Get a text field, defaulting to empty for absent values.
    pub fn text_or_empty(&self, name: &str) -> String {
        self.text(name).unwrap_or_default().to_owned()
    }

    /// Take all file parts submitted under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedFile> {
        self.files.remove(name).unwrap_or_default()
    }
}

fn malformed(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed form data: {e}"))
}
