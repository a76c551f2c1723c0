//! Multipart form reading for media upload endpoints

use axum::extract::Multipart;
use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};

/// One uploaded file from a multipart form
#[derive(Debug, Clone)]
pub struct FilePart {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A fully-read multipart form: text fields plus file parts, keyed by name
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, FilePart>,
}

impl UploadForm {
    /// Drain a multipart stream into memory
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::Validation(format!("Failed to read file part: {e}")))?;

                    form.files.insert(
                        name,
                        FilePart {
                            filename,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| ApiError::Validation(format!("Failed to read field: {e}")))?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// A text field's value, if present
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// A file part, if present
    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.files.get(name)
    }

    /// A file part that must be present and non-empty
    pub fn require_file(&self, name: &str) -> ApiResult<&FilePart> {
        match self.files.get(name) {
            Some(file) if !file.bytes.is_empty() => Ok(file),
            _ => Err(ApiError::Validation(format!("{name} file is required"))),
        }
    }
}
