use std::collections::HashMap;
use std::path::Path;

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use chrono::Utc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::domain::AttachmentMeta;

pub const MAX_ATTACHMENTS: usize = 6;
pub const MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: MAX_ATTACHMENTS,
            max_file_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl UploadLimits {
    /// Request body ceiling for multipart routes: every file at its limit plus form overhead.
    pub fn body_limit(&self) -> usize {
        self.max_files * self.max_file_bytes + 1024 * 1024
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("at most {0} files may be attached")]
    TooManyFiles(usize),
    #[error("'{name}' is larger than {limit} bytes")]
    TooLarge { name: String, limit: usize },
    #[error("malformed upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("could not stage upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::TooManyFiles(_) => StatusCode::BAD_REQUEST,
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Multipart(err) => err.status(),
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A received file staged on disk. The file is removed when this value is dropped, so holding
/// it for exactly as long as the dispatches that read it is the whole cleanup contract.
#[derive(Debug)]
pub struct TempUpload {
    file: NamedTempFile,
    original_name: String,
    mime_type: String,
    size_bytes: u64,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn meta(&self) -> AttachmentMeta {
        AttachmentMeta {
            storage_path: self.file.path().to_path_buf(),
            original_name: self.original_name.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.size_bytes,
        }
    }

    /// Stage raw bytes, for callers that already hold the file in memory.
    pub async fn from_bytes(
        dir: &Path,
        original_name: &str,
        mime_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<Self, UploadError> {
        let file = staging_file(dir, original_name)?;
        tokio::fs::write(file.path(), bytes).await?;
        Ok(Self {
            file,
            original_name: original_name.to_string(),
            mime_type: resolve_mime(original_name, mime_type),
            size_bytes: bytes.len() as u64,
        })
    }
}

fn staging_file(dir: &Path, original_name: &str) -> Result<NamedTempFile, std::io::Error> {
    let prefix = format!("{}-", Utc::now().timestamp_millis());
    let suffix = format!("-{}", safe_file_name(original_name));
    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .tempfile_in(dir)
}

fn resolve_mime(original_name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.to_string(),
        None => mime_guess::from_path(original_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

/// Keep ASCII letters, digits, `.`, `_` and `-`; everything else becomes `_`.
pub fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Multipart body split into text fields and staged files.
#[derive(Debug, Default)]
pub struct UploadedForm {
    fields: HashMap<String, String>,
    files: Vec<(String, TempUpload)>,
}

impl UploadedForm {
    /// Drain a multipart body. File parts without a filename and without content (the browser's
    /// "no file chosen") are skipped. Any error drops what was staged so far, deleting it.
    pub async fn read(
        mut multipart: Multipart,
        dir: &Path,
        limits: UploadLimits,
    ) -> Result<Self, UploadError> {
        let mut form = UploadedForm::default();

        while let Some(mut field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string).unwrap_or_default();

            let Some(file_name) = field.file_name().map(str::to_string) else {
                let value = field.text().await?;
                form.fields.insert(name, value);
                continue;
            };

            let declared_type = field.content_type().map(str::to_string);
            let staged = staging_file(dir, &file_name)?;
            let mut writer = tokio::fs::OpenOptions::new()
                .write(true)
                .truncate(true)
                .open(staged.path())
                .await?;

            let mut size = 0usize;
            while let Some(chunk) = field.chunk().await? {
                size += chunk.len();
                if size > limits.max_file_bytes {
                    return Err(UploadError::TooLarge {
                        name: file_name,
                        limit: limits.max_file_bytes,
                    });
                }
                writer.write_all(&chunk).await?;
            }
            writer.flush().await?;

            if size == 0 && file_name.trim().is_empty() {
                continue;
            }

            if form.files.len() == limits.max_files {
                return Err(UploadError::TooManyFiles(limits.max_files));
            }

            form.files.push((
                name,
                TempUpload {
                    file: staged,
                    mime_type: resolve_mime(&file_name, declared_type.as_deref()),
                    original_name: file_name,
                    size_bytes: size as u64,
                },
            ));
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Remove and return every file posted under `name`, in upload order.
    pub fn take_files(&mut self, name: &str) -> Vec<TempUpload> {
        let (taken, kept) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(field, _)| field == name);
        self.files = kept;
        taken.into_iter().map(|(_, upload)| upload).collect()
    }

    pub fn take_file(&mut self, name: &str) -> Option<TempUpload> {
        let index = self.files.iter().position(|(field, _)| field == name)?;
        Some(self.files.remove(index).1)
    }
}
