//! Files staged for upload and their client-side checks.

use std::fmt;
use std::path::Path;

use crate::config::UploadConfig;
use crate::error::{ApiError, ApiResult};

/// Media category of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Video,
}

impl UploadKind {
    /// Multipart field name expected by the backend.
    pub fn field_name(&self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Video => "video",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            UploadKind::Image => "/api/upload/image",
            UploadKind::Video => "/api/upload/video",
        }
    }

    /// Required MIME type prefix.
    pub fn mime_prefix(&self) -> &'static str {
        match self {
            UploadKind::Image => "image/",
            UploadKind::Video => "video/",
        }
    }

    pub fn max_bytes(&self, limits: &UploadConfig) -> u64 {
        match self {
            UploadKind::Image => limits.image_max_bytes,
            UploadKind::Video => limits.video_max_bytes,
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// File contents plus the metadata the upload needs.
#[derive(Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    ///
    /// The whole file is loaded; use [`UploadFile::from_path_checked`] to
    /// refuse oversized files first.
    pub async fn from_path(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path).first_or_octet_stream();
        Ok(Self::new(file_name, content_type.as_ref(), data))
    }

    /// Like [`UploadFile::from_path`], but refuses a file larger than the
    /// limit for `kind` before reading it.
    pub async fn from_path_checked(
        path: impl AsRef<Path>,
        kind: UploadKind,
        limits: &UploadConfig,
    ) -> ApiResult<Self> {
        let path = path.as_ref();
        let size = tokio::fs::metadata(path).await?.len();
        check_size(&path.display().to_string(), size, kind, limits)?;
        Self::from_path(path).await
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Refuse files the backend would reject, before touching the network.
pub fn validate(file: &UploadFile, kind: UploadKind, limits: &UploadConfig) -> ApiResult<()> {
    let content_type = file.content_type.to_ascii_lowercase();
    if !content_type.starts_with(kind.mime_prefix()) {
        return Err(ApiError::InvalidFile(format!(
            "{} is not a valid {} file (type {})",
            file.file_name, kind, file.content_type
        )));
    }

    check_size(&file.file_name, file.size(), kind, limits)
}

fn check_size(file_name: &str, size: u64, kind: UploadKind, limits: &UploadConfig) -> ApiResult<()> {
    let max = kind.max_bytes(limits);
    if size > max {
        return Err(ApiError::InvalidFile(format!(
            "{} is {} bytes; {} uploads are limited to {} MB",
            file_name,
            size,
            kind,
            max / (1024 * 1024)
        )));
    }
    Ok(())
}
