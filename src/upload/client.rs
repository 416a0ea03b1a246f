//! Multipart upload to the backend's media endpoints.

use std::path::Path;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::config::UploadConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{ApiClient, FormPart, RequestBody, RequestOptions};
use crate::observability::metrics;
use crate::upload::file::{validate, UploadFile, UploadKind};

/// Upload endpoint response.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    /// URL of the stored media for `kind`.
    pub fn url(&self, kind: UploadKind) -> Option<&str> {
        match kind {
            UploadKind::Image => self.image_url.as_deref(),
            UploadKind::Video => self.video_url.as_deref(),
        }
    }
}

/// Validates and uploads media files.
#[derive(Debug, Clone)]
pub struct Uploader {
    client: ApiClient,
    limits: UploadConfig,
}

impl Uploader {
    pub fn new(client: ApiClient, limits: UploadConfig) -> Self {
        Self { client, limits }
    }

    pub fn limits(&self) -> &UploadConfig {
        &self.limits
    }

    /// Upload `file` and return the URL the backend stored it under.
    ///
    /// Size and MIME checks run first; a refused file never reaches the network.
    pub async fn upload(&self, kind: UploadKind, file: UploadFile) -> ApiResult<String> {
        if let Err(e) = validate(&file, kind, &self.limits) {
            tracing::warn!(file = %file.file_name, kind = %kind, error = %e, "Upload refused");
            metrics::record_upload_rejected(kind.field_name());
            return Err(e);
        }

        tracing::info!(
            file = %file.file_name,
            kind = %kind,
            size = file.size(),
            "Uploading media"
        );

        let body = RequestBody::Multipart(vec![FormPart {
            name: kind.field_name().to_string(),
            file_name: Some(file.file_name),
            content_type: Some(file.content_type),
            data: file.data,
        }]);
        let response = self
            .client
            .request(Method::POST, kind.endpoint(), Some(body), RequestOptions::default())
            .await?;
        let parsed: UploadResponse = response.json()?;

        if !parsed.success {
            return Err(ApiError::Upload(
                parsed.message.unwrap_or_else(|| "upload was not accepted".to_string()),
            ));
        }
        parsed
            .url(kind)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Upload(format!("response did not include a {} URL", kind)))
    }

    /// Upload a file from disk. Oversized files are refused without being read.
    pub async fn upload_path(&self, kind: UploadKind, path: impl AsRef<Path>) -> ApiResult<String> {
        let path = path.as_ref();
        let file = match UploadFile::from_path_checked(path, kind, &self.limits).await {
            Ok(file) => file,
            Err(e @ ApiError::InvalidFile(_)) => {
                tracing::warn!(file = %path.display(), kind = %kind, error = %e, "Upload refused");
                metrics::record_upload_rejected(kind.field_name());
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        self.upload(kind, file).await
    }

    pub async fn upload_image(&self, file: UploadFile) -> ApiResult<String> {
        self.upload(UploadKind::Image, file).await
    }

    pub async fn upload_video(&self, file: UploadFile) -> ApiResult<String> {
        self.upload(UploadKind::Video, file).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_wire_names() {
        let r: UploadResponse =
            serde_json::from_str(r#"{"success":true,"imageUrl":"/uploads/a.png"}"#).unwrap();
        assert_eq!(r.url(UploadKind::Image), Some("/uploads/a.png"));
        assert_eq!(r.url(UploadKind::Video), None);

        let r: UploadResponse =
            serde_json::from_str(r#"{"success":false,"message":"too large"}"#).unwrap();
        assert!(!r.success);
        assert_eq!(r.message.as_deref(), Some("too large"));
    }
}
