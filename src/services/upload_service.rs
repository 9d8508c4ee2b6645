use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use serde::Serialize;
use uuid::Uuid;

use crate::config::S3Config;
use crate::error::{AppError, AppResult};

const PRESIGN_EXPIRY: Duration = Duration::from_secs(900);

#[derive(Debug, Serialize)]
pub struct PresignedUpload {
    /// PUT the file body here.
    pub upload_url: String,
    /// Where the object is publicly reachable after upload; clients pass
    /// this back as a message's file_url.
    pub file_url: String,
    pub key: String,
}

/// Issues presigned S3 PUT URLs so clients upload file attachments
/// directly to object storage; the relay itself never proxies file bytes.
pub struct UploadService {
    client: Client,
    config: S3Config,
}

impl UploadService {
    pub fn new(client: Client, config: S3Config) -> Self {
        Self { client, config }
    }

    pub async fn presign_put(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> AppResult<PresignedUpload> {
        if file_name.is_empty() || file_name.len() > 255 {
            return Err(AppError::BadRequest("invalid file name".into()));
        }

        let key = format!("uploads/{}/{}", Uuid::new_v4(), sanitize(file_name));

        let presigning = PresigningConfig::expires_in(PRESIGN_EXPIRY)
            .map_err(|e| AppError::Config(format!("presigning config: {e}")))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.config.bucket)
            .key(&key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| AppError::Unavailable(format!("presign upload: {e}")))?;

        Ok(PresignedUpload {
            upload_url: request.uri().to_string(),
            file_url: format!("{}/{}", self.config.public_url.trim_end_matches('/'), key),
            key,
        })
    }
}

fn sanitize(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize("report-v2_final.pdf"), "report-v2_final.pdf");
    }

    #[test]
    fn sanitize_replaces_path_separators_and_spaces() {
        assert_eq!(sanitize("../etc/pass wd"), ".._etc_pass_wd");
    }
}
