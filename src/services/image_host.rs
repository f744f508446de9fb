use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::CloudinaryConfig;
use crate::models::Avatar;
use crate::utils::AppError;

pub const AVATAR_FOLDER: &str = "avatars";
const AVATAR_TRANSFORMATION: &str = "c_scale,w_150";

/// External image storage for user avatars.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// `source` is a data URI or a remote URL.
    async fn upload(&self, source: &str, folder: &str) -> Result<Avatar, AppError>;
    /// Succeeds when the image is already gone.
    async fn destroy(&self, public_id: &str) -> Result<(), AppError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary upload API over signed form posts.
pub struct CloudinaryImageHost {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryImageHost {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "https://api.cloudinary.com/v1_1/{}/image/{}",
            self.config.cloud_name, action
        )
    }

    /// Parameters must already be sorted by name.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let to_sign = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        hex::encode(Sha256::digest(format!("{}{}", to_sign, self.config.api_secret)))
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        form: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let response = self
            .client
            .post(self.endpoint(action))
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Image host request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Image host {} failed ({}): {}",
                action, status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid image host response: {}", e)))
    }
}

#[async_trait]
impl ImageHost for CloudinaryImageHost {
    async fn upload(&self, source: &str, folder: &str) -> Result<Avatar, AppError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("folder", folder),
            ("timestamp", &timestamp),
            ("transformation", AVATAR_TRANSFORMATION),
        ]);

        let uploaded: UploadResponse = self
            .post_form(
                "upload",
                &[
                    ("file", source),
                    ("folder", folder),
                    ("timestamp", &timestamp),
                    ("transformation", AVATAR_TRANSFORMATION),
                    ("api_key", &self.config.api_key),
                    ("signature", &signature),
                    ("signature_algorithm", "sha256"),
                ],
            )
            .await?;

        log::info!("🖼️  Uploaded image {}", uploaded.public_id);

        Ok(Avatar {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), AppError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("public_id", public_id), ("timestamp", &timestamp)]);

        let destroyed: DestroyResponse = self
            .post_form(
                "destroy",
                &[
                    ("public_id", public_id),
                    ("timestamp", &timestamp),
                    ("api_key", &self.config.api_key),
                    ("signature", &signature),
                    ("signature_algorithm", "sha256"),
                ],
            )
            .await?;

        destroy_outcome(public_id, &destroyed.result)
    }
}

/// An image that is already gone counts as destroyed.
fn destroy_outcome(public_id: &str, result: &str) -> Result<(), AppError> {
    match result {
        "ok" => {
            log::info!("🗑️ Destroyed image {}", public_id);
            Ok(())
        }
        "not found" => {
            log::debug!("ℹ️  Image {} already removed", public_id);
            Ok(())
        }
        other => Err(AppError::Upstream(format!(
            "Image host could not destroy {}: {}",
            public_id, other
        ))),
    }
}
