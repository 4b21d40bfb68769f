//! Profile image storage on local disk

use crate::{config::UploadConfig, error::AppError};
use rand::Rng;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// URL prefix under which stored files are served
pub const PUBLIC_PREFIX: &str = "/uploads";

pub struct UploadStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.dir, config.max_bytes)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Store an image under a unique name and return its public reference.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("profile_image is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::Validation(format!(
                "profile_image exceeds {} bytes",
                self.max_bytes
            )));
        }

        let extension = image_extension(original_name)?;
        let file_name = unique_file_name(&extension);

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload dir: {}", e)))?;
        tokio::fs::write(self.dir.join(&file_name), bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write upload: {}", e)))?;

        tracing::debug!(file = %file_name, size = bytes.len(), "Profile image stored");

        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    /// Delete a file previously returned by `save`. Failures are only logged.
    pub async fn remove(&self, reference: &str) {
        let Some(file_name) = reference
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
        else {
            tracing::warn!(reference = %reference, "Refusing to remove unknown upload reference");
            return;
        };

        if let Err(e) = tokio::fs::remove_file(self.dir.join(file_name)).await {
            tracing::warn!(file = %file_name, "Failed to remove upload: {}", e);
        }
    }
}

fn image_extension(original_name: &str) -> Result<String, AppError> {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| {
            AppError::Validation("profile_image must be a png, jpg, jpeg, gif or webp file".to_string())
        })
}

/// `<unix-millis>-<random>.<ext>`
fn unique_file_name(extension: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        suffix,
        extension
    )
}
