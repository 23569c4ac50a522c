use crate::config::Config;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{primitives::ByteStream, Client};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("S3 SDK error: {0}")]
    Sdk(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Remote rejected the file: {0}")]
    Rejected(String),
}

/// S3 configuration for the remote repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket_name: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint_url: Option<String>, // For MinIO/S3-compatible services
}

impl S3Config {
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.bucket_name.trim().is_empty() {
            return Err(TransferError::Config(
                "Bucket name cannot be empty".to_string(),
            ));
        }
        if self.region.trim().is_empty() {
            return Err(TransferError::Config("Region cannot be empty".to_string()));
        }
        if self.access_key_id.trim().is_empty() {
            return Err(TransferError::Config(
                "Access key ID cannot be empty".to_string(),
            ));
        }
        if self.secret_access_key.trim().is_empty() {
            return Err(TransferError::Config(
                "Secret access key cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Sends one local file to a path in the remote repository (allows mocking for tests)
#[async_trait::async_trait]
pub trait Transfer: Send + Sync {
    /// Returns the storage location the file ended up at
    async fn transfer(&self, local_path: &Path, remote_path: &str)
        -> Result<String, TransferError>;
}

/// Production S3 transfer
pub struct S3Transfer {
    client: Client,
    bucket_name: String,
}

impl S3Transfer {
    pub async fn new(config: S3Config) -> Result<Self, TransferError> {
        config.validate()?;

        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None, // session_token
            None, // expiration
            "media-uploader-s3-config",
        );

        let mut aws_config_builder = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials);

        if let Some(endpoint) = config.endpoint_url {
            aws_config_builder = aws_config_builder.endpoint_url(endpoint);
        }

        let aws_config = aws_config_builder.load().await;
        let client = Client::new(&aws_config);

        Ok(S3Transfer {
            client,
            bucket_name: config.bucket_name,
        })
    }
}

#[async_trait::async_trait]
impl Transfer for S3Transfer {
    async fn transfer(
        &self,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<String, TransferError> {
        debug!("S3Transfer: Uploading {:?} to {}", local_path, remote_path);

        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| TransferError::Sdk(format!("Failed to open {:?}: {}", local_path, e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(remote_path)
            .body(body)
            .send()
            .await
            .map_err(|e| TransferError::Sdk(format!("Put object failed: {}", e)))?;

        Ok(format!("s3://{}/{}", self.bucket_name, remote_path))
    }
}

/// Copies files into a local directory laid out like the remote repository (dev mode)
pub struct LocalTransfer {
    root: PathBuf,
}

impl LocalTransfer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[async_trait::async_trait]
impl Transfer for LocalTransfer {
    async fn transfer(
        &self,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<String, TransferError> {
        let relative = Path::new(remote_path);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(TransferError::Rejected(format!(
                "invalid remote path {}",
                remote_path
            )));
        }

        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(local_path, &target).await?;

        Ok(target.display().to_string())
    }
}

/// Transfer backend shared between the session and its background uploads
#[derive(Clone)]
pub struct TransferClient {
    transfer: Arc<dyn Transfer>,
}

impl std::fmt::Debug for TransferClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferClient")
            .field("transfer", &"<dyn Transfer>")
            .finish()
    }
}

impl TransferClient {
    pub fn new(transfer: Arc<dyn Transfer>) -> Self {
        Self { transfer }
    }

    /// Pick the backend the configuration asks for
    pub async fn from_config(config: &Config) -> Result<Self, TransferError> {
        let transfer: Arc<dyn Transfer> = if config.use_local_storage {
            info!(
                "TransferClient: Using local storage at {}",
                config.local_storage_path.display()
            );
            Arc::new(LocalTransfer::new(config.local_storage_path.clone()))
        } else {
            let s3_config = config.s3_config.clone().ok_or_else(|| {
                TransferError::Config("S3 storage selected but not configured".to_string())
            })?;
            info!("TransferClient: Using S3 bucket {}", s3_config.bucket_name);
            Arc::new(S3Transfer::new(s3_config).await?)
        };
        Ok(Self::new(transfer))
    }

    pub async fn transfer_file(
        &self,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<String, TransferError> {
        self.transfer.transfer(local_path, remote_path).await
    }
}
