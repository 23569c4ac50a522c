use crate::transfer::S3Config;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

const APP_DIR: &str = ".media-uploader";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    NoHomeDir,
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
}

/// Application configuration
/// In debug builds: a .env file is loaded into the environment first
#[derive(Clone, Debug)]
pub struct Config {
    /// Whether to copy into a local directory instead of uploading to S3
    pub use_local_storage: bool,
    /// Root of the local repository (dev mode)
    pub local_storage_path: PathBuf,
    /// Remote repository, required unless local storage is used
    pub s3_config: Option<S3Config>,
    /// Directory holding languages.json, books.json and resource_types.json
    pub catalog_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        #[cfg(debug_assertions)]
        {
            if dotenvy::dotenv().is_ok() {
                info!("Config: Dev mode activated - loaded .env file");
            }
        }

        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build configuration from a variable lookup
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_dir = dirs::home_dir().map(|home| home.join(APP_DIR));

        let use_local_storage = var("UPLOADER_USE_LOCAL_STORAGE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let local_storage_path = match var("UPLOADER_LOCAL_STORAGE_PATH") {
            Some(path) => PathBuf::from(path),
            None => app_dir
                .as_ref()
                .map(|dir| dir.join("remote"))
                .ok_or(ConfigError::NoHomeDir)?,
        };

        let catalog_dir = match var("UPLOADER_CATALOG_DIR") {
            Some(path) => PathBuf::from(path),
            None => app_dir.clone().ok_or(ConfigError::NoHomeDir)?,
        };

        let s3_config = if use_local_storage {
            info!(
                "Config: Local storage enabled at {}",
                local_storage_path.display()
            );
            None
        } else {
            let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));
            Some(S3Config {
                bucket_name: required("UPLOADER_S3_BUCKET")?,
                region: required("UPLOADER_S3_REGION")?,
                access_key_id: required("UPLOADER_S3_ACCESS_KEY_ID")?,
                secret_access_key: required("UPLOADER_S3_SECRET_ACCESS_KEY")?,
                endpoint_url: var("UPLOADER_S3_ENDPOINT_URL"),
            })
        };

        Ok(Self {
            use_local_storage,
            local_storage_path,
            s3_config,
            catalog_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_local_storage_needs_no_s3_settings() {
        let config = Config::from_vars(vars(&[
            ("UPLOADER_USE_LOCAL_STORAGE", "TRUE"),
            ("UPLOADER_LOCAL_STORAGE_PATH", "/tmp/remote"),
            ("UPLOADER_CATALOG_DIR", "/tmp/catalogs"),
        ]))
        .unwrap();

        assert!(config.use_local_storage);
        assert_eq!(config.local_storage_path, PathBuf::from("/tmp/remote"));
        assert_eq!(config.catalog_dir, PathBuf::from("/tmp/catalogs"));
        assert!(config.s3_config.is_none());
    }

    #[test]
    fn test_s3_settings_are_required_otherwise() {
        let result = Config::from_vars(vars(&[
            ("UPLOADER_LOCAL_STORAGE_PATH", "/tmp/remote"),
            ("UPLOADER_CATALOG_DIR", "/tmp/catalogs"),
            ("UPLOADER_S3_BUCKET", "bucket"),
        ]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::Missing("UPLOADER_S3_REGION")
        );
    }

    #[test]
    fn test_s3_config_is_read() {
        let config = Config::from_vars(vars(&[
            ("UPLOADER_LOCAL_STORAGE_PATH", "/tmp/remote"),
            ("UPLOADER_CATALOG_DIR", "/tmp/catalogs"),
            ("UPLOADER_S3_BUCKET", "bucket"),
            ("UPLOADER_S3_REGION", "us-east-1"),
            ("UPLOADER_S3_ACCESS_KEY_ID", "key"),
            ("UPLOADER_S3_SECRET_ACCESS_KEY", "secret"),
            ("UPLOADER_S3_ENDPOINT_URL", "http://localhost:9000"),
        ]))
        .unwrap();

        let s3 = config.s3_config.unwrap();
        assert_eq!(s3.bucket_name, "bucket");
        assert_eq!(s3.endpoint_url.as_deref(), Some("http://localhost:9000"));
    }
}
