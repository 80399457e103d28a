use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Object store connection settings
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Static access key (`AWS_API_KEY`). Falls back to the default provider chain when unset.
    pub access_key: Option<String>,

    /// Static secret key (`AWS_SECRET_KEY`)
    pub secret_key: Option<String>,

    /// Region (default: "us-east-1")
    pub region: String,

    /// Target bucket (required)
    pub bucket: String,

    /// Custom S3-compatible endpoint, e.g. MinIO
    pub endpoint_url: Option<String>,
}

impl StorageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let bucket = env::var("AWS_BUCKET").context("AWS_BUCKET must be set")?;

        Ok(Self {
            access_key: non_empty_var("AWS_API_KEY"),
            secret_key: non_empty_var("AWS_SECRET_KEY"),
            region: non_empty_var("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            bucket,
            endpoint_url: non_empty_var("AWS_ENDPOINT_URL"),
        })
    }

    /// Public URL of the bucket root, used when no return URL is configured.
    pub fn default_return_url(&self) -> String {
        match &self.endpoint_url {
            Some(endpoint) => format!("{}/{}/", endpoint.trim_end_matches('/'), self.bucket),
            None => format!("https://{}.s3.{}.amazonaws.com/", self.bucket, self.region),
        }
    }
}

/// How uploaded objects are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyStrategy {
    /// `{base}_{shortTimestamp}.{ext}`
    Legacy,
    /// `{base}_{shortTimestamp}_{random}.{ext}`
    #[default]
    Unique,
}

impl FromStr for KeyStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "unique" => Ok(Self::Unique),
            other => Err(anyhow::anyhow!("Unknown key strategy: {}", other)),
        }
    }
}

/// Gateway behaviour
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Prefix prepended to object keys to build the returned locator
    pub return_url: String,

    /// Maximum request body size in bytes (default: 256 MB)
    pub max_file_size: usize,

    /// Object key naming (default: unique)
    pub key_strategy: KeyStrategy,

    /// HMAC secret for download tokens. `None` leaves the token route open.
    pub download_token_secret: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            return_url: String::new(),
            max_file_size: 256 * 1024 * 1024, // 256 MB
            key_strategy: KeyStrategy::Unique,
            download_token_secret: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env(storage: &StorageConfig) -> Result<Self> {
        let default = Self::default();

        let key_strategy = match non_empty_var("UPLOAD_KEY_STRATEGY") {
            Some(v) => v.parse()?,
            None => default.key_strategy,
        };

        Ok(Self {
            return_url: non_empty_var("RETURN_URL")
                .unwrap_or_else(|| storage.default_return_url()),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            key_strategy,

            download_token_secret: non_empty_var("DOWNLOAD_TOKEN_SECRET"),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
