use crate::config::StorageConfig;
use crate::services::storage::S3StorageService;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::{info, warn};

pub async fn setup_storage(config: &StorageConfig) -> Arc<S3StorageService> {
    info!(
        "☁️  S3 Storage: {} (Bucket: {}, Region: {})",
        config.endpoint_url.as_deref().unwrap_or("aws"),
        config.bucket,
        config.region
    );

    let mut loader = aws_config::from_env().region(Region::new(config.region.clone()));

    match (&config.access_key, &config.secret_key) {
        (Some(access_key), Some(secret_key)) => {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "static",
            ));
        }
        (None, None) => {
            info!("🔑 No static credentials configured, using the default provider chain");
        }
        _ => {
            warn!("⚠️  Only one of AWS_API_KEY / AWS_SECRET_KEY is set, using the default provider chain");
        }
    }

    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.endpoint_url.is_some())
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);
    Arc::new(S3StorageService::new(s3_client, config.bucket.clone()))
}
