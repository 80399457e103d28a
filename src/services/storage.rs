use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

/// An object fetched from the store, body still unread.
pub struct StoredObject {
    pub body: ByteStream,
    pub content_type: Option<String>,
    pub content_length: Option<i64>,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn put_object(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<()>;
    async fn get_object(&self, key: &str) -> Result<StoredObject>;
    async fn delete_object(&self, key: &str) -> Result<()>;
    async fn check_connection(&self) -> Result<()>;
}

pub struct S3StorageService {
    client: Client,
    bucket: String,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn put_object(&self, key: &str, data: Bytes, content_type: Option<&str>) -> Result<()> {
        let size = data.len() as i64;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_length(size)
            .set_content_type(content_type.map(str::to_string))
            .body(ByteStream::from(data))
            .send()
            .await?;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<StoredObject> {
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;

        Ok(StoredObject {
            content_type: res.content_type,
            content_length: res.content_length,
            body: res.body,
        })
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    async fn check_connection(&self) -> Result<()> {
        self.client.head_bucket().bucket(&self.bucket).send().await?;
        Ok(())
    }
}
