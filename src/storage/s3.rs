// src/storage/s3.rs

//! AWS S3 object sink.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::info;

use crate::error::{AppError, Result};
use crate::storage::ObjectSink;

pub struct S3Sink {
    client: Client,
}

impl S3Sink {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a sink from ambient AWS configuration.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl ObjectSink for S3Sink {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(AppError::s3)?;

        info!("Wrote {size} bytes to s3://{bucket}/{key}");
        Ok(())
    }
}
