// src/storage/mod.rs

//! Storage abstractions: the disruption record store the pipeline reads
//! from and the object sink it writes artifacts to.

pub mod dynamo;
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Disruption, Organisation};

pub use dynamo::DynamoStore;
pub use s3::S3Sink;

/// Read side: disruption records and organisation reference data.
#[async_trait]
pub trait DisruptionStore: Send + Sync {
    /// Fetch every disruption currently in the published state.
    async fn fetch_published_disruptions(&self) -> Result<Vec<Disruption>>;

    /// Look up one organisation; `None` when the id is unknown.
    async fn get_organisation(&self, id: &str) -> Result<Option<Organisation>>;
}

/// Write side: one artifact to one bucket.
#[async_trait]
pub trait ObjectSink: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;
}
