//! Mock metadata resolver for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::metadata::{MetadataError, MetadataResolver, TorrentMetadata};

/// Canned response of the mock resolver.
#[derive(Debug, Clone)]
enum MockResponse {
    Found(TorrentMetadata),
    NotFound,
    Unreachable,
}

/// Mock implementation of the MetadataResolver trait.
///
/// Returns a configured response and records the magnet URIs it was asked
/// to resolve.
#[derive(Debug)]
pub struct MockMetadataResolver {
    response: Arc<RwLock<MockResponse>>,
    queries: Arc<RwLock<Vec<String>>>,
}

impl MockMetadataResolver {
    fn with_response(response: MockResponse) -> Self {
        Self {
            response: Arc::new(RwLock::new(response)),
            queries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Resolver answering with `metadata`.
    pub fn with_metadata(metadata: TorrentMetadata) -> Self {
        Self::with_response(MockResponse::Found(metadata))
    }

    /// Resolver answering with an HTTP error.
    pub fn not_found() -> Self {
        Self::with_response(MockResponse::NotFound)
    }

    /// Resolver simulating a network failure.
    pub fn unreachable() -> Self {
        Self::with_response(MockResponse::Unreachable)
    }

    /// Replace the configured metadata.
    pub async fn set_metadata(&self, metadata: TorrentMetadata) {
        *self.response.write().await = MockResponse::Found(metadata);
    }

    /// Magnet URIs passed to `resolve`, in order.
    pub async fn queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }
}

#[async_trait]
impl MetadataResolver for MockMetadataResolver {
    fn name(&self) -> &str {
        "mock"
    }

    async fn resolve(&self, magnet: &str) -> Result<TorrentMetadata, MetadataError> {
        self.queries.write().await.push(magnet.to_string());

        match &*self.response.read().await {
            MockResponse::Found(metadata) => Ok(metadata.clone()),
            MockResponse::NotFound => Err(MetadataError::NotFound { status: 404 }),
            MockResponse::Unreachable => {
                Err(MetadataError::Unreachable("mock connection refused".to_string()))
            }
        }
    }
}
