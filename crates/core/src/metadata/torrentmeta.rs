//! Client for torrentmeta-style lookup services.
//!
//! The service takes a form field `query` holding the magnet URI and answers
//! with `{"data": {"name": ..., "files": [{"path": ...}]}}`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::MetadataConfig;
use crate::metrics;

use super::{MetadataError, MetadataResolver, TorrentMetadata};

/// HTTP metadata resolver.
pub struct TorrentMetaClient {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    data: TorrentMetadata,
}

impl TorrentMetaClient {
    /// Create a new lookup client.
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| MetadataError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    async fn lookup(&self, magnet: &str) -> Result<TorrentMetadata, MetadataError> {
        let response = self
            .client
            .post(&self.url)
            .form(&[("query", magnet)])
            .send()
            .await
            .map_err(|e| MetadataError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::NotFound {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MetadataError::Unreachable(e.to_string()))?;
        let parsed: LookupResponse = serde_json::from_str(&body)
            .map_err(|e| MetadataError::InvalidResponse(e.to_string()))?;

        Ok(parsed.data)
    }
}

#[async_trait]
impl MetadataResolver for TorrentMetaClient {
    fn name(&self) -> &str {
        "torrentmeta"
    }

    async fn resolve(&self, magnet: &str) -> Result<TorrentMetadata, MetadataError> {
        debug!("Resolving torrent metadata via {}", self.url);

        let started = Instant::now();
        let result = self.lookup(magnet).await;
        metrics::record_remote_call("metadata", "resolve", started, result.is_ok());

        if let Ok(meta) = &result {
            debug!(
                "Resolved torrent '{}' with {} files",
                meta.name,
                meta.files.len()
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lookup_response() {
        let body = r#"{"data":{"name":"Inception.2010.1080p","files":[{"path":"Inception.2010.1080p.mkv"},{"path":"Subs/eng.srt"}]}}"#;
        let parsed: LookupResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.name, "Inception.2010.1080p");
        assert_eq!(parsed.data.files.len(), 2);
        assert!(!parsed.data.all_files_in_folders());
    }

    #[test]
    fn test_lookup_response_missing_data_fails() {
        let body = r#"{"error":"bad magnet"}"#;
        assert!(serde_json::from_str::<LookupResponse>(body).is_err());
    }
}
