//! Torrent metadata lookup.
//!
//! Resolves a magnet URI into the torrent's display name and file listing
//! without downloading anything, through a remote lookup service.

mod torrentmeta;
mod types;

pub use torrentmeta::TorrentMetaClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while resolving metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The lookup answered with an HTTP error status.
    #[error("torrent not found (HTTP {status})")]
    NotFound { status: u16 },

    /// Network failure or timeout.
    #[error("metadata service unreachable: {0}")]
    Unreachable(String),

    /// The lookup answered 2xx but the body was not valid metadata.
    #[error("invalid metadata response: {0}")]
    InvalidResponse(String),
}

/// A source of torrent metadata.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Returns the name of this resolver implementation.
    fn name(&self) -> &str;

    /// Resolve metadata for a magnet URI. Performs exactly one lookup.
    async fn resolve(&self, magnet: &str) -> Result<TorrentMetadata, MetadataError>;
}
