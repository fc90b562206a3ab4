//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits,
//! allowing end-to-end workflow tests without a NAS, a metadata service or a
//! chat transport.
//!
//! # Example
//!
//! ```rust,ignore
//! use nasbot_core::testing::{fixtures, MockDsm, MockMetadataResolver, RecordingReply};
//!
//! let dsm = Arc::new(MockDsm::new());
//! let resolver = Arc::new(MockMetadataResolver::with_metadata(fixtures::flat_metadata("X")));
//! let reply = RecordingReply::new();
//!
//! let workflow = MagnetWorkflow::new(resolver, dsm.clone(), DestinationPolicy::default());
//! workflow.run(&fixtures::tracker_post("Title / Alt [2010, drama]"), &reply).await?;
//! ```

mod mock_dsm;
mod mock_metadata;
mod recording_reply;

pub use mock_dsm::{DsmCall, MockDsm, MockSession, RecordedDsmCall};
pub use mock_metadata::MockMetadataResolver;
pub use recording_reply::RecordingReply;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::metadata::TorrentMetadata;

    /// Magnet link used by the fixtures.
    pub const MAGNET: &str =
        "magnet:?xt=urn:btih:c9e15763f722f23e98a29decdfae341b98d53056&dn=Sample%20Release";

    /// A forwarded tracker post with a release line and the fixture magnet.
    pub fn tracker_post(release_line: &str) -> String {
        format!(
            "Check this one out:\n{}\n{}\nSize: 14.2 GB\n",
            release_line, MAGNET
        )
    }

    /// A message carrying only the fixture magnet.
    pub fn bare_magnet() -> String {
        format!("{}\n", MAGNET)
    }

    /// Metadata with one root-level video file and a subtitles folder.
    pub fn flat_metadata(name: &str) -> TorrentMetadata {
        TorrentMetadata::new(
            name,
            [format!("{}.mkv", name), "Subs/eng.srt".to_string()],
        )
    }

    /// Metadata whose files all live under a top-level folder.
    pub fn foldered_metadata(name: &str) -> TorrentMetadata {
        TorrentMetadata::new(
            name,
            [format!("{}/{}.mkv", name, name), format!("{}/sample.mkv", name)],
        )
    }
}
