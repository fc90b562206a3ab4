//! Destination policy: whether a torrent gets its own folder on the NAS.
//!
//! Torrents that already unpack into a top-level folder are downloaded as-is.
//! Flat torrents (any file at the root) get a dedicated folder named after the
//! release, so the video share does not fill up with loose files.

mod sanitize;

pub use sanitize::sanitize_folder_name;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DestinationConfig;
use crate::message::ParsedMessage;
use crate::metadata::TorrentMetadata;

/// Outcome of [`DestinationPolicy::decide`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationDecision {
    /// The torrent has at least one root-level file.
    pub needs_folder: bool,
    /// Sanitized folder name; `None` when no folder is required or the
    /// name sanitized down to nothing.
    pub folder_name: Option<String>,
    /// Absolute DownloadStation destination for the folder.
    pub destination_path: Option<String>,
}

impl DestinationDecision {
    /// Download into the service's default location.
    pub fn default_location(needs_folder: bool) -> Self {
        Self {
            needs_folder,
            folder_name: None,
            destination_path: None,
        }
    }
}

/// Computes destination decisions against configured roots.
#[derive(Debug, Clone)]
pub struct DestinationPolicy {
    config: DestinationConfig,
}

impl DestinationPolicy {
    pub fn new(config: DestinationConfig) -> Self {
        Self { config }
    }

    /// FileStation parent under which folders are created.
    pub fn folder_parent(&self) -> &str {
        &self.config.folder_parent
    }

    /// Decide where a torrent should be downloaded.
    pub fn decide(&self, metadata: &TorrentMetadata, parsed: &ParsedMessage) -> DestinationDecision {
        if metadata.all_files_in_folders() {
            debug!("Torrent '{}' already unpacks into a folder", metadata.name);
            return DestinationDecision::default_location(false);
        }

        let raw_name = parsed
            .title_with_year()
            .unwrap_or_else(|| metadata.name.clone());
        let folder_name = sanitize_folder_name(&raw_name);

        if folder_name.is_empty() {
            warn!(
                "Folder name '{}' is empty after sanitization, using default location",
                raw_name
            );
            return DestinationDecision::default_location(true);
        }

        let destination_path = format!(
            "{}/{}",
            self.config.download_root.trim_end_matches('/'),
            folder_name
        );

        DestinationDecision {
            needs_folder: true,
            folder_name: Some(folder_name),
            destination_path: Some(destination_path),
        }
    }
}

impl Default for DestinationPolicy {
    fn default() -> Self {
        Self::new(DestinationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed_with(title: Option<&str>, year: Option<&str>) -> ParsedMessage {
        ParsedMessage {
            magnet: "magnet:?xt=urn:btih:abc".to_string(),
            title: title.map(str::to_string),
            alternative_title: Some("Alt".to_string()),
            year: year.map(str::to_string),
        }
    }

    #[test]
    fn test_foldered_torrent_needs_no_folder() {
        let meta = TorrentMetadata::new("Movie", ["Movie/a.mkv", "Movie/b.srt"]);
        let decision = DestinationPolicy::default().decide(&meta, &parsed_with(Some("Movie"), Some("2001")));
        assert_eq!(decision, DestinationDecision::default_location(false));
    }

    #[test]
    fn test_title_and_year_name_the_folder() {
        let meta = TorrentMetadata::new("Inception.2010.1080p", ["a.mkv", "sub/b.srt"]);
        let decision =
            DestinationPolicy::default().decide(&meta, &parsed_with(Some("Inception"), Some("2010")));
        assert!(decision.needs_folder);
        assert_eq!(decision.folder_name.as_deref(), Some("Inception 2010"));
        assert_eq!(
            decision.destination_path.as_deref(),
            Some("/volume1/video/Inception 2010")
        );
    }

    #[test]
    fn test_falls_back_to_torrent_name_without_year() {
        let meta = TorrentMetadata::new("Some: Release", ["file.mkv"]);
        let decision = DestinationPolicy::default().decide(&meta, &parsed_with(Some("Title"), None));
        assert_eq!(decision.folder_name.as_deref(), Some("Some_ Release"));
    }

    #[test]
    fn test_falls_back_to_torrent_name_without_hints() {
        let meta = TorrentMetadata::new("Release.Name", ["file.mkv"]);
        let decision = DestinationPolicy::default().decide(&meta, &ParsedMessage::magnet_only("magnet:?x"));
        assert_eq!(decision.folder_name.as_deref(), Some("Release.Name"));
        assert_eq!(
            decision.destination_path.as_deref(),
            Some("/volume1/video/Release.Name")
        );
    }

    #[test]
    fn test_empty_sanitized_name_uses_default_location() {
        let meta = TorrentMetadata::new("...", ["file.mkv"]);
        let decision = DestinationPolicy::default().decide(&meta, &ParsedMessage::magnet_only("magnet:?x"));
        assert!(decision.needs_folder);
        assert!(decision.folder_name.is_none());
        assert!(decision.destination_path.is_none());
    }

    #[test]
    fn test_custom_root_with_trailing_slash() {
        let policy = DestinationPolicy::new(DestinationConfig {
            folder_parent: "/movies".to_string(),
            download_root: "/volume2/movies/".to_string(),
        });
        let meta = TorrentMetadata::new("X", ["x.mkv"]);
        let decision = policy.decide(&meta, &parsed_with(Some("Heat"), Some("1995")));
        assert_eq!(decision.destination_path.as_deref(), Some("/volume2/movies/Heat 1995"));
        assert_eq!(policy.folder_parent(), "/movies");
    }

    #[test]
    fn test_empty_listing_needs_no_folder() {
        let meta = TorrentMetadata::new("X", Vec::<String>::new());
        let decision = DestinationPolicy::default().decide(&meta, &ParsedMessage::magnet_only("magnet:?x"));
        assert!(!decision.needs_folder);
    }
}
