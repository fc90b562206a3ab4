//! Types for torrent metadata.

use serde::{Deserialize, Serialize};

/// Name and file layout of a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentMetadata {
    /// Canonical torrent name.
    pub name: String,
    /// Files in torrent order.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

impl TorrentMetadata {
    /// Build metadata from a name and a list of paths.
    pub fn new<I, S>(name: impl Into<String>, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            files: paths.into_iter().map(FileEntry::new).collect(),
        }
    }

    /// True when every file lives below a top-level folder.
    ///
    /// An empty listing counts as foldered.
    pub fn all_files_in_folders(&self) -> bool {
        self.files.iter().all(FileEntry::is_in_folder)
    }
}

/// One file of a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Forward-slash separated path relative to the torrent root.
    pub path: String,
    /// Size in bytes, when the lookup reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

impl FileEntry {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            length: None,
        }
    }

    /// Whether the path contains a directory component.
    pub fn is_in_folder(&self) -> bool {
        self.path.contains('/')
    }
}
