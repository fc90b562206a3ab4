//! Types for the magnet workflow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::MetadataError;

/// Interim acknowledgement sent once metadata is resolved.
pub const PREPARING_MESSAGE: &str = "Preparing torrent for download...";

/// Fatal workflow errors that produce no chat reply.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Metadata service unreachable or answering garbage.
    #[error("metadata lookup failed: {0}")]
    MetadataUnavailable(#[source] MetadataError),
}

/// User-visible terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// No magnet link in the message.
    MagnetNotFound,
    /// Metadata lookup answered with an HTTP error.
    TorrentNotFound,
    /// DownloadStation rejected the task or could not be reached.
    TaskFailed,
    /// Task queued; `folder` is the dedicated folder, if one was created.
    Queued { folder: Option<String> },
}

impl Outcome {
    /// Final chat reply for this outcome.
    pub fn reply_text(&self) -> String {
        match self {
            Outcome::MagnetNotFound => "Magnet link not found!".to_string(),
            Outcome::TorrentNotFound => "Torrent not found!".to_string(),
            Outcome::TaskFailed => "Failed to create the download task!".to_string(),
            Outcome::Queued { folder: Some(folder) } => {
                format!("Torrent queued for download! Folder: {}", folder)
            }
            Outcome::Queued { folder: None } => {
                "Torrent queued for download! Folder: default location".to_string()
            }
        }
    }

    /// Label used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::MagnetNotFound => "magnet_not_found",
            Outcome::TorrentNotFound => "torrent_not_found",
            Outcome::TaskFailed => "task_failed",
            Outcome::Queued { .. } => "queued",
        }
    }
}
