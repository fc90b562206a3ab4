//! Inbound chat message parsing.
//!
//! Extracts the magnet link and optional release hints (title, alternative
//! title, year) from free-form text such as a forwarded tracker post.

mod parser;

pub use parser::parse_message;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by [`parse_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No `magnet:` token followed by a line break.
    #[error("no magnet link found in message")]
    NoMagnetFound,
}

/// Data extracted from one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMessage {
    /// Magnet URI, always starting with `magnet:`.
    pub magnet: String,
    /// Primary title from the header line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Title after the ` / ` separator. Kept for logging only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_title: Option<String>,
    /// Four digit release year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl ParsedMessage {
    /// A message that only carries a magnet link.
    pub fn magnet_only(magnet: impl Into<String>) -> Self {
        Self {
            magnet: magnet.into(),
            title: None,
            alternative_title: None,
            year: None,
        }
    }

    /// `"<title> <year>"` when both hints are present.
    pub fn title_with_year(&self) -> Option<String> {
        match (&self.title, &self.year) {
            (Some(title), Some(year)) => Some(format!("{} {}", title, year)),
            _ => None,
        }
    }
}
