//! Types shared by DSM implementations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Logical DSM service a session is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceKind {
    FileStation,
    DownloadStation,
}

impl ServiceKind {
    /// Value of the `session` parameter on login and logout.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::FileStation => "FileStation",
            ServiceKind::DownloadStation => "DownloadStation",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a `SYNO.API.Info` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiInfo {
    /// CGI path relative to `/webapi`.
    pub path: String,
    pub min_version: u32,
    pub max_version: u32,
}
