//! Synology DSM WebAPI access.
//!
//! This module provides the `DsmApi` trait for session-scoped calls against
//! FileStation and DownloadStation, the HTTP implementation `DsmClient`, and
//! `with_session`, which pairs every successful login with exactly one logout.
//!
//! # Example
//!
//! ```ignore
//! use nasbot_core::dsm::{with_session, DsmApi, DsmClient, ServiceKind};
//!
//! let client = DsmClient::new(config.dsm.clone())?;
//! let name = "Inception 2010".to_string();
//! with_session(&client, ServiceKind::FileStation, move |api, session| {
//!     Box::pin(async move { api.create_folder(session, &name, "/video").await })
//! })
//! .await?;
//! ```

mod client;
mod error;
mod types;

pub use client::{DsmClient, DsmSession};
pub use error::{ApiErrorCode, DsmError, SessionError};
pub use types::{ApiInfo, ServiceKind};

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, warn};

use crate::metrics;

/// Session-scoped operations on a DSM host.
///
/// A session is bound to one [`ServiceKind`] and is valid between a
/// successful [`open`](DsmApi::open) and the matching
/// [`close`](DsmApi::close), which consumes it.
#[async_trait]
pub trait DsmApi: Send + Sync {
    /// Authenticated handle for one logical service.
    type Session: Send + Sync;

    /// Log in and obtain a session bound to `kind`.
    async fn open(&self, kind: ServiceKind) -> Result<Self::Session, SessionError>;

    /// Log out. Callers treat failures as best-effort cleanup.
    async fn close(&self, session: Self::Session) -> Result<(), SessionError>;

    /// Create `name` under `parent` without creating missing parents.
    async fn create_folder(
        &self,
        session: &Self::Session,
        name: &str,
        parent: &str,
    ) -> Result<(), DsmError>;

    /// Queue a download of `uri`, optionally into `destination`.
    ///
    /// Without a destination DownloadStation uses its default location.
    async fn create_task(
        &self,
        session: &Self::Session,
        uri: &str,
        destination: Option<&str>,
    ) -> Result<(), DsmError>;
}

/// Run `op` inside a session bound to `kind`.
///
/// The session is closed after `op` completes, whatever its result. Close
/// failures are logged and never change the returned value. When the login
/// itself fails, `op` is not run and nothing is closed.
pub async fn with_session<D, T, F>(api: &D, kind: ServiceKind, op: F) -> Result<T, DsmError>
where
    D: DsmApi + ?Sized,
    F: for<'s> FnOnce(&'s D, &'s D::Session) -> BoxFuture<'s, Result<T, DsmError>>,
{
    let session = api.open(kind).await?;
    debug!(service = %kind, "DSM session opened");

    let result = op(api, &session).await;

    match api.close(session).await {
        Ok(()) => debug!(service = %kind, "DSM session closed"),
        Err(e) => {
            metrics::LOGOUT_FAILURES
                .with_label_values(&[kind.as_str()])
                .inc();
            warn!(service = %kind, "Failed to close DSM session: {}", e);
        }
    }

    result
}
