//! Mock DSM host for testing.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::dsm::{DsmApi, DsmError, ServiceKind, SessionError};

/// Session handed out by [`MockDsm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSession {
    /// Unique per successful login, starting at 1.
    pub id: u32,
    pub kind: ServiceKind,
}

/// A call made against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DsmCall {
    Open {
        kind: ServiceKind,
        /// `None` when the login was configured to fail.
        session_id: Option<u32>,
    },
    Close {
        kind: ServiceKind,
        session_id: u32,
    },
    CreateFolder {
        session_id: u32,
        name: String,
        parent: String,
    },
    CreateTask {
        session_id: u32,
        uri: String,
        destination: Option<String>,
    },
}

/// A recorded call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDsmCall {
    pub call: DsmCall,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Failures {
    login: HashSet<ServiceKind>,
    logout: bool,
    create_folder: Option<DsmError>,
    create_task: Option<DsmError>,
}

/// Mock implementation of the DsmApi trait.
///
/// Provides controllable behavior for testing:
/// - Record every call, in order
/// - Simulate login, logout, folder and task failures
/// - Check that sessions are closed exactly once
///
/// # Example
///
/// ```rust,ignore
/// let dsm = MockDsm::new();
/// dsm.fail_create_folder(DsmError::Api(ApiErrorCode(101))).await;
///
/// workflow.run(text, &reply).await?;
///
/// assert_eq!(dsm.folders_created().await, vec![]);
/// assert!(dsm.all_sessions_closed_once().await);
/// ```
#[derive(Debug, Default)]
pub struct MockDsm {
    calls: Arc<RwLock<Vec<RecordedDsmCall>>>,
    failures: Arc<RwLock<Failures>>,
    session_counter: Arc<RwLock<u32>>,
}

impl MockDsm {
    /// Create a new mock DSM host where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make logins to `kind` fail.
    pub async fn fail_login(&self, kind: ServiceKind) {
        self.failures.write().await.login.insert(kind);
    }

    /// Make every logout fail.
    pub async fn fail_logout(&self) {
        self.failures.write().await.logout = true;
    }

    /// Make folder creation fail with `error`.
    pub async fn fail_create_folder(&self, error: DsmError) {
        self.failures.write().await.create_folder = Some(error);
    }

    /// Make task creation fail with `error`.
    pub async fn fail_create_task(&self, error: DsmError) {
        self.failures.write().await.create_task = Some(error);
    }

    /// All recorded calls, in order.
    pub async fn calls(&self) -> Vec<DsmCall> {
        self.calls
            .read()
            .await
            .iter()
            .map(|r| r.call.clone())
            .collect()
    }

    /// Recorded calls with timestamps.
    pub async fn recorded_calls(&self) -> Vec<RecordedDsmCall> {
        self.calls.read().await.clone()
    }

    /// `(name, parent)` of every folder creation attempt.
    pub async fn folders_created(&self) -> Vec<(String, String)> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                DsmCall::CreateFolder { name, parent, .. } => Some((name, parent)),
                _ => None,
            })
            .collect()
    }

    /// `(uri, destination)` of every task creation attempt.
    pub async fn tasks_created(&self) -> Vec<(String, Option<String>)> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                DsmCall::CreateTask {
                    uri, destination, ..
                } => Some((uri, destination)),
                _ => None,
            })
            .collect()
    }

    /// Ids of sessions successfully opened for `kind`.
    pub async fn opened_sessions(&self, kind: ServiceKind) -> Vec<u32> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                DsmCall::Open {
                    kind: k,
                    session_id: Some(id),
                } if k == kind => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Ids of sessions closed for `kind`, including failed closes.
    pub async fn closed_sessions(&self, kind: ServiceKind) -> Vec<u32> {
        self.calls()
            .await
            .into_iter()
            .filter_map(|call| match call {
                DsmCall::Close {
                    kind: k,
                    session_id,
                } if k == kind => Some(session_id),
                _ => None,
            })
            .collect()
    }

    /// Every opened session was closed exactly once.
    pub async fn all_sessions_closed_once(&self) -> bool {
        for kind in [ServiceKind::FileStation, ServiceKind::DownloadStation] {
            let mut opened = self.opened_sessions(kind).await;
            let mut closed = self.closed_sessions(kind).await;
            opened.sort_unstable();
            closed.sort_unstable();
            if opened != closed {
                return false;
            }
        }
        true
    }

    async fn record(&self, call: DsmCall) {
        self.calls.write().await.push(RecordedDsmCall {
            call,
            timestamp: Utc::now(),
        });
    }

    async fn next_session_id(&self) -> u32 {
        let mut counter = self.session_counter.write().await;
        *counter += 1;
        *counter
    }
}

#[async_trait]
impl DsmApi for MockDsm {
    type Session = MockSession;

    async fn open(&self, kind: ServiceKind) -> Result<MockSession, SessionError> {
        if self.failures.read().await.login.contains(&kind) {
            self.record(DsmCall::Open {
                kind,
                session_id: None,
            })
            .await;
            return Err(SessionError::LoginFailed {
                service: kind,
                reason: "mock login failure".to_string(),
            });
        }

        let id = self.next_session_id().await;
        self.record(DsmCall::Open {
            kind,
            session_id: Some(id),
        })
        .await;
        Ok(MockSession { id, kind })
    }

    async fn close(&self, session: MockSession) -> Result<(), SessionError> {
        self.record(DsmCall::Close {
            kind: session.kind,
            session_id: session.id,
        })
        .await;

        if self.failures.read().await.logout {
            return Err(SessionError::LogoutFailed {
                service: session.kind,
                reason: "mock logout failure".to_string(),
            });
        }
        Ok(())
    }

    async fn create_folder(
        &self,
        session: &MockSession,
        name: &str,
        parent: &str,
    ) -> Result<(), DsmError> {
        self.record(DsmCall::CreateFolder {
            session_id: session.id,
            name: name.to_string(),
            parent: parent.to_string(),
        })
        .await;

        match &self.failures.read().await.create_folder {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn create_task(
        &self,
        session: &MockSession,
        uri: &str,
        destination: Option<&str>,
    ) -> Result<(), DsmError> {
        self.record(DsmCall::CreateTask {
            session_id: session.id,
            uri: uri.to_string(),
            destination: destination.map(str::to_string),
        })
        .await;

        match &self.failures.read().await.create_task {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
