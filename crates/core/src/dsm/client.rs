//! DSM WebAPI client over HTTP.

use std::borrow::Cow;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::DsmConfig;
use crate::metrics;

use super::{ApiErrorCode, ApiInfo, DsmApi, DsmError, ServiceKind, SessionError};

const AUTH_CGI: &str = "auth.cgi";
const QUERY_CGI: &str = "query.cgi";
const CREATE_FOLDER_CGI: &str = "FileStation/file_crtfdr.cgi";
const TASK_CGI: &str = "DownloadStation/task.cgi";

/// Envelope every WebAPI response is wrapped in.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
}

/// Authenticated DSM session.
///
/// Owns its own HTTP client so the login cookie is never shared with another
/// session or service.
pub struct DsmSession {
    kind: ServiceKind,
    client: Client,
}

impl DsmSession {
    pub fn kind(&self) -> ServiceKind {
        self.kind
    }
}

/// DSM WebAPI client.
pub struct DsmClient {
    config: DsmConfig,
    base_url: String,
    /// Cookie-less client for unauthenticated listing calls.
    info_client: Client,
}

impl DsmClient {
    /// Create a new DSM client.
    pub fn new(config: DsmConfig) -> Result<Self, DsmError> {
        let info_client = Client::builder()
            .timeout(Duration::from_secs(config.listing_timeout_secs as u64))
            .build()?;

        Ok(Self {
            base_url: config.base_url(),
            config,
            info_client,
        })
    }

    fn url(&self, cgi: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), cgi)
    }

    /// HTTP client with its own cookie jar for a new session.
    fn session_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs as u64))
            .cookie_store(true)
            .build()
    }

    /// Query which Auth and DownloadStation.Task API versions the host serves.
    ///
    /// Does not need a session. Uses the listing timeout.
    pub async fn api_info(&self) -> Result<HashMap<String, ApiInfo>, DsmError> {
        let started = Instant::now();
        let result = self.fetch_api_info().await;
        metrics::record_remote_call("dsm_info", "query", started, result.is_ok());
        result
    }

    async fn fetch_api_info(&self) -> Result<HashMap<String, ApiInfo>, DsmError> {
        let response = self
            .info_client
            .get(self.url(QUERY_CGI))
            .query(&[
                ("api", "SYNO.API.Info"),
                ("version", "1"),
                ("method", "query"),
                ("query", "SYNO.API.Auth,SYNO.DownloadStation.Task"),
            ])
            .send()
            .await?;
        let info: Option<HashMap<String, ApiInfo>> = read_envelope(response).await?;
        Ok(info.unwrap_or_default())
    }

    async fn login(&self, client: &Client, kind: ServiceKind) -> Result<(), String> {
        let response = client
            .get(self.url(AUTH_CGI))
            .query(&[
                ("api", "SYNO.API.Auth"),
                ("version", "3"),
                ("method", "login"),
                ("account", self.config.account.as_str()),
                ("passwd", self.config.password.as_str()),
                ("session", kind.as_str()),
                ("format", "cookie"),
            ])
            .send()
            .await
            .map_err(|e| DsmError::from(e).to_string())?;

        read_envelope::<serde_json::Value>(response)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn logout(&self, session: &DsmSession) -> Result<(), String> {
        let response = session
            .client
            .get(self.url(AUTH_CGI))
            .query(&[
                ("api", "SYNO.API.Auth"),
                ("version", "1"),
                ("method", "logout"),
                ("session", session.kind.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DsmError::from(e).to_string())?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }
        Ok(())
    }

    async fn post_form(
        &self,
        session: &DsmSession,
        cgi: &str,
        params: &[(&str, &str)],
    ) -> Result<(), DsmError> {
        let response = session
            .client
            .post(self.url(cgi))
            .form(params)
            .send()
            .await?;
        read_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }
}

/// Check status and embedded error code, then return `data`.
///
/// DSM reports most failures with HTTP 200 and an `error` object, so the
/// body is inspected regardless of status.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<Option<T>, DsmError> {
    let status = response.status();
    if !status.is_success() {
        return Err(DsmError::Transport(format!("HTTP {}", status)));
    }

    let body = response.text().await?;
    let envelope: ApiEnvelope<T> = serde_json::from_str(&body).map_err(|e| {
        DsmError::Transport(format!(
            "unreadable response ({}): {}",
            e,
            body.chars().take(100).collect::<String>()
        ))
    })?;

    if let Some(error) = envelope.error {
        return Err(DsmError::Api(ApiErrorCode(error.code)));
    }
    Ok(envelope.data)
}

/// Percent-decode a magnet URI the way DownloadStation expects it.
///
/// Invalid UTF-8 is replaced with U+FFFD.
fn decode_source(uri: &str) -> String {
    let bytes = urlencoding::decode_binary(uri.as_bytes());
    match String::from_utf8_lossy(&bytes) {
        Cow::Borrowed(decoded) => decoded.to_string(),
        Cow::Owned(decoded) => {
            debug!("Magnet URI is not valid UTF-8 after decoding, replaced: {}", decoded);
            decoded
        }
    }
}

#[async_trait]
impl DsmApi for DsmClient {
    type Session = DsmSession;

    async fn open(&self, kind: ServiceKind) -> Result<DsmSession, SessionError> {
        let started = Instant::now();
        let login_failed = |reason: String| SessionError::LoginFailed {
            service: kind,
            reason,
        };

        let client = self
            .session_client()
            .map_err(|e| login_failed(e.to_string()))?;
        let result = self.login(&client, kind).await;
        metrics::record_remote_call(kind.as_str(), "login", started, result.is_ok());
        result.map_err(login_failed)?;

        debug!("Logged in to {} as {}", kind, self.config.account);
        Ok(DsmSession { kind, client })
    }

    async fn close(&self, session: DsmSession) -> Result<(), SessionError> {
        let started = Instant::now();
        let result = self.logout(&session).await;
        metrics::record_remote_call(session.kind.as_str(), "logout", started, result.is_ok());
        result.map_err(|reason| SessionError::LogoutFailed {
            service: session.kind,
            reason,
        })
    }

    async fn create_folder(
        &self,
        session: &DsmSession,
        name: &str,
        parent: &str,
    ) -> Result<(), DsmError> {
        debug!("Creating folder '{}' under '{}'", name, parent);

        let started = Instant::now();
        let result = self
            .post_form(
                session,
                CREATE_FOLDER_CGI,
                &[
                    ("api", "SYNO.FileStation.CreateFolder"),
                    ("version", "1"),
                    ("method", "create"),
                    ("folder_path", parent),
                    ("name", name),
                    ("force_parent", "false"),
                ],
            )
            .await;
        metrics::record_remote_call(session.kind.as_str(), "create_folder", started, result.is_ok());
        result
    }

    async fn create_task(
        &self,
        session: &DsmSession,
        uri: &str,
        destination: Option<&str>,
    ) -> Result<(), DsmError> {
        let source = decode_source(uri);
        debug!("Creating download task (destination: {:?})", destination);

        let mut params = vec![
            ("api", "SYNO.DownloadStation.Task"),
            ("version", "1"),
            ("method", "create"),
            ("uri", source.as_str()),
        ];
        if let Some(dest) = destination {
            params.push(("destination", dest));
        }

        let started = Instant::now();
        let result = self.post_form(session, TASK_CGI, &params).await;
        metrics::record_remote_call(session.kind.as_str(), "create_task", started, result.is_ok());
        result
    }
}
