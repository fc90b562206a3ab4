//! HTTP-level tests for the DSM and metadata clients.
//!
//! A small axum app stands in for the NAS and the lookup service. It records
//! every request so the tests can check parameters and cookies.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Form, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use nasbot_core::{
    testing::fixtures, with_session, ApiErrorCode, DsmApi, DsmClient, DsmConfig, DsmError,
    MetadataConfig, MetadataError, MetadataResolver, ServiceKind, SessionError,
    TorrentMetaClient,
};

const PASSWORD: &str = "secret";

/// One request seen by the fake server.
#[derive(Debug, Clone)]
struct Seen {
    endpoint: &'static str,
    params: HashMap<String, String>,
    cookie: Option<String>,
}

#[derive(Clone, Default)]
struct FakeNas {
    seen: Arc<Mutex<Vec<Seen>>>,
    logins: Arc<Mutex<u32>>,
    fail_logout: Arc<AtomicBool>,
}

impl FakeNas {
    fn record(&self, endpoint: &'static str, params: HashMap<String, String>, headers: &HeaderMap) {
        let cookie = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push(Seen {
            endpoint,
            params,
            cookie,
        });
    }

    fn seen(&self, endpoint: &str) -> Vec<Seen> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.endpoint == endpoint)
            .cloned()
            .collect()
    }
}

async fn auth(
    State(nas): State<FakeNas>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    nas.record("auth", params.clone(), &headers);

    match params.get("method").map(String::as_str) {
        Some("login") if params.get("passwd").map(String::as_str) == Some(PASSWORD) => {
            let id = {
                let mut logins = nas.logins.lock().unwrap();
                *logins += 1;
                *logins
            };
            let session = params.get("session").cloned().unwrap_or_default();
            (
                [(
                    header::SET_COOKIE,
                    format!("id={}-{}; Path=/webapi", session, id),
                )],
                Json(json!({"data": {"sid": "ignored"}, "success": true})),
            )
                .into_response()
        }
        Some("login") => Json(json!({"error": {"code": 400}, "success": false})).into_response(),
        Some("logout") if nas.fail_logout.load(Ordering::SeqCst) => {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Some("logout") => Json(json!({"success": true})).into_response(),
        _ => Json(json!({"error": {"code": 103}, "success": false})).into_response(),
    }
}

async fn query_info(
    State(nas): State<FakeNas>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    nas.record("query", params, &headers);
    Json(json!({
        "data": {
            "SYNO.API.Auth": {"path": "auth.cgi", "minVersion": 1, "maxVersion": 6},
            "SYNO.DownloadStation.Task": {"path": "DownloadStation/task.cgi", "minVersion": 1, "maxVersion": 3}
        },
        "success": true
    }))
}

/// Folder "Taken" answers with error 101, folder "Broken" with HTTP 500.
async fn create_folder(
    State(nas): State<FakeNas>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let name = params.get("name").cloned().unwrap_or_default();
    nas.record("create_folder", params, &headers);
    match name.as_str() {
        "Taken" => Json(json!({"error": {"code": 101}, "success": false})).into_response(),
        "Broken" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => Json(json!({"data": {"folders": []}, "success": true})).into_response(),
    }
}

/// Destination "/denied" answers with error 105, "/broken" with HTTP 502.
async fn create_task(
    State(nas): State<FakeNas>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> Response {
    let destination = params.get("destination").cloned();
    nas.record("create_task", params, &headers);
    match destination.as_deref() {
        Some("/denied") => Json(json!({"error": {"code": 105}, "success": false})).into_response(),
        Some("/broken") => StatusCode::BAD_GATEWAY.into_response(),
        _ => Json(json!({"success": true})).into_response(),
    }
}

async fn lookup(Form(params): Form<HashMap<String, String>>) -> Response {
    match params.get("query").map(String::as_str) {
        Some(fixtures::MAGNET) => Json(json!({
            "data": {
                "name": "Sample Release",
                "files": [
                    {"path": "Sample Release.mkv", "length": 1024},
                    {"path": "Subs/eng.srt"}
                ]
            }
        }))
        .into_response(),
        Some("magnet:?garbage") => (StatusCode::OK, "<html>oops</html>").into_response(),
        _ => (StatusCode::NOT_FOUND, "unknown torrent").into_response(),
    }
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn start_nas() -> (FakeNas, SocketAddr) {
    let nas = FakeNas::default();
    let app = Router::new()
        .route("/webapi/auth.cgi", get(auth))
        .route("/webapi/query.cgi", get(query_info))
        .route("/webapi/FileStation/file_crtfdr.cgi", post(create_folder))
        .route("/webapi/DownloadStation/task.cgi", post(create_task))
        .with_state(nas.clone());
    let addr = spawn(app).await;
    (nas, addr)
}

fn dsm_config(addr: SocketAddr, password: &str) -> DsmConfig {
    DsmConfig {
        host: "localhost".to_string(),
        port: addr.port(),
        account: "admin".to_string(),
        password: password.to_string(),
        timeout_secs: 5,
        listing_timeout_secs: 5,
        probe_on_start: false,
    }
}

async fn client_for(addr: SocketAddr) -> DsmClient {
    DsmClient::new(dsm_config(addr, PASSWORD)).unwrap()
}

#[tokio::test]
async fn test_login_sends_credentials_and_session_name() {
    let (nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let session = client.open(ServiceKind::FileStation).await.unwrap();
    assert_eq!(session.kind(), ServiceKind::FileStation);

    let logins = nas.seen("auth");
    assert_eq!(logins.len(), 1);
    let params = &logins[0].params;
    assert_eq!(params["api"], "SYNO.API.Auth");
    assert_eq!(params["version"], "3");
    assert_eq!(params["method"], "login");
    assert_eq!(params["account"], "admin");
    assert_eq!(params["passwd"], PASSWORD);
    assert_eq!(params["session"], "FileStation");
    assert_eq!(params["format"], "cookie");
}

#[tokio::test]
async fn test_session_cookie_is_sent_on_calls_and_logout() {
    let (nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let session = client.open(ServiceKind::FileStation).await.unwrap();
    client
        .create_folder(&session, "Inception 2010", "/video")
        .await
        .unwrap();
    client.close(session).await.unwrap();

    let folders = nas.seen("create_folder");
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].cookie.as_deref(), Some("id=FileStation-1"));
    let params = &folders[0].params;
    assert_eq!(params["api"], "SYNO.FileStation.CreateFolder");
    assert_eq!(params["method"], "create");
    assert_eq!(params["folder_path"], "/video");
    assert_eq!(params["name"], "Inception 2010");
    assert_eq!(params["force_parent"], "false");

    let auth = nas.seen("auth");
    let logout = auth.last().unwrap();
    assert_eq!(logout.params["method"], "logout");
    assert_eq!(logout.params["version"], "1");
    assert_eq!(logout.params["session"], "FileStation");
    assert_eq!(logout.cookie.as_deref(), Some("id=FileStation-1"));
}

#[tokio::test]
async fn test_sessions_never_share_cookies() {
    let (nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let files = client.open(ServiceKind::FileStation).await.unwrap();
    let downloads = client.open(ServiceKind::DownloadStation).await.unwrap();
    client
        .create_task(&downloads, fixtures::MAGNET, None)
        .await
        .unwrap();

    let tasks = nas.seen("create_task");
    assert_eq!(tasks[0].cookie.as_deref(), Some("id=DownloadStation-2"));

    client.close(files).await.unwrap();
    client.close(downloads).await.unwrap();
}

#[tokio::test]
async fn test_create_task_decodes_uri_and_sets_destination() {
    let (nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let session = client.open(ServiceKind::DownloadStation).await.unwrap();
    client
        .create_task(&session, fixtures::MAGNET, Some("/volume1/video/Title 2010"))
        .await
        .unwrap();
    client.close(session).await.unwrap();

    let tasks = nas.seen("create_task");
    let params = &tasks[0].params;
    assert_eq!(params["api"], "SYNO.DownloadStation.Task");
    assert_eq!(params["method"], "create");
    assert_eq!(
        params["uri"],
        "magnet:?xt=urn:btih:c9e15763f722f23e98a29decdfae341b98d53056&dn=Sample Release"
    );
    assert_eq!(params["destination"], "/volume1/video/Title 2010");
}

#[tokio::test]
async fn test_create_task_without_destination_omits_field() {
    let (nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let session = client.open(ServiceKind::DownloadStation).await.unwrap();
    client
        .create_task(&session, fixtures::MAGNET, None)
        .await
        .unwrap();
    client.close(session).await.unwrap();

    let tasks = nas.seen("create_task");
    assert!(!tasks[0].params.contains_key("destination"));
}

#[tokio::test]
async fn test_create_folder_embedded_error_code_is_surfaced() {
    let (_nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let session = client.open(ServiceKind::FileStation).await.unwrap();
    let result = client.create_folder(&session, "Taken", "/video").await;
    client.close(session).await.unwrap();

    let err = result.unwrap_err();
    assert_eq!(err, DsmError::Api(ApiErrorCode(101)));
    assert!(err.to_string().contains("Invalid parameter"));
}

#[tokio::test]
async fn test_wrong_password_is_login_failure() {
    let (_nas, addr) = start_nas().await;
    let client = DsmClient::new(dsm_config(addr, "wrong")).unwrap();

    let result = client.open(ServiceKind::DownloadStation).await;

    assert!(matches!(
        result,
        Err(SessionError::LoginFailed {
            service: ServiceKind::DownloadStation,
            ..
        })
    ));
}

#[tokio::test]
async fn test_http_error_is_login_failure() {
    let app = Router::new().fallback(|| async { StatusCode::INTERNAL_SERVER_ERROR });
    let addr = spawn(app).await;
    let client = client_for(addr).await;

    let result = client.open(ServiceKind::FileStation).await;

    match result {
        Err(SessionError::LoginFailed { reason, .. }) => assert!(reason.contains("500")),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("login against a failing host succeeded"),
    }
}

#[tokio::test]
async fn test_create_task_embedded_error_code_is_surfaced() {
    let (nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let session = client.open(ServiceKind::DownloadStation).await.unwrap();
    let result = client
        .create_task(&session, fixtures::MAGNET, Some("/denied"))
        .await;
    client.close(session).await.unwrap();

    assert_eq!(result, Err(DsmError::Api(ApiErrorCode(105))));
    assert_eq!(nas.seen("create_task").len(), 1);
}

#[tokio::test]
async fn test_create_folder_http_error_is_transport_failure() {
    let (_nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let session = client.open(ServiceKind::FileStation).await.unwrap();
    let result = client.create_folder(&session, "Broken", "/video").await;
    client.close(session).await.unwrap();

    match result {
        Err(DsmError::Transport(reason)) => assert!(reason.contains("500")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_task_http_error_is_transport_failure() {
    let (_nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let session = client.open(ServiceKind::DownloadStation).await.unwrap();
    let result = client
        .create_task(&session, fixtures::MAGNET, Some("/broken"))
        .await;
    client.close(session).await.unwrap();

    match result {
        Err(DsmError::Transport(reason)) => assert!(reason.contains("502")),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_logout_http_error_is_logout_failure() {
    let (nas, addr) = start_nas().await;
    nas.fail_logout.store(true, Ordering::SeqCst);
    let client = client_for(addr).await;

    let session = client.open(ServiceKind::FileStation).await.unwrap();
    let result = client.close(session).await;

    match result {
        Err(SessionError::LogoutFailed { service, reason }) => {
            assert_eq!(service, ServiceKind::FileStation);
            assert!(reason.contains("500"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_with_session_absorbs_logout_failure() {
    let (nas, addr) = start_nas().await;
    nas.fail_logout.store(true, Ordering::SeqCst);
    let client = client_for(addr).await;

    let result = with_session(&client, ServiceKind::DownloadStation, |api, session| {
        Box::pin(async move { api.create_task(session, fixtures::MAGNET, None).await })
    })
    .await;

    assert_eq!(result, Ok(()));
    assert_eq!(nas.seen("create_task").len(), 1);
}

#[tokio::test]
async fn test_with_session_logs_out_after_failed_operation() {
    let (nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let result = with_session(&client, ServiceKind::FileStation, |api, session| {
        Box::pin(async move { api.create_folder(session, "Taken", "/video").await })
    })
    .await;

    assert_eq!(result, Err(DsmError::Api(ApiErrorCode(101))));
    let methods: Vec<String> = nas
        .seen("auth")
        .into_iter()
        .map(|s| s.params["method"].clone())
        .collect();
    assert_eq!(methods, vec!["login", "logout"]);
}

#[tokio::test]
async fn test_api_info_lists_services() {
    let (nas, addr) = start_nas().await;
    let client = client_for(addr).await;

    let apis = client.api_info().await.unwrap();

    assert_eq!(apis["SYNO.API.Auth"].path, "auth.cgi");
    assert_eq!(apis["SYNO.DownloadStation.Task"].max_version, 3);
    let queries = nas.seen("query");
    assert_eq!(queries[0].params["api"], "SYNO.API.Info");
    assert_eq!(
        queries[0].params["query"],
        "SYNO.API.Auth,SYNO.DownloadStation.Task"
    );
    assert!(queries[0].cookie.is_none());
}

async fn start_lookup() -> TorrentMetaClient {
    let addr = spawn(Router::new().route("/", post(lookup))).await;
    TorrentMetaClient::new(&MetadataConfig {
        url: format!("http://{}/", addr),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_metadata_lookup_resolves_files() {
    let resolver = start_lookup().await;

    let metadata = resolver.resolve(fixtures::MAGNET).await.unwrap();

    assert_eq!(metadata.name, "Sample Release");
    assert_eq!(metadata.files.len(), 2);
    assert_eq!(metadata.files[0].length, Some(1024));
    assert!(!metadata.all_files_in_folders());
}

#[tokio::test]
async fn test_metadata_http_error_is_not_found() {
    let resolver = start_lookup().await;

    let result = resolver.resolve("magnet:?xt=urn:btih:unknown").await;

    assert!(matches!(result, Err(MetadataError::NotFound { status: 404 })));
}

#[tokio::test]
async fn test_metadata_garbage_body_is_invalid_response() {
    let resolver = start_lookup().await;

    let result = resolver.resolve("magnet:?garbage").await;

    assert!(matches!(result, Err(MetadataError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_metadata_connection_refused_is_unreachable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let resolver = TorrentMetaClient::new(&MetadataConfig {
        url: format!("http://127.0.0.1:{}/", port),
        timeout_secs: 5,
    })
    .unwrap();

    let result = resolver.resolve(fixtures::MAGNET).await;

    assert!(matches!(result, Err(MetadataError::Unreachable(_))));
}
