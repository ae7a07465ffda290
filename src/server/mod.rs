//! HTTP front end for the Ampache XML API.
//!
//! Serves the protocol endpoint for both GET and POST (query string, with
//! form fields layered on top for POST) plus a `/health` check. XML errors
//! carry the protocol code as the HTTP status; `play` and `_get_cover`
//! answer a missing file with a bare 404 instead.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::{Form, Query, State, rejection::FormRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::io::ReaderStream;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::{debug, error, info, warn};

use crate::ampache::xml::{self, ENDPOINT_PATH};
use crate::ampache::{Action, Gateway, Params, Reply, Request};
use crate::auth::SessionManager;
use crate::error::Error;
use crate::library::FileHandle;

/// Maximum request body size (64KB). Requests are a handful of form fields.
pub const MAX_BODY_SIZE: usize = 65_536;

const XML_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    /// Overrides the `Host` header when building links
    pub public_url: Option<String>,
}

/// Build the router with body-limit and timeout layers.
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(ENDPOINT_PATH, get(handle_get).post(handle_post))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
}

/// Bind, serve until Ctrl+C, and sweep expired sessions in the background.
pub async fn run(
    gateway: Gateway,
    addr: &str,
    public_url: Option<String>,
    request_timeout: Duration,
    cleanup_interval: Option<Duration>,
) -> anyhow::Result<()> {
    let sweeper =
        cleanup_interval.map(|every| spawn_session_sweeper(gateway.sessions().clone(), every));

    let state = AppState {
        gateway: Arc::new(gateway),
        public_url,
    };
    let app = router(state, request_timeout);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual = listener.local_addr()?;
    info!(target: "ampache::server", addr = %actual, endpoint = ENDPOINT_PATH, "Ampache gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    info!(target: "ampache::server", "Ampache gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(target: "ampache::server", error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!(target: "ampache::server", "Shutdown requested");
}

/// Periodically delete expired sessions. Validation never depends on this.
fn spawn_session_sweeper(sessions: SessionManager, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = sessions.cleanup().await {
                warn!(target: "ampache::session", error = %e, "Session sweep failed");
            }
        }
    })
}

// ══════════════════════════════════════════════════════════════════════════════
// AXUM HANDLERS
// ══════════════════════════════════════════════════════════════════════════════

/// GET /health
async fn handle_health() -> &'static str {
    "ok"
}

/// GET /server/xml.server.php
async fn handle_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    respond(&state, &headers, query).await
}

/// POST /server/xml.server.php (form fields win over the query string)
async fn handle_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(mut query): Query<HashMap<String, String>>,
    form: Result<Form<HashMap<String, String>>, FormRejection>,
) -> Response {
    match form {
        Ok(Form(fields)) => query.extend(fields),
        Err(e) => debug!(target: "ampache::server", error = %e, "Ignoring unreadable form body"),
    }
    respond(&state, &headers, query).await
}

async fn respond(state: &AppState, headers: &HeaderMap, params: HashMap<String, String>) -> Response {
    let params = Params::new(params);
    let action = match Action::from_name(params.action().unwrap_or_default()) {
        Ok(action) => action,
        Err(e) => {
            debug!(target: "ampache::server", action = ?params.action(), "Unsupported action");
            return error_response(&e);
        }
    };

    let request = Request {
        params,
        base_url: base_url(state, headers),
    };

    match state.gateway.dispatch(action, &request).await {
        Ok(Reply::Xml(body)) => xml_response(StatusCode::OK, body),
        Ok(Reply::File(handle)) => stream_file(handle).await,
        Err(e) if action.is_media() && e.is_not_found() => {
            debug!(target: "ampache::media", action = %action, reason = %e, "Media not found");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Configured public URL, else `http://<Host>`.
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(url) = &state.public_url {
        return url.trim_end_matches('/').to_string();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

fn xml_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE))],
        body,
    )
        .into_response()
}

fn error_response(err: &Error) -> Response {
    let code = err.code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = if status.is_server_error() {
        error!(target: "ampache::server", error = %err, "Request failed");
        "Internal server error".to_string()
    } else {
        err.to_string()
    };
    xml_response(status, xml::error(code, &message))
}

async fn stream_file(handle: FileHandle) -> Response {
    let file = match tokio::fs::File::open(&handle.path).await {
        Ok(file) => file,
        Err(e) => {
            warn!(target: "ampache::media", path = %handle.path.display(), error = %e, "Failed to open media file");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let length = match handle.size {
        Some(size) => Some(size),
        None => file.metadata().await.ok().map(|m| m.len()),
    };

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&handle.mime_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Some(length) = length {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthSettings;
    use crate::auth::token::{epoch_secs, handshake_token, passphrase_hash};
    use crate::db::{SqliteStore, add_api_key};
    use crate::test_utils::{Fixture, insert_file, seed_two_users, temp_store};
    use axum::http::{Method, Request as HttpRequest};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Harness {
        app: Router,
        store: SqliteStore,
        fixture: Fixture,
        dir: TempDir,
    }

    async fn harness() -> Harness {
        let (store, dir) = temp_store().await;
        let fixture = seed_two_users(&store).await;
        add_api_key(&store, "alice", &passphrase_hash("alice-pass"), None)
            .await
            .unwrap();
        let state = AppState {
            gateway: Arc::new(Gateway::from_store(store.clone(), AuthSettings::default())),
            public_url: None,
        };
        Harness {
            app: router(state, Duration::from_secs(30)),
            store,
            fixture,
            dir,
        }
    }

    async fn get(app: &Router, query: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
        let request = HttpRequest::builder()
            .uri(format!("{ENDPOINT_PATH}?{query}"))
            .header(header::HOST, "music.local:8090")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, body)
    }

    async fn login(app: &Router) -> String {
        let ts = epoch_secs().to_string();
        let token = handshake_token(&ts, &passphrase_hash("alice-pass"));
        let (status, _, body) = get(
            app,
            &format!("action=handshake&user=alice&timestamp={ts}&auth={token}"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = String::from_utf8(body).unwrap();
        let start = body.find("<auth>").unwrap() + "<auth>".len();
        let end = body.find("</auth>").unwrap();
        body[start..end].to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness().await;
        let request = HttpRequest::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_action_is_405_xml() {
        let h = harness().await;
        let (status, headers, body) = get(&h.app, "action=nope").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers[header::CONTENT_TYPE], XML_CONTENT_TYPE);
        assert!(String::from_utf8(body).unwrap().contains("<error code=\"405\">"));
    }

    #[tokio::test]
    async fn test_missing_session_is_401_xml() {
        let h = harness().await;
        let (status, _, body) = get(&h.app, "action=artists").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(String::from_utf8(body).unwrap().contains("<error code=\"401\">"));
    }

    #[tokio::test]
    async fn test_listing_links_use_host_header() {
        let h = harness().await;
        let token = login(&h.app).await;
        let (status, headers, body) = get(&h.app, &format!("action=songs&auth={token}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], XML_CONTENT_TYPE);
        let body = String::from_utf8(body).unwrap();
        assert!(body.contains("<url>http://music.local:8090/server/xml.server.php?action=play"));
    }

    #[tokio::test]
    async fn test_post_form_is_accepted() {
        let h = harness().await;
        let token = login(&h.app).await;
        let request = HttpRequest::builder()
            .method(Method::POST)
            .uri(ENDPOINT_PATH)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("action=artists&auth={token}&filter=massive")))
            .unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("<name>Massive Attack</name>"));
        assert!(!body.contains("Metallica"));
    }

    #[tokio::test]
    async fn test_play_streams_bytes() {
        let h = harness().await;
        let token = login(&h.app).await;
        let path = h.dir.path().join("battery.mp3");
        std::fs::write(&path, b"ID3 audio bytes").unwrap();
        insert_file(&h.store, 101, &path.to_string_lossy(), None, None).await;

        let (status, headers, body) = get(
            &h.app,
            &format!("action=play&auth={token}&filter={}", h.fixture.alice_battery),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
        assert_eq!(headers[header::CONTENT_LENGTH], "15");
        assert_eq!(body, b"ID3 audio bytes");
    }

    #[tokio::test]
    async fn test_media_not_found_is_bare_404() {
        let h = harness().await;
        let token = login(&h.app).await;

        for query in [
            format!("action=play&auth={token}&filter={}", h.fixture.alice_battery),
            format!("action=play&auth={token}&filter={}", h.fixture.bob_battery),
            format!("action=_get_cover&auth={token}&filter={}", h.fixture.alice_mezzanine),
            format!("action=play&auth={token}&filter=abc"),
        ] {
            let (status, _, body) = get(&h.app, &query).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{query}");
            assert!(body.is_empty(), "{query}");
        }
    }

    #[tokio::test]
    async fn test_entity_not_found_is_xml_404() {
        let h = harness().await;
        let token = login(&h.app).await;
        let (status, _, body) = get(&h.app, &format!("action=song&auth={token}&filter=9999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(String::from_utf8(body).unwrap().contains("<error code=\"404\">"));
    }
}
