use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};

use spotifuse::management::{AttemptManager, SessionManager};
use spotifuse::spotify::auth::{self, AuthError};
use spotifuse::spotify::client::{ApiClient, ApiError, ApiRequest};
use spotifuse::types::Session;

// Environment variables are process-wide; every test below takes this lock
// so the token endpoint each one points at never bleeds into another.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

// Stand-in for the provider: /me accepts exactly one bearer token (or none),
// /token grants a configured access token. Both count their calls.
struct Stub {
    accepted_token: Option<String>,
    granted_token: String,
    me_calls: AtomicUsize,
    token_calls: AtomicUsize,
}

async fn me(State(stub): State<Arc<Stub>>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    stub.me_calls.fetch_add(1, Ordering::SeqCst);
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    match &stub.accepted_token {
        Some(token) if bearer == format!("Bearer {}", token) => (
            StatusCode::OK,
            Json(json!({ "id": "user-1", "display_name": "User One" })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
        ),
    }
}

async fn token(State(stub): State<Arc<Stub>>) -> Json<Value> {
    stub.token_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "access_token": stub.granted_token,
        "refresh_token": "rotated-refresh",
    }))
}

async fn start_stub(accepted_token: Option<&str>, granted_token: &str) -> (Arc<Stub>, String) {
    let stub = Arc::new(Stub {
        accepted_token: accepted_token.map(|t| t.to_string()),
        granted_token: granted_token.to_string(),
        me_calls: AtomicUsize::new(0),
        token_calls: AtomicUsize::new(0),
    });

    let app = Router::new()
        .route("/me", get(me))
        .route("/token", post(token))
        .with_state(Arc::clone(&stub));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (stub, base)
}

fn point_env_at(base: &str) {
    // set_var is unsafe in edition 2024; ENV_LOCK serializes all callers.
    unsafe {
        std::env::set_var("SPOTIFY_API_TOKEN_URL", format!("{}/token", base));
        std::env::set_var("SPOTIFY_API_AUTH_CLIENT_ID", "test-client");
        std::env::set_var("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:9/callback");
    }
}

fn stale_client(refresh_token: Option<&str>) -> ApiClient {
    let session = Session::authenticated(
        "stale-token".to_string(),
        refresh_token.map(|t| t.to_string()),
    );
    ApiClient::new(SessionManager::new(session))
}

#[tokio::test]
async fn test_send_refreshes_once_and_retries_with_granted_token() {
    let _guard = env_guard();
    let (stub, base) = start_stub(Some("fresh-token"), "fresh-token").await;
    point_env_at(&base);

    let mut client = stale_client(Some("refresh-1"));
    let response = client
        .send(&ApiRequest::get(format!("{}/me", base)))
        .await
        .unwrap();

    assert!(response.status().is_success());

    // One rejected attempt, one refresh, one retry carrying the new token
    assert_eq!(stub.me_calls.load(Ordering::SeqCst), 2);
    assert_eq!(stub.token_calls.load(Ordering::SeqCst), 1);

    // The session picked up the granted pair
    let session = client.sessions().session();
    assert_eq!(session.access_token.as_deref(), Some("fresh-token"));
    assert_eq!(session.refresh_token.as_deref(), Some("rotated-refresh"));
}

#[tokio::test]
async fn test_send_without_refresh_token_fails_with_zero_refreshes() {
    let _guard = env_guard();
    let (stub, base) = start_stub(Some("fresh-token"), "fresh-token").await;
    point_env_at(&base);

    let mut client = stale_client(None);
    let result = client.send(&ApiRequest::get(format!("{}/me", base))).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(stub.me_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stub.token_calls.load(Ordering::SeqCst), 0);

    // Forced logout: the session is gone
    assert!(!client.sessions().session().is_authenticated());
}

#[tokio::test]
async fn test_send_never_refreshes_twice_for_one_request() {
    let _guard = env_guard();
    // The token endpoint grants a token the resource still rejects
    let (stub, base) = start_stub(None, "still-bad-token").await;
    point_env_at(&base);

    let mut client = stale_client(Some("refresh-1"));
    let result = client.send(&ApiRequest::get(format!("{}/me", base))).await;

    assert!(matches!(result, Err(ApiError::Unauthorized)));

    // Exactly one refresh cycle: send, refresh, retry, give up
    assert_eq!(stub.token_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stub.me_calls.load(Ordering::SeqCst), 2);
    assert!(!client.sessions().session().is_authenticated());
}

#[tokio::test]
async fn test_exchange_without_verifier_makes_no_network_call() {
    let _guard = env_guard();
    let (stub, base) = start_stub(Some("fresh-token"), "fresh-token").await;
    point_env_at(&base);

    // No authorization attempt in flight
    AttemptManager::clear().await.unwrap();

    let result = auth::exchange_code_pkce("some-code").await;

    assert!(matches!(result, Err(AuthError::MissingVerifier)));
    assert_eq!(stub.token_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_authorize_url_is_percent_encoded() {
    let _guard = env_guard();
    unsafe {
        std::env::set_var("SPOTIFY_API_AUTH_URL", "https://accounts.example.com/authorize");
        std::env::set_var("SPOTIFY_API_AUTH_CLIENT_ID", "test-client");
        std::env::set_var("SPOTIFY_API_REDIRECT_URI", "http://127.0.0.1:9/callback");
        std::env::set_var(
            "SPOTIFY_API_AUTH_SCOPE",
            "user-read-private playlist-modify-public playlist-modify-private",
        );
    }

    let url = auth::authorize_url("a-challenge").unwrap();

    // No raw spaces anywhere in the assembled URL
    assert!(!url.as_str().contains(' '));

    // The scope survives encoding and decoding intact
    let scope = url
        .query_pairs()
        .find(|(k, _)| k == "scope")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert_eq!(
        scope,
        "user-read-private playlist-modify-public playlist-modify-private"
    );

    let challenge = url
        .query_pairs()
        .find(|(k, _)| k == "code_challenge")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert_eq!(challenge, "a-challenge");
}
