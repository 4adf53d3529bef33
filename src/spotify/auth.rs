use std::{fmt, sync::Arc, time::Duration};

use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config, error,
    management::{AttemptManager, SessionManager},
    server::start_api_server,
    success,
    types::Session,
    utils, warning,
};

#[derive(Debug)]
pub enum AuthError {
    /// The authorization attempt lost its stored code verifier; the user has
    /// to restart the authorization flow.
    MissingVerifier,
    /// The token endpoint rejected the code exchange or returned a malformed
    /// body. Authorization codes are single-use, so this is never retried.
    TokenExchange(String),
    /// The refresh grant failed; the stored credential is unusable.
    Refresh(String),
    Http(reqwest::Error),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingVerifier => {
                write!(f, "no code verifier stored; restart authorization")
            }
            AuthError::TokenExchange(msg) => write!(f, "token exchange failed: {}", msg),
            AuthError::Refresh(msg) => write!(f, "token refresh failed: {}", msg),
            AuthError::Http(e) => write!(f, "http error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Http(err)
    }
}

/// Runs the complete OAuth 2.0 PKCE authentication flow against Spotify.
///
/// The flow in order:
/// 1. Generates a PKCE code verifier and its SHA-256 challenge.
/// 2. Persists the verifier for the current attempt (a second invocation
///    overwrites it; only one attempt is ever in flight).
/// 3. Starts the local callback server and opens the authorization URL in
///    the user's browser.
/// 4. Waits for the callback handler to complete the code exchange.
/// 5. Persists the resulting session for future runs.
///
/// Browser launch failures degrade to printing the URL for manual
/// navigation. A timeout or failed exchange terminates with an error.
pub async fn auth(shared_state: Arc<Mutex<Option<Session>>>) {
    let pkce = utils::generate_pkce_pair();

    // The verifier must survive until the callback redeems the code.
    if let Err(e) = AttemptManager::begin(&pkce.verifier).await {
        error!("Failed to store code verifier: {}", e);
    }

    // start API server
    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    // Construct the authorization URL
    let auth_url = match authorize_url(&pkce.challenge) {
        Ok(url) => url,
        Err(e) => error!("Failed to build authorization URL: {}", e),
    };

    // Open the authorization URL in the default browser
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    // wait for callback to be hit
    let session = wait_for_session(shared_state).await;

    match session {
        Some(s) => {
            let session_manager = SessionManager::new(s);
            if let Err(e) = session_manager.save().await {
                error!("Failed to save session: {}", e);
            }

            success!("Authentication successful!");
        }
        None => {
            error!("Authentication failed or timed out.");
        }
    }
}

/// Builds the provider authorization URL for the given code challenge.
///
/// Every query value is percent-encoded, so the space-delimited scope list
/// stays well-formed no matter which launcher opens the URL.
pub fn authorize_url(challenge: &str) -> Result<reqwest::Url, String> {
    reqwest::Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", config::spotify_client_id()),
            ("response_type", "code".to_string()),
            ("redirect_uri", config::spotify_redirect_uri()),
            ("code_challenge", challenge.to_string()),
            ("code_challenge_method", "S256".to_string()),
            ("scope", config::spotify_scope()),
        ],
    )
    .map_err(|e| e.to_string())
}

/// Polls the shared state for a session completed by the callback handler,
/// with a 60-second timeout and a 1-second polling interval.
async fn wait_for_session(shared_state: Arc<Mutex<Option<Session>>>) -> Option<Session> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(session) = lock.as_ref() {
            return Some(session.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code for a session using PKCE.
///
/// Requires the verifier persisted when the attempt began; its absence is a
/// hard [`AuthError::MissingVerifier`] and no network call is made. On
/// success the one-time verifier is erased, so re-running the program cannot
/// attempt to redeem the same code a second time.
pub async fn exchange_code_pkce(code: &str) -> Result<Session, AuthError> {
    let verifier = AttemptManager::current()
        .await
        .ok_or(AuthError::MissingVerifier)?;

    let client = Client::new();
    let res = client
        .post(&config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", &config::spotify_client_id()),
            ("code", code),
            ("code_verifier", &verifier),
            ("redirect_uri", &config::spotify_redirect_uri()),
        ])
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(AuthError::TokenExchange(format!("{}: {}", status, body)));
    }

    let json: Value = res.json().await?;
    let access_token = json["access_token"]
        .as_str()
        .ok_or_else(|| AuthError::TokenExchange("response body has no access_token".to_string()))?
        .to_string();
    let refresh_token = json["refresh_token"].as_str().map(|t| t.to_string());

    // The verifier is consumed exactly once.
    if let Err(e) = AttemptManager::clear().await {
        warning!("Failed to discard code verifier: {}", e);
    }

    Ok(Session::authenticated(access_token, refresh_token))
}

/// Exchanges a refresh token for a new access token.
///
/// Returns the fresh access token and, when the provider rotated it, a new
/// refresh token. Any non-success status or a body without an access token
/// means the stored credential is unusable and the caller must log out.
pub async fn refresh_token(refresh_token: &str) -> Result<(String, Option<String>), AuthError> {
    let client = Client::new();
    let res = client
        .post(&config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &config::spotify_client_id()),
        ])
        .send()
        .await
        .map_err(|e| AuthError::Refresh(e.to_string()))?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(AuthError::Refresh(format!("{}: {}", status, body)));
    }

    let json: Value = res
        .json()
        .await
        .map_err(|e| AuthError::Refresh(e.to_string()))?;

    let access_token = json["access_token"]
        .as_str()
        .ok_or_else(|| AuthError::Refresh("response body has no access_token".to_string()))?
        .to_string();
    let rotated_refresh = json["refresh_token"].as_str().map(|t| t.to_string());

    Ok((access_token, rotated_refresh))
}
