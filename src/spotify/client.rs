use std::fmt;

use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;

use crate::{management::SessionManager, spotify::auth, types::SessionStatus, warning};

use super::auth::AuthError;

#[derive(Debug)]
pub enum ApiError {
    /// No access token is available at all; the user never authenticated or
    /// was logged out.
    Unauthenticated,
    /// The provider rejected the request as unauthorized and no recovery was
    /// possible within the single allowed refresh cycle.
    Unauthorized,
    Auth(AuthError),
    Http(reqwest::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthenticated => {
                write!(f, "not authenticated; run spotifuse auth")
            }
            ApiError::Unauthorized => write!(f, "request unauthorized; run spotifuse auth"),
            ApiError::Auth(e) => write!(f, "{}", e),
            ApiError::Http(e) => write!(f, "http error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

/// A description of one logical API request. Kept as data instead of a
/// prebuilt `reqwest` request so the client can rebuild it for the single
/// retry after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(url: String) -> Self {
        ApiRequest {
            method: Method::GET,
            url,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: String, body: Value) -> Self {
        ApiRequest {
            method: Method::POST,
            url,
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// What to do when a request comes back unauthorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedAction {
    /// First failure for this logical request and a refresh token exists.
    AttemptRefresh,
    /// Either the one refresh cycle is spent or there is nothing to refresh
    /// with. The session is cleared and the failure surfaces to the caller.
    ClearSession,
}

/// At most one refresh cycle per logical request, so a persistently invalid
/// credential cannot loop.
pub fn on_unauthorized(refreshes_used: u8, has_refresh_token: bool) -> UnauthorizedAction {
    if refreshes_used == 0 && has_refresh_token {
        UnauthorizedAction::AttemptRefresh
    } else {
        UnauthorizedAction::ClearSession
    }
}

/// Bearer-authenticated client for the Spotify Web API.
///
/// Wraps every outgoing resource call: it captures the current access token
/// before sending (capture-then-use, so a token rewritten mid-flight by a
/// concurrent refresh never leaks into an already-dispatched attempt),
/// attaches it as a bearer credential and performs exactly one reactive
/// refresh-and-retry when the provider answers 401. Refresh is never
/// preemptive. Concurrent requests that each hit a 401 may each run their
/// own refresh; there is no cross-request deduplication, which is a known
/// race accepted by design.
pub struct ApiClient {
    http: Client,
    sessions: SessionManager,
}

impl ApiClient {
    pub fn new(sessions: SessionManager) -> Self {
        ApiClient {
            http: Client::new(),
            sessions,
        }
    }

    /// Loads the persisted session and fails when it holds no credentials.
    pub async fn load() -> Result<Self, ApiError> {
        let sessions = SessionManager::load().await;
        if !sessions.session().is_authenticated() {
            return Err(ApiError::Unauthenticated);
        }
        Ok(Self::new(sessions))
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Sends one logical request. Any status other than 401 is returned to
    /// the caller as-is, error statuses included; the caller decides what a
    /// 404 or 429 means for its operation.
    pub async fn send(&mut self, request: &ApiRequest) -> Result<Response, ApiError> {
        let mut refreshes_used: u8 = 0;

        loop {
            // Capture the token for this attempt before dispatching.
            let token = self
                .sessions
                .session()
                .access_token
                .clone()
                .ok_or(ApiError::Unauthenticated)?;

            let response = self.dispatch(request, &token).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            let has_refresh = self.sessions.session().refresh_token.is_some();
            match on_unauthorized(refreshes_used, has_refresh) {
                UnauthorizedAction::AttemptRefresh => {
                    refreshes_used += 1;
                    self.refresh_session().await?;
                    // retry once with the new token
                }
                UnauthorizedAction::ClearSession => {
                    if let Err(e) = self.sessions.clear().await {
                        warning!("Failed to clear session: {}", e);
                    }
                    return Err(ApiError::Unauthorized);
                }
            }
        }
    }

    async fn dispatch(&self, request: &ApiRequest, token: &str) -> Result<Response, ApiError> {
        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .bearer_auth(token);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        Ok(builder.send().await?)
    }

    /// Rewrites the session with freshly granted tokens. A failed refresh
    /// clears the session entirely; the credential is unusable.
    async fn refresh_session(&mut self) -> Result<(), ApiError> {
        let Some(refresh) = self.sessions.session().refresh_token.clone() else {
            return Err(ApiError::Unauthorized);
        };

        match auth::refresh_token(&refresh).await {
            Ok((access_token, rotated_refresh)) => {
                let mut session = self.sessions.session().clone();
                session.access_token = Some(access_token);
                if rotated_refresh.is_some() {
                    session.refresh_token = rotated_refresh;
                }
                session.status = SessionStatus::Authenticated;
                self.sessions.replace(session);
                if let Err(e) = self.sessions.save().await {
                    warning!("Failed to persist refreshed session: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                if let Err(clear_err) = self.sessions.clear().await {
                    warning!("Failed to clear session: {}", clear_err);
                }
                Err(ApiError::Auth(e))
            }
        }
    }
}
