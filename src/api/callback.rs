use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use tokio::sync::Mutex;

use crate::{spotify::auth, types::Session, warning};

/// OAuth callback handler. Redeems the authorization code against the token
/// endpoint using the verifier persisted when the attempt began, then hands
/// the resulting session to the waiting CLI through the shared state. The
/// code is consumed here and never stored, so nothing re-attempts the
/// exchange later.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(shared_state): Extension<Arc<Mutex<Option<Session>>>>,
) -> Html<&'static str> {
    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    match auth::exchange_code_pkce(code).await {
        Ok(session) => {
            let mut state = shared_state.lock().await;
            *state = Some(session);
            Html("<h2>Authentication successful.</h2><p>Close browser window.</p>")
        }
        Err(auth::AuthError::MissingVerifier) => {
            warning!("No code verifier stored; restart authorization.");
            Html("<h4>Missing PKCE code verifier.</h4>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>")
        }
    }
}
