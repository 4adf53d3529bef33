use crate::{error, management::SessionManager, success};

pub async fn logout() {
    let mut sessions = SessionManager::load().await;
    if let Err(e) = sessions.clear().await {
        error!("Failed to clear session: {}", e);
    }
    success!("Logged out.");
}
