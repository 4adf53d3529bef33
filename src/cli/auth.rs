use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{spotify, types::Session};

pub async fn auth(shared_state: Arc<Mutex<Option<Session>>>) {
    spotify::auth::auth(shared_state).await;
}
