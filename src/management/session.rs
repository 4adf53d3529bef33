use std::{fmt, io, path::PathBuf};

use crate::types::Session;

#[derive(Debug)]
pub enum SessionError {
    IoError(io::Error),
    SerdeError(serde_json::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::IoError(e) => write!(f, "session storage error: {}", e),
            SessionError::SerdeError(e) => write!(f, "session format error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        SessionError::IoError(err)
    }
}

/// Owns the current [`Session`] and persists it as JSON in the local data
/// directory so it survives process restarts. Scoped to a single user and
/// device. No expiry timestamp is tracked; token validity is discovered
/// reactively on first use.
pub struct SessionManager {
    session: Session,
}

impl SessionManager {
    pub fn new(session: Session) -> Self {
        SessionManager { session }
    }

    /// Recovers a previously saved session, falling back to an empty
    /// unauthenticated session when none exists or the file is unreadable.
    pub async fn load() -> Self {
        let path = Self::session_path();
        let session = match async_fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Session::default(),
        };
        Self { session }
    }

    pub async fn save(&self) -> Result<(), SessionError> {
        let path = Self::session_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json =
            serde_json::to_string_pretty(&self.session).map_err(SessionError::SerdeError)?;
        async_fs::write(path, json)
            .await
            .map_err(SessionError::IoError)
    }

    /// Drops the in-memory session and removes the persisted file. Equivalent
    /// to a forced logout.
    pub async fn clear(&mut self) -> Result<(), SessionError> {
        self.session = Session::default();
        match async_fs::remove_file(Self::session_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::IoError(e)),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn replace(&mut self, session: Session) {
        self.session = session;
    }

    fn session_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("spotifuse/cache/session.json");
        path
    }
}
