use std::{io, path::PathBuf};

/// Durable storage for the PKCE code verifier of the authorization attempt
/// currently in flight. Only one attempt exists at a time; beginning a new
/// attempt overwrites the previous one. The verifier is written once, read
/// by the token exchange and erased as soon as the exchange succeeds, so a
/// second run cannot try to redeem the same single-use authorization code.
pub struct AttemptManager;

impl AttemptManager {
    pub async fn begin(verifier: &str) -> Result<(), io::Error> {
        let path = Self::verifier_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        async_fs::write(path, verifier).await
    }

    /// Returns the stored verifier, or None when no attempt is in flight.
    pub async fn current() -> Option<String> {
        let verifier = async_fs::read_to_string(Self::verifier_path()).await.ok()?;
        if verifier.is_empty() {
            return None;
        }
        Some(verifier)
    }

    pub async fn clear() -> Result<(), io::Error> {
        match async_fs::remove_file(Self::verifier_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn verifier_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("spotifuse/state/code_verifier");
        path
    }
}
