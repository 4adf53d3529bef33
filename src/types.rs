use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[default]
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// The current credential pair. Created empty at process start, populated by
/// the code exchange, mutated in place by a successful refresh and cleared
/// entirely on logout or unrecoverable refresh failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub status: SessionStatus,
}

impl Session {
    pub fn authenticated(access_token: String, refresh_token: Option<String>) -> Self {
        Session {
            access_token: Some(access_token),
            refresh_token,
            status: SessionStatus::Authenticated,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated && self.access_token.is_some()
    }
}

/// A code verifier and its derived challenge for one authorization attempt.
#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub artists: Vec<AlbumArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

/// Insertion-ordered album set, deduplicated by album id.
#[derive(Debug, Clone, Default)]
pub struct AlbumSelection {
    albums: Vec<Album>,
}

impl AlbumSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an album to the selection. Returns false if an album with the
    /// same id is already present; the original entry keeps its position.
    pub fn insert(&mut self, album: Album) -> bool {
        if self.albums.iter().any(|a| a.id == album.id) {
            return false;
        }
        self.albums.push(album);
        true
    }

    /// Deselects an album so its id can be chosen again. Counterpart to
    /// `insert` for callers that let the user revise a selection before
    /// fusing; the pipeline itself only reads the set.
    pub fn remove(&mut self, album_id: &str) -> bool {
        let before = self.albums.len();
        self.albums.retain(|a| a.id != album_id);
        self.albums.len() != before
    }

    pub fn len(&self) -> usize {
        self.albums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Album> {
        self.albums.iter()
    }
}

/// User-supplied playlist metadata, validated before any network call.
#[derive(Debug, Clone)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: String,
    pub is_public: bool,
}

/// Returned once the playlist exists on the provider.
#[derive(Debug, Clone)]
pub struct PlaylistResult {
    pub id: String,
    pub external_url: String,
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub id: String,
    pub name: String,
    pub artists: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAlbumsResponse {
    pub albums: AlbumPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumPage {
    pub items: Vec<Album>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumTracksResponse {
    pub items: Vec<Track>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub uri: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTracksResponse {
    pub snapshot_id: String,
}
