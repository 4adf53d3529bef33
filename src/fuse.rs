//! Playlist assembly orchestration.
//!
//! One user action drives a sequence of dependent remote calls: resolve the
//! current user, create an empty playlist, fetch every selected album's
//! track list, then insert the concatenated tracks in provider-sized
//! batches. The steps and their failure semantics:
//!
//! 1. Validation happens before any network call; an invalid request does
//!    no partial work.
//! 2. A failure resolving the user or creating the playlist aborts the
//!    whole operation; nothing was created.
//! 3. Album track fetches run concurrently but are reassembled in
//!    album-selection order. A failed album degrades the result and is
//!    reported per album; the rest of the operation continues.
//! 4. A failed batch insertion leaves the already-created playlist
//!    partially populated. The error names the playlist and the failed
//!    batch; there is no compensating deletion, and re-running the whole
//!    operation would duplicate the batches that did land.

use std::fmt;

use crate::{
    spotify::{
        albums,
        client::{ApiClient, ApiError},
        playlist,
    },
    types::{AlbumSelection, PlaylistDraft, PlaylistResult},
};

#[derive(Debug)]
pub enum FuseError {
    /// The request was rejected before any network call was made.
    Validation(String),
    UserLookup(ApiError),
    PlaylistCreate(ApiError),
    /// A track batch failed after the playlist was created. The playlist
    /// exists in a partial state; `batch_index` says how far insertion got.
    Insertion {
        playlist: PlaylistResult,
        batch_index: usize,
        total_batches: usize,
        message: String,
    },
}

impl fmt::Display for FuseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuseError::Validation(msg) => write!(f, "invalid request: {}", msg),
            FuseError::UserLookup(e) => write!(f, "failed to resolve current user: {}", e),
            FuseError::PlaylistCreate(e) => write!(f, "failed to create playlist: {}", e),
            FuseError::Insertion {
                playlist,
                batch_index,
                total_batches,
                message,
            } => write!(
                f,
                "failed to add batch {}/{} to playlist {} (it exists but is only partially filled): {}",
                batch_index + 1,
                total_batches,
                playlist.id,
                message
            ),
        }
    }
}

impl std::error::Error for FuseError {}

/// One album whose track fetch failed. The album's contribution is missing
/// from the playlist; everything else still went in.
#[derive(Debug)]
pub struct AlbumFetchFailure {
    pub album_id: String,
    pub album_name: String,
    pub error: String,
}

/// Outcome of a completed fusion. `failed_albums` is non-empty when the
/// result is degraded by per-album fetch failures.
#[derive(Debug)]
pub struct FuseReport {
    pub playlist: PlaylistResult,
    pub tracks_added: usize,
    pub failed_albums: Vec<AlbumFetchFailure>,
}

/// Checks the user-supplied request without touching the network.
pub fn validate(draft: &PlaylistDraft, selection: &AlbumSelection) -> Result<(), FuseError> {
    if draft.name.trim().is_empty() {
        return Err(FuseError::Validation(
            "playlist name must not be empty".to_string(),
        ));
    }
    if selection.len() < 2 {
        return Err(FuseError::Validation(
            "select at least two albums".to_string(),
        ));
    }
    Ok(())
}

/// Splits the concatenated URI list into insertion batches of at most
/// [`playlist::MAX_TRACKS_PER_REQUEST`], preserving order.
pub fn plan_batches(uris: &[String]) -> Vec<&[String]> {
    uris.chunks(playlist::MAX_TRACKS_PER_REQUEST).collect()
}

/// Creates a playlist and fills it with every track of every selected album.
///
/// Track URIs keep album-selection order first, intra-album track order
/// second. Nothing is reordered and nothing is deduplicated across albums;
/// a track appearing on two selected albums is kept twice on purpose.
pub async fn create_fused_playlist(
    client: &mut ApiClient,
    draft: &PlaylistDraft,
    selection: &AlbumSelection,
) -> Result<FuseReport, FuseError> {
    validate(draft, selection)?;

    let user = playlist::get_current_user(client)
        .await
        .map_err(FuseError::UserLookup)?;

    // Insertion targets a real playlist; creation must finish first.
    let created = playlist::create(client, &user.id, draft)
        .await
        .map_err(FuseError::PlaylistCreate)?;
    let result = PlaylistResult {
        id: created.id,
        external_url: created.external_urls.spotify,
    };

    // Fan out the independent per-album fetches, each task with its own
    // client so an unauthorized response refreshes independently.
    let mut handles = Vec::new();
    for album in selection.iter() {
        let album_id = album.id.clone();
        let handle = tokio::spawn(async move {
            let mut task_client = ApiClient::load().await?;
            albums::get_album_tracks(&mut task_client, &album_id).await
        });
        handles.push(handle);
    }

    // Join in selection order, not completion order, so the concatenation
    // matches the order the user picked the albums in.
    let mut uris: Vec<String> = Vec::new();
    let mut failed_albums: Vec<AlbumFetchFailure> = Vec::new();
    for (album, handle) in selection.iter().zip(handles) {
        match handle.await {
            Ok(Ok(tracks)) => {
                uris.extend(tracks.into_iter().map(|t| t.uri));
            }
            Ok(Err(e)) => failed_albums.push(AlbumFetchFailure {
                album_id: album.id.clone(),
                album_name: album.name.clone(),
                error: e.to_string(),
            }),
            Err(e) => failed_albums.push(AlbumFetchFailure {
                album_id: album.id.clone(),
                album_name: album.name.clone(),
                error: format!("task join error: {}", e),
            }),
        }
    }

    let batches = plan_batches(&uris);
    let total_batches = batches.len();
    for (batch_index, batch) in batches.into_iter().enumerate() {
        if let Err(e) = playlist::add_tracks(client, &result.id, batch).await {
            return Err(FuseError::Insertion {
                playlist: result,
                batch_index,
                total_batches,
                message: e.to_string(),
            });
        }
    }

    Ok(FuseReport {
        playlist: result,
        tracks_added: uris.len(),
        failed_albums,
    })
}
