use serde_json::json;

use crate::{
    config,
    types::{AddTracksResponse, CreatePlaylistResponse, CurrentUser, PlaylistDraft},
};

use super::client::{ApiClient, ApiError, ApiRequest};

/// The provider accepts at most this many track URIs per insertion call.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

/// Resolves the identity of the authenticated user. Playlists are created
/// under this user's account.
pub async fn get_current_user(client: &mut ApiClient) -> Result<CurrentUser, ApiError> {
    let api_url = format!("{uri}/me", uri = &config::spotify_apiurl());
    let response = client
        .send(&ApiRequest::get(api_url))
        .await?
        .error_for_status()?;

    Ok(response.json::<CurrentUser>().await?)
}

/// Creates an empty playlist with the requested name, description and
/// visibility under the given user's account.
pub async fn create(
    client: &mut ApiClient,
    user_id: &str,
    draft: &PlaylistDraft,
) -> Result<CreatePlaylistResponse, ApiError> {
    let api_url = format!(
        "{uri}/users/{user_id}/playlists",
        uri = &config::spotify_apiurl(),
        user_id = user_id
    );
    let body = json!({
        "name": draft.name,
        "description": draft.description,
        "public": draft.is_public,
    });

    let response = client
        .send(&ApiRequest::post(api_url, body))
        .await?
        .error_for_status()?;

    Ok(response.json::<CreatePlaylistResponse>().await?)
}

/// Appends one batch of track URIs to a playlist. Callers are responsible
/// for chunking to [`MAX_TRACKS_PER_REQUEST`]; batches arrive in playlist
/// order.
pub async fn add_tracks(
    client: &mut ApiClient,
    playlist_id: &str,
    uris: &[String],
) -> Result<AddTracksResponse, ApiError> {
    debug_assert!(uris.len() <= MAX_TRACKS_PER_REQUEST);

    let api_url = format!(
        "{uri}/playlists/{playlist_id}/tracks",
        uri = &config::spotify_apiurl(),
        playlist_id = playlist_id
    );
    let body = json!({ "uris": uris });

    let response = client
        .send(&ApiRequest::post(api_url, body))
        .await?
        .error_for_status()?;

    Ok(response.json::<AddTracksResponse>().await?)
}
