use crate::{
    config,
    types::{Album, AlbumTracksResponse, SearchAlbumsResponse, Track},
};

use super::client::{ApiClient, ApiError, ApiRequest};

/// Searches the catalog for albums matching the query.
///
/// # Arguments
///
/// * `client` - Authenticated API client
/// * `query` - Free-text search term
/// * `limit` - Maximum number of results to return (1-50)
///
/// # Returns
///
/// The matching albums in relevance order, including display metadata
/// (artists, cover images) alongside the ids needed for selection.
pub async fn search_albums(
    client: &mut ApiClient,
    query: &str,
    limit: u32,
) -> Result<Vec<Album>, ApiError> {
    let api_url = format!("{uri}/search", uri = &config::spotify_apiurl());
    let request = ApiRequest::get(api_url)
        .query("q", query)
        .query("type", "album")
        .query("limit", &limit.to_string());

    let response = client.send(&request).await?.error_for_status()?;
    let json = response.json::<SearchAlbumsResponse>().await?;

    Ok(json.albums.items)
}

/// Fetches a single album's metadata by id.
pub async fn get_album(client: &mut ApiClient, album_id: &str) -> Result<Album, ApiError> {
    let api_url = format!(
        "{uri}/albums/{id}",
        uri = &config::spotify_apiurl(),
        id = album_id
    );
    let response = client.send(&ApiRequest::get(api_url)).await?.error_for_status()?;

    Ok(response.json::<Album>().await?)
}

/// Retrieves the complete ordered track list of an album.
///
/// Spotify pages album tracks at 50 per response; the `next` link is
/// followed until exhausted so albums longer than one page still contribute
/// every track, in album order.
pub async fn get_album_tracks(
    client: &mut ApiClient,
    album_id: &str,
) -> Result<Vec<Track>, ApiError> {
    let mut tracks: Vec<Track> = Vec::new();
    let mut request = Some(
        ApiRequest::get(format!(
            "{uri}/albums/{id}/tracks",
            uri = &config::spotify_apiurl(),
            id = album_id
        ))
        .query("limit", "50"),
    );

    while let Some(req) = request {
        let response = client.send(&req).await?.error_for_status()?;
        let page = response.json::<AlbumTracksResponse>().await?;

        tracks.extend(page.items);
        // `next` is a complete URL including its own query string.
        request = page.next.map(ApiRequest::get);
    }

    Ok(tracks)
}
