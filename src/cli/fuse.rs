use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    error, fuse, info, spotify,
    spotify::client::ApiClient,
    success,
    types::{AlbumSelection, PlaylistDraft},
    warning,
};

pub async fn fuse(name: String, description: String, public: bool, album_ids: Vec<String>) {
    let draft = PlaylistDraft {
        name,
        description,
        is_public: public,
    };

    // Cheap checks before touching the network.
    let mut distinct_ids: Vec<String> = Vec::new();
    for id in album_ids {
        if !distinct_ids.contains(&id) {
            distinct_ids.push(id);
        }
    }
    if draft.name.trim().is_empty() {
        error!("Playlist name must not be empty.");
    }
    if distinct_ids.len() < 2 {
        error!("Select at least two distinct albums.");
    }

    let mut client = match ApiClient::load().await {
        Ok(client) => client,
        Err(e) => error!("{}", e),
    };

    let mut selection = AlbumSelection::new();
    for id in &distinct_ids {
        match spotify::albums::get_album(&mut client, id).await {
            Ok(album) => {
                info!(
                    "Selected: {} - {}",
                    album.name,
                    album
                        .artists
                        .iter()
                        .map(|a| a.name.clone())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                selection.insert(album);
            }
            Err(e) => error!("Failed to resolve album {}: {}", id, e),
        }
    }

    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Fusing {} albums into one playlist...", selection.len()));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let report = fuse::create_fused_playlist(&mut client, &draft, &selection).await;
    pb.finish_and_clear();

    match report {
        Ok(report) => {
            for failure in &report.failed_albums {
                warning!(
                    "Album '{}' ({}) could not be fetched and is missing from the playlist: {}",
                    failure.album_name,
                    failure.album_id,
                    failure.error
                );
            }
            success!(
                "Playlist '{}' created with {} tracks.",
                draft.name,
                report.tracks_added
            );
            info!("Listen here: {}", report.playlist.external_url);
        }
        Err(fuse::FuseError::Insertion {
            playlist,
            batch_index,
            total_batches,
            message,
        }) => {
            warning!(
                "Adding tracks failed at batch {}/{}: {}",
                batch_index + 1,
                total_batches,
                message
            );
            warning!(
                "The playlist exists but is only partially filled: {}",
                playlist.external_url
            );
            error!("Re-running would duplicate the tracks that were already added.");
        }
        Err(e) => error!("{}", e),
    }
}
