use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    error, spotify,
    spotify::client::ApiClient,
    types::AlbumTableRow,
};

pub async fn search(query: String, limit: u32) {
    let mut client = match ApiClient::load().await {
        Ok(client) => client,
        Err(e) => error!("{}", e),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_message("Searching albums...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let albums = match spotify::albums::search_albums(&mut client, &query, limit).await {
        Ok(albums) => {
            pb.finish_and_clear();
            albums
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Search failed: {}", e);
        }
    };

    if albums.is_empty() {
        println!("No albums found for '{}'.", query);
        return;
    }

    let table_rows: Vec<AlbumTableRow> = albums
        .into_iter()
        .map(|a| AlbumTableRow {
            id: a.id,
            name: a.name,
            artists: a
                .artists
                .iter()
                .map(|artist| artist.name.clone())
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    let table = Table::new(table_rows);
    println!("{}", table);
}
