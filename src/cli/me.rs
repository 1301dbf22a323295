use tabled::Table;

use crate::{
    cli, error, info,
    types::{ElementTableRow, ItemTableRow},
    utils,
};

/// Shows the current user's playlists, or the saved tracks with `tracks`.
pub async fn me(tracks: bool) {
    let client = cli::connect().await;

    let pb = cli::spinner("Loading your profile...");
    let loaded = client.cache().load_me().await;
    pb.finish_and_clear();

    let me = match loaded {
        Ok(me) => me,
        Err(e) => error!("Cannot load your profile. Err: {}", e),
    };

    let display_name = me.display_name().await.ok().flatten();
    if let Some(uri) = me.cached_uri() {
        info!(
            "{} ({})",
            display_name.unwrap_or_else(|| "unnamed".to_string()),
            uri
        );
    }

    if tracks {
        let saved = match me.saved_tracks().await {
            Ok(saved) => saved,
            Err(e) => error!("Cannot load saved tracks. Err: {}", e),
        };
        let rows: Vec<ItemTableRow> = saved
            .iter()
            .enumerate()
            .map(|(index, saved)| ItemTableRow {
                position: index + 1,
                name: saved.track.cached_name().unwrap_or_default(),
                added_at: utils::format_timestamp(saved.added_at.as_ref()),
                uri: saved.track.uri().to_string(),
            })
            .collect();
        println!("{}", Table::new(rows));
        return;
    }

    let playlists = match me.playlists().await {
        Ok(playlists) => playlists,
        Err(e) => error!("Cannot load playlists. Err: {}", e),
    };
    let rows: Vec<ElementTableRow> = playlists
        .iter()
        .map(|playlist| ElementTableRow {
            kind: playlist.uri().kind().to_string(),
            name: playlist.cached_name().unwrap_or_default(),
            uri: playlist.uri().to_string(),
        })
        .collect();
    println!("{}", Table::new(rows));
}
