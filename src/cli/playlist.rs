use tabled::Table;

use crate::{
    cli, error, info,
    entities::PlaylistItem,
    error::Result,
    types::{ElementTableRow, ItemTableRow},
    utils, warning,
};

/// Lists the items of a playlist, or only those matching every search term.
pub async fn playlist(uri: &str, search: Option<Vec<String>>) {
    let client = cli::connect().await;
    let playlist = match client.playlist(uri) {
        Ok(playlist) => playlist,
        Err(e) => error!("Invalid playlist identifier. Err: {}", e),
    };

    let pb = cli::spinner("Loading playlist...");
    let loaded = playlist.items().await;
    pb.finish_and_clear();

    let items = match loaded {
        Ok(items) => items,
        Err(e) => error!("Cannot load playlist {}. Err: {}", uri, e),
    };

    if let Ok(name) = playlist.name().await {
        info!("{} ({} items)", name, items.len());
    }

    match search {
        Some(terms) if !terms.is_empty() => match playlist.search(&terms).await {
            Ok(hits) if hits.is_empty() => warning!("Nothing matches '{}'", terms.join(" ")),
            Ok(hits) => {
                let rows: Vec<ElementTableRow> = hits
                    .into_iter()
                    .map(|playable| ElementTableRow {
                        kind: playable.uri().kind().to_string(),
                        name: playable.cached_name().unwrap_or_default(),
                        uri: playable.uri().to_string(),
                    })
                    .collect();
                println!("{}", Table::new(rows));
            }
            Err(e) => error!("Search failed. Err: {}", e),
        },
        _ => match item_rows(&items).await {
            Ok(rows) => println!("{}", Table::new(rows)),
            Err(e) => error!("Cannot list playlist items. Err: {}", e),
        },
    }
}

async fn item_rows(items: &[PlaylistItem]) -> Result<Vec<ItemTableRow>> {
    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let name = match item.track.cached_name() {
            Some(name) => name,
            None => item.track.name().await?,
        };
        rows.push(ItemTableRow {
            position: index + 1,
            name,
            added_at: utils::format_timestamp(item.added_at.as_ref()),
            uri: item.track.uri().to_string(),
        });
    }
    Ok(rows)
}
