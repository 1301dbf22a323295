use std::sync::Arc;

use tabled::Table;

use crate::{
    cli, error,
    entities::{Album, Artist, Element, Episode, Playlist, Show, Track, User},
    error::Result,
    types::{FieldTableRow, Image},
};

pub async fn show(uri: &str) {
    let client = cli::connect().await;

    let pb = cli::spinner(&format!("Loading {}...", uri));
    let result = match client.load(uri).await {
        Ok(element) => describe(&element).await,
        Err(e) => Err(e),
    };
    pb.finish_and_clear();

    match result {
        Ok(rows) => println!("{}", Table::new(rows)),
        Err(e) => error!("Cannot load {}. Err: {}", uri, e),
    }
}

fn row(field: &str, value: impl Into<String>) -> FieldTableRow {
    FieldTableRow {
        field: field.to_string(),
        value: value.into(),
    }
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn image_row(images: &[Image]) -> FieldTableRow {
    row(
        "image",
        optional(images.first().map(|image| image.url.clone())),
    )
}

async fn names_of_artists(artists: &[Arc<Artist>]) -> Result<String> {
    let mut names = Vec::with_capacity(artists.len());
    for artist in artists {
        names.push(artist.name().await?);
    }
    Ok(names.join(", "))
}

async fn describe(element: &Element) -> Result<Vec<FieldTableRow>> {
    let mut rows = vec![
        row("uri", element.uri().to_string()),
        row("type", element.kind().to_string()),
    ];
    match element {
        Element::Track(track) => describe_track(track, &mut rows).await?,
        Element::Album(album) => describe_album(album, &mut rows).await?,
        Element::Artist(artist) => describe_artist(artist, &mut rows).await?,
        Element::Episode(episode) => describe_episode(episode, &mut rows).await?,
        Element::Show(show) => describe_show(show, &mut rows).await?,
        Element::User(user) => describe_user(user, &mut rows).await?,
        Element::Playlist(playlist) => describe_playlist(playlist, &mut rows).await?,
    }
    Ok(rows)
}

async fn describe_track(track: &Track, rows: &mut Vec<FieldTableRow>) -> Result<()> {
    let album = track.album().await?;
    let seconds = track.duration_ms().await? / 1000;
    rows.push(row("name", track.name().await?));
    rows.push(row("artists", names_of_artists(&track.artists().await?).await?));
    rows.push(row("album", album.name().await?));
    rows.push(row("duration", format!("{}:{:02}", seconds / 60, seconds % 60)));
    Ok(())
}

async fn describe_album(album: &Album, rows: &mut Vec<FieldTableRow>) -> Result<()> {
    rows.push(row("name", album.name().await?));
    rows.push(row("artists", names_of_artists(&album.artists().await?).await?));
    rows.push(row("tracks", album.tracks().await?.len().to_string()));
    rows.push(image_row(&album.images().await?));
    Ok(())
}

async fn describe_artist(artist: &Artist, rows: &mut Vec<FieldTableRow>) -> Result<()> {
    rows.push(row("name", artist.name().await?));
    rows.push(row("genres", artist.genres().await?.join(", ")));
    rows.push(image_row(&artist.images().await?));
    Ok(())
}

async fn describe_episode(episode: &Episode, rows: &mut Vec<FieldTableRow>) -> Result<()> {
    rows.push(row("name", episode.name().await?));
    rows.push(row("show", episode.show().await?.name().await?));
    rows.push(row("description", optional(episode.description().await?)));
    Ok(())
}

async fn describe_show(show: &Show, rows: &mut Vec<FieldTableRow>) -> Result<()> {
    rows.push(row("name", show.name().await?));
    rows.push(row("publisher", optional(show.publisher().await?)));
    rows.push(row("episodes", show.episodes().await?.len().to_string()));
    rows.push(image_row(&show.images().await?));
    Ok(())
}

async fn describe_user(user: &User, rows: &mut Vec<FieldTableRow>) -> Result<()> {
    rows.push(row("display name", optional(user.display_name().await?)));
    rows.push(row("playlists", user.playlists().await?.len().to_string()));
    Ok(())
}

async fn describe_playlist(playlist: &Playlist, rows: &mut Vec<FieldTableRow>) -> Result<()> {
    let owner = playlist.owner().await?;
    let public = match playlist.public().await? {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    };
    rows.push(row("name", playlist.name().await?));
    rows.push(row(
        "owner",
        owner
            .cached_display_name()
            .unwrap_or_else(|| owner.uri().to_string()),
    ));
    rows.push(row("description", optional(playlist.description().await?)));
    rows.push(row("public", public));
    rows.push(row("snapshot", playlist.snapshot_id().await?));
    rows.push(row("items", playlist.items().await?.len().to_string()));
    rows.push(image_row(&playlist.images().await?));
    Ok(())
}
