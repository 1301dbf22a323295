mod common;

use std::sync::Arc;

use serde_json::json;
use spotcache::{Error, Uri, entities::Cacheable};

use common::{ScriptedTransport, disk_cache, memory_cache};

fn uri(s: &str) -> Uri {
    s.parse().expect("valid uri")
}

fn me_transport(user: &str) -> ScriptedTransport {
    ScriptedTransport::new()
        .route(
            "me",
            json!({ "uri": format!("spotify:user:{}", user), "display_name": "Alice" }),
        )
        .page(
            "me/playlists",
            0,
            json!({
                "items": [
                    { "uri": "spotify:playlist:p1", "name": "Mix", "snapshot_id": "s1" },
                    { "uri": "spotify:playlist:p2", "name": "Chill", "snapshot_id": "s2" }
                ],
                "next": null
            }),
        )
        .page(
            "me/tracks",
            0,
            json!({
                "items": [
                    {
                        "added_at": "2024-05-01T09:00:00Z",
                        "track": { "uri": "spotify:track:t1", "name": "Latest" }
                    }
                ],
                "next": null
            }),
        )
}

#[tokio::test]
async fn test_me_loads_profile_playlists_and_saved_tracks() {
    let transport = Arc::new(me_transport("alice"));
    let cache = memory_cache(&transport);

    let me = cache.load_me().await.expect("me");
    assert_eq!(me.uri().await.expect("uri").to_string(), "spotify:user:alice");
    assert_eq!(
        me.display_name().await.expect("display name").as_deref(),
        Some("Alice")
    );

    let playlists = me.playlists().await.expect("playlists");
    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[1].cached_name().as_deref(), Some("Chill"));
    assert_eq!(playlists[0].cached_snapshot_id().as_deref(), Some("s1"));
    let same = cache
        .get_playlist(&uri("spotify:playlist:p1"), None, None)
        .expect("playlist");
    assert!(Arc::ptr_eq(&playlists[0], &same));

    let saved = me.saved_tracks().await.expect("saved tracks");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].track.cached_name().as_deref(), Some("Latest"));

    assert_eq!(transport.call_count(), 3);
    assert!(Arc::ptr_eq(&me, &cache.get_me()));
}

#[tokio::test]
async fn test_me_identifier_is_set_once() {
    let transport = Arc::new(me_transport("alice"));
    let cache = memory_cache(&transport);
    let me = cache.load_me().await.expect("me");

    transport.set(
        "me",
        json!({ "uri": "spotify:user:bob", "display_name": "Bob" }),
    );
    let err = cache.refresh_me().await.unwrap_err();
    assert!(matches!(err, Error::ElementOutdated { .. }));

    assert_eq!(me.cached_uri().map(ToString::to_string).as_deref(), Some("spotify:user:alice"));
    assert_eq!(
        me.display_name().await.expect("display name").as_deref(),
        Some("Alice")
    );
}

#[tokio::test]
async fn test_me_record_is_named_me() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(me_transport("alice"));
    let cache = disk_cache(&transport, dir.path());
    cache.load_me().await.expect("me");
    assert!(dir.path().join("me").is_file());

    let offline = Arc::new(ScriptedTransport::new());
    let warm = disk_cache(&offline, dir.path());
    let me = warm.get_me();
    assert_eq!(me.uri().await.expect("uri").to_string(), "spotify:user:alice");
    assert_eq!(me.saved_tracks().await.expect("saved").len(), 1);
    assert!(me.is_loaded());
    assert_eq!(offline.call_count(), 0);
}

#[tokio::test]
async fn test_user_playlists_are_collected_from_pages() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route("users/alice", json!({ "uri": "spotify:user:alice", "display_name": null }))
            .page(
                "users/alice/playlists",
                0,
                json!({
                    "items": [{ "uri": "spotify:playlist:p1", "name": "Mix" }],
                    "next": "more"
                }),
            )
            .page(
                "users/alice/playlists",
                1,
                json!({
                    "items": [{ "uri": "spotify:playlist:p2", "name": "Chill" }],
                    "next": null
                }),
            ),
    );
    let cache = memory_cache(&transport);
    let user = cache
        .get_user(&uri("spotify:user:alice"), None)
        .expect("user");

    assert_eq!(user.display_name().await.expect("display name"), None);
    let playlists = user.playlists().await.expect("playlists");
    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[1].uri().to_string(), "spotify:playlist:p2");
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_album_and_show_collections() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .route(
                "albums/alb1",
                json!({
                    "uri": "spotify:album:alb1",
                    "name": "Album One",
                    "artists": [{ "uri": "spotify:artist:art1", "name": "Artist One" }],
                    "images": [],
                    "tracks": {
                        "items": [{ "uri": "spotify:track:t1", "name": "One" }],
                        "next": "more"
                    }
                }),
            )
            .page(
                "albums/alb1/tracks",
                1,
                json!({ "items": [{ "uri": "spotify:track:t2", "name": "Two" }], "next": null }),
            )
            .route(
                "shows/sh1",
                json!({
                    "uri": "spotify:show:sh1",
                    "name": "Show One",
                    "publisher": "Studio",
                    "images": [],
                    "episodes": {
                        "items": [{ "uri": "spotify:episode:e1", "name": "Pilot" }],
                        "next": null
                    }
                }),
            ),
    );
    let cache = memory_cache(&transport);

    let album = cache
        .get_album(&uri("spotify:album:alb1"), None)
        .expect("album");
    let tracks = album.tracks().await.expect("tracks");
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[1].cached_name().as_deref(), Some("Two"));

    let show = cache
        .get_show(&uri("spotify:show:sh1"), None)
        .expect("show");
    assert_eq!(show.publisher().await.expect("publisher").as_deref(), Some("Studio"));
    let episodes = show.episodes().await.expect("episodes");
    assert_eq!(episodes[0].cached_name().as_deref(), Some("Pilot"));

    assert_eq!(transport.call_count(), 3);
}
