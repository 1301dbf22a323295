mod common;

use std::sync::Arc;

use serde_json::{Value, json};
use spotcache::{Cache, CacheOptions, Error, Playable, Uri, entities::Cacheable};

use common::{ScriptedTransport, disk_cache, memory_cache, playlist_item, playlist_items};

fn uri(s: &str) -> Uri {
    s.parse().expect("valid uri")
}

fn playlist_json(items: Vec<Value>, next: Value) -> Value {
    json!({
        "uri": "spotify:playlist:pl1",
        "name": "Road Trip",
        "description": null,
        "owner": { "uri": "spotify:user:alice", "display_name": "Alice" },
        "snapshot_id": "snap-1",
        "public": true,
        "images": [{ "url": "https://i.scdn.co/image/1", "height": 640, "width": 640 }],
        "tracks": { "items": items, "next": next }
    })
}

fn paged_transport() -> ScriptedTransport {
    ScriptedTransport::new()
        .route(
            "playlists/pl1",
            playlist_json(playlist_items(0..100), json!("page-2")),
        )
        .page(
            "playlists/pl1/tracks",
            100,
            json!({ "items": playlist_items(100..200), "next": "page-3" }),
        )
        .page(
            "playlists/pl1/tracks",
            200,
            json!({ "items": playlist_items(200..242), "next": null }),
        )
}

#[tokio::test]
async fn test_playlist_pages_are_stitched_in_order() {
    let transport = Arc::new(paged_transport());
    let cache = Cache::new(
        transport.clone(),
        CacheOptions::default().with_page_size(100),
    );
    let playlist = cache
        .get_playlist(&uri("spotify:playlist:pl1"), None, None)
        .expect("playlist");

    let items = playlist.items().await.expect("items");
    assert_eq!(items.len(), 242);
    for (index, item) in items.iter().enumerate() {
        assert_eq!(item.track.uri().to_string(), format!("spotify:track:item{}", index));
    }

    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls[0].starts_with("playlists/pl1?fields="));
    assert!(calls[1].starts_with("playlists/pl1/tracks?offset=100&limit=100"));
    assert!(calls[2].starts_with("playlists/pl1/tracks?offset=200&limit=100"));
}

#[tokio::test]
async fn test_playlist_fields_and_shared_owner() {
    let transport = Arc::new(paged_transport());
    let cache = memory_cache(&transport);
    let playlist = cache
        .get_playlist(&uri("spotify:playlist:pl1"), None, None)
        .expect("playlist");

    assert_eq!(playlist.name().await.expect("name"), "Road Trip");
    assert_eq!(playlist.description().await.expect("description"), None);
    assert_eq!(playlist.public().await.expect("public"), Some(true));
    assert_eq!(playlist.snapshot_id().await.expect("snapshot"), "snap-1");
    assert_eq!(playlist.images().await.expect("images").len(), 1);

    let owner = playlist.owner().await.expect("owner");
    let user = cache
        .get_user(&uri("spotify:user:alice"), None)
        .expect("user");
    assert!(Arc::ptr_eq(&owner, &user));
    assert_eq!(owner.cached_display_name().as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_playlist_items_skip_unavailable_tracks_and_keep_episodes() {
    let items = vec![
        playlist_item(0),
        json!({ "added_at": "2024-03-02T08:30:00Z", "track": null }),
        json!({
            "added_at": null,
            "track": { "uri": "spotify:episode:ep1", "name": "Episode One" }
        }),
        json!({
            "added_at": "2024-03-03T10:00:00Z",
            "track": { "uri": "spotify:local:Artist:Album:Title:180", "name": "Local" }
        }),
    ];
    let transport = Arc::new(
        ScriptedTransport::new().route("playlists/pl1", playlist_json(items, Value::Null)),
    );
    let cache = memory_cache(&transport);
    let playlist = cache
        .get_playlist(&uri("spotify:playlist:pl1"), None, None)
        .expect("playlist");

    let items = playlist.items().await.expect("items");
    assert_eq!(items.len(), 2);
    assert!(matches!(items[0].track, Playable::Track(_)));
    assert_eq!(
        items[0].added_at.map(|t| t.to_rfc3339()),
        Some("2024-03-01T12:00:00+00:00".to_string())
    );
    assert!(matches!(items[1].track, Playable::Episode(_)));
    assert_eq!(items[1].added_at, None);
    assert_eq!(items[1].track.cached_name().as_deref(), Some("Episode One"));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_playlist_item_of_wrong_type_is_rejected() {
    let items = vec![json!({
        "added_at": null,
        "track": { "uri": "spotify:album:alb1", "name": "Album" }
    })];
    let transport = Arc::new(
        ScriptedTransport::new().route("playlists/pl1", playlist_json(items, Value::Null)),
    );
    let cache = memory_cache(&transport);

    let err = cache
        .load(&uri("spotify:playlist:pl1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DataShape(_)));
}

#[tokio::test]
async fn test_playlist_search_matches_all_terms() {
    let items = vec![
        json!({ "added_at": null, "track": { "uri": "spotify:track:a", "name": "Love Me Do" } }),
        json!({ "added_at": null, "track": { "uri": "spotify:track:b", "name": "All You Need Is Love" } }),
        json!({ "added_at": null, "track": { "uri": "spotify:track:c", "name": "Help!" } }),
    ];
    let transport = Arc::new(
        ScriptedTransport::new().route("playlists/pl1", playlist_json(items, Value::Null)),
    );
    let cache = memory_cache(&transport);
    let playlist = cache
        .get_playlist(&uri("spotify:playlist:pl1"), None, None)
        .expect("playlist");

    let hits = playlist
        .search(&["love".to_string()])
        .await
        .expect("search");
    assert_eq!(hits.len(), 2);

    let hits = playlist
        .search(&["LOVE".to_string(), "need".to_string()])
        .await
        .expect("search");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].uri().to_string(), "spotify:track:b");
}

#[tokio::test]
async fn test_playlist_record_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(paged_transport());
    let cache = disk_cache(&transport, dir.path());
    let element = cache
        .load(&uri("spotify:playlist:pl1"))
        .await
        .expect("load");
    let dict = element.as_cacheable().to_dict().expect("to_dict");
    assert_eq!(dict["tracks"]["items"].as_array().map(Vec::len), Some(242));

    let offline = Arc::new(ScriptedTransport::new());
    let warm = disk_cache(&offline, dir.path());
    let playlist = warm
        .get_playlist(&uri("spotify:playlist:pl1"), None, None)
        .expect("playlist");
    assert_eq!(playlist.items().await.expect("items").len(), 242);
    assert_eq!(playlist.snapshot_id().await.expect("snapshot"), "snap-1");
    assert_eq!(offline.call_count(), 0);
}

#[test]
fn test_snapshot_hint_is_kept_until_loaded() {
    let transport = Arc::new(ScriptedTransport::new());
    let cache = memory_cache(&transport);

    let playlist = cache
        .get_playlist(&uri("spotify:playlist:pl1"), Some("Mix"), Some("s1"))
        .expect("playlist");
    cache
        .get_playlist(&uri("spotify:playlist:pl1"), Some("Other"), Some("s2"))
        .expect("playlist");

    assert_eq!(playlist.cached_name().as_deref(), Some("Mix"));
    assert_eq!(playlist.cached_snapshot_id().as_deref(), Some("s1"));
    assert!(!playlist.is_loaded());
}

#[tokio::test]
async fn test_item_without_name_is_never_dropped() {
    let items = vec![
        playlist_item(0),
        json!({ "added_at": null, "track": { "uri": "spotify:track:nameless" } }),
    ];
    let transport = Arc::new(
        ScriptedTransport::new().route("playlists/pl1", playlist_json(items, Value::Null)),
    );
    let cache = memory_cache(&transport);
    let playlist = cache
        .get_playlist(&uri("spotify:playlist:pl1"), None, None)
        .expect("playlist");

    let err = playlist.items().await.unwrap_err();
    assert!(matches!(err, Error::DataShape(_)));
    // the incomplete response is requested a second time before giving up
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_truncated_record_is_refetched_instead_of_shortened() {
    let dir = tempfile::tempdir().expect("tempdir");
    let truncated = playlist_json(
        vec![
            playlist_item(0),
            json!({ "added_at": null, "track": { "uri": "spotify:track:item1" } }),
        ],
        Value::Null,
    );
    std::fs::write(dir.path().join("spotify:playlist:pl1"), truncated.to_string())
        .expect("write");

    let transport = Arc::new(ScriptedTransport::new().route(
        "playlists/pl1",
        playlist_json(playlist_items(0..2), Value::Null),
    ));
    let cache = disk_cache(&transport, dir.path());
    let playlist = cache
        .get_playlist(&uri("spotify:playlist:pl1"), None, None)
        .expect("playlist");

    let items = playlist.items().await.expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].track.cached_name().as_deref(), Some("Song 1"));
    assert_eq!(transport.call_count(), 1);
}
