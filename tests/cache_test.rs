mod common;

use std::{sync::Arc, time::Duration};

use serde_json::{Value, json};
use spotcache::{
    Cache, CacheOptions, Element, Error, ResourceType, Uri, entities::Cacheable,
};

use common::{ScriptedTransport, disk_cache, memory_cache, track_json};

fn uri(s: &str) -> Uri {
    s.parse().expect("valid uri")
}

fn record_path(dir: &std::path::Path, uri: &str) -> std::path::PathBuf {
    dir.join(uri)
}

#[test]
fn test_get_element_returns_same_instance() {
    let transport = Arc::new(ScriptedTransport::new());
    let cache = memory_cache(&transport);

    let first = cache.get_element(&uri("spotify:track:abc123"), None);
    let second = cache.get_element(&uri("spotify:track:abc123"), Some("Hint"));
    assert!(first.same_instance(&second));

    let typed = cache
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");
    assert!(matches!(first, Element::Track(ref t) if Arc::ptr_eq(t, &typed)));
    assert_eq!(cache.len(), 1);
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_name_hint_fills_unknown_name_only() {
    let transport = Arc::new(ScriptedTransport::new());
    let cache = memory_cache(&transport);

    let track = cache
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");
    assert_eq!(track.cached_name(), None);

    cache.get_element(&uri("spotify:track:abc123"), Some("First"));
    cache.get_element(&uri("spotify:track:abc123"), Some("Second"));
    assert_eq!(track.cached_name().as_deref(), Some("First"));
}

#[test]
fn test_typed_getter_rejects_other_type() {
    let transport = Arc::new(ScriptedTransport::new());
    let cache = memory_cache(&transport);

    let err = cache
        .get_album(&uri("spotify:track:abc123"), None)
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { expected: "album", .. }));
    // no shell is created for a rejected lookup
    assert!(cache.is_empty());
}

#[test]
fn test_elements_lists_entities_per_type_in_creation_order() {
    let transport = Arc::new(ScriptedTransport::new());
    let cache = memory_cache(&transport);

    cache.get_element(&uri("spotify:track:b"), None);
    cache.get_element(&uri("spotify:album:x"), None);
    cache.get_element(&uri("spotify:track:a"), None);
    cache.get_element(&uri("spotify:track:b"), None);

    let tracks: Vec<String> = cache
        .elements(ResourceType::Track)
        .iter()
        .map(|e| e.uri().to_string())
        .collect();
    assert_eq!(tracks, vec!["spotify:track:b", "spotify:track:a"]);
    assert_eq!(cache.elements(ResourceType::Album).len(), 1);
    assert!(cache.elements(ResourceType::Show).is_empty());
    assert!(cache.contains(&uri("spotify:album:x")));
}

#[tokio::test]
async fn test_track_scenario_links_album_and_artists() {
    let transport = Arc::new(
        ScriptedTransport::new().route("tracks/abc123", track_json("abc123", "Song")),
    );
    let cache = memory_cache(&transport);

    let track = cache
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");
    assert_eq!(track.name().await.expect("name"), "Song");

    let album = track.album().await.expect("album");
    let same_album = cache
        .get_album(&uri("spotify:album:alb1"), None)
        .expect("album");
    assert!(Arc::ptr_eq(&album, &same_album));
    assert_eq!(album.cached_name().as_deref(), Some("Album One"));
    // the hint answers name() without loading the album
    assert_eq!(album.name().await.expect("album name"), "Album One");

    let artists = track.artists().await.expect("artists");
    assert_eq!(artists.len(), 2);
    assert_eq!(artists[1].cached_name().as_deref(), Some("Artist Two"));
    assert_eq!(track.duration_ms().await.expect("duration"), 215000);

    assert_eq!(transport.calls(), vec!["tracks/abc123"]);
}

#[tokio::test]
async fn test_load_is_idempotent_without_disk_cache() {
    let transport = Arc::new(
        ScriptedTransport::new().route("tracks/abc123", track_json("abc123", "Song")),
    );
    let cache = memory_cache(&transport);
    let track_uri = uri("spotify:track:abc123");

    cache.load(&track_uri).await.expect("first load");
    cache.load(&track_uri).await.expect("second load");
    assert_eq!(transport.call_count(), 1);

    cache.refresh(&track_uri).await.expect("refresh");
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn test_disk_round_trip_serves_second_cache_without_network() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transport = Arc::new(
        ScriptedTransport::new().route("tracks/abc123", track_json("abc123", "Song")),
    );

    let cache = disk_cache(&transport, dir.path());
    let element = cache.load(&uri("spotify:track:abc123")).await.expect("load");
    assert_eq!(transport.call_count(), 1);

    let path = record_path(dir.path(), "spotify:track:abc123");
    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("record")).expect("json");
    assert_eq!(written, element.as_cacheable().to_dict().expect("to_dict"));

    let offline = Arc::new(ScriptedTransport::new());
    let warm = disk_cache(&offline, dir.path());
    let track = warm
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");
    assert_eq!(track.name().await.expect("name"), "Song");
    assert_eq!(track.duration_ms().await.expect("duration"), 215000);
    let artists = track.artists().await.expect("artists");
    assert_eq!(artists[0].cached_name().as_deref(), Some("Artist One"));
    assert_eq!(offline.call_count(), 0);
}

#[tokio::test]
async fn test_corrupted_record_falls_back_to_network_and_is_rewritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = record_path(dir.path(), "spotify:track:abc123");
    std::fs::write(&path, "{ this is not json").expect("write");

    let transport = Arc::new(
        ScriptedTransport::new().route("tracks/abc123", track_json("abc123", "Song")),
    );
    let cache = disk_cache(&transport, dir.path());
    let track = cache
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");

    assert_eq!(track.name().await.expect("name"), "Song");
    assert_eq!(transport.call_count(), 1);

    let rewritten: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("record")).expect("json");
    assert_eq!(rewritten["name"], "Song");
}

#[tokio::test]
async fn test_incomplete_record_triggers_one_refetch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = record_path(dir.path(), "spotify:track:abc123");
    let mut stale = track_json("abc123", "Old Song");
    stale.as_object_mut().expect("object").remove("duration_ms");
    std::fs::write(&path, stale.to_string()).expect("write");

    let transport = Arc::new(
        ScriptedTransport::new().route("tracks/abc123", track_json("abc123", "New Song")),
    );
    let cache = disk_cache(&transport, dir.path());
    let track = cache
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");

    assert_eq!(track.duration_ms().await.expect("duration"), 215000);
    assert_eq!(track.cached_name().as_deref(), Some("New Song"));
    assert_eq!(transport.call_count(), 1);

    let rewritten: Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("record")).expect("json");
    assert_eq!(rewritten["duration_ms"], 215000);
}

#[tokio::test]
async fn test_record_of_another_resource_is_outdated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = record_path(dir.path(), "spotify:track:abc123");
    std::fs::write(&path, track_json("zzz999", "Wrong").to_string()).expect("write");

    let transport = Arc::new(
        ScriptedTransport::new().route("tracks/abc123", track_json("abc123", "Right")),
    );
    let cache = disk_cache(&transport, dir.path());
    let track = cache
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");

    assert_eq!(track.name().await.expect("name"), "Right");
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_staleness_retry_is_bounded() {
    let broken = json!({ "uri": "spotify:track:abc123", "name": "No Album" });
    let transport = Arc::new(ScriptedTransport::new().route("tracks/abc123", broken));
    let cache = memory_cache(&transport);
    let track = cache
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");

    let err = track.album().await.unwrap_err();
    assert!(matches!(err, Error::DataShape(_)));
    assert_eq!(transport.call_count(), 2);
    assert!(!track.is_loaded());

    // failed fields are retried on the next access
    transport.set("tracks/abc123", track_json("abc123", "Fixed"));
    assert_eq!(track.name().await.expect("name"), "Fixed");
    assert_eq!(transport.call_count(), 3);
}

#[tokio::test]
async fn test_transport_errors_propagate_unchanged() {
    let transport = Arc::new(ScriptedTransport::new());
    let cache = memory_cache(&transport);

    let err = cache.load(&uri("spotify:artist:gone")).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_wrong_reference_type_is_a_data_shape_error() {
    let mut track = track_json("abc123", "Song");
    track["album"] = json!({ "uri": "spotify:artist:art1", "name": "Not An Album" });
    let transport = Arc::new(ScriptedTransport::new().route("tracks/abc123", track));
    let cache = memory_cache(&transport);

    let err = cache.load(&uri("spotify:track:abc123")).await.unwrap_err();
    assert!(matches!(err, Error::DataShape(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_access_fetches_once() {
    let transport = Arc::new(
        ScriptedTransport::with_delay(Duration::from_millis(50))
            .route("tracks/abc123", track_json("abc123", "Song")),
    );
    let cache = memory_cache(&transport);
    let track = cache
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let track = Arc::clone(&track);
            tokio::spawn(async move { track.name().await })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.expect("join").expect("name"), "Song");
    }
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn test_entity_outliving_cache_reports_dropped_cache() {
    let transport = Arc::new(ScriptedTransport::new());
    let cache = memory_cache(&transport);
    let track = cache
        .get_track(&uri("spotify:track:abc123"), None)
        .expect("track");
    drop(cache);

    assert!(matches!(track.name().await, Err(Error::CacheDropped)));
}

#[test]
fn test_cache_options() {
    let options = CacheOptions::default();
    assert_eq!(options.cache_dir, None);
    assert_eq!(options.page_size, 50);

    let transport = Arc::new(ScriptedTransport::new());
    let cache = Cache::new(
        transport,
        CacheOptions::default()
            .with_cache_dir("/tmp/records")
            .with_page_size(20),
    );
    assert_eq!(
        cache.cache_dir(),
        Some(std::path::Path::new("/tmp/records"))
    );
    assert_eq!(cache.page_size(), 20);
}

#[tokio::test]
async fn test_rejected_record_registers_no_references() {
    let mut track = track_json("abc123", "Song");
    track["artists"][1] = json!({ "uri": "spotify:album:zzz", "name": "Not An Artist" });
    let transport = Arc::new(ScriptedTransport::new().route("tracks/abc123", track));
    let cache = memory_cache(&transport);

    let err = cache.load(&uri("spotify:track:abc123")).await.unwrap_err();
    assert!(matches!(err, Error::DataShape(_)));

    // neither the album nor the valid first artist got a shell or a name
    assert_eq!(cache.len(), 1);
    assert!(!cache.contains(&uri("spotify:album:alb1")));
    assert!(!cache.contains(&uri("spotify:artist:art1")));
}
