use spotcache::{Error, ResourceType, Uri};

#[test]
fn test_parse_canonical_uri() {
    let uri: Uri = "spotify:track:6rqhFgbbKwnb9MLmUQDhG6".parse().expect("uri");
    assert_eq!(uri.kind(), ResourceType::Track);
    assert_eq!(uri.id(), "6rqhFgbbKwnb9MLmUQDhG6");
    assert_eq!(uri.to_string(), "spotify:track:6rqhFgbbKwnb9MLmUQDhG6");
}

#[test]
fn test_parse_round_trips() {
    for s in [
        "spotify:playlist:37i9dQZF1DXcBWIGoYBM5M",
        "spotify:album:1",
        "spotify:artist:0OdUWJ0sBjDrqHygGUXeCF",
        "spotify:episode:512ojhOuo1ktJprKbVcKyQ",
        "spotify:show:5CfCWKI5pZ28U0uOzXkDHe",
        "spotify:user:wizzler",
    ] {
        let uri: Uri = s.parse().expect("uri");
        let again: Uri = uri.to_string().parse().expect("uri");
        assert_eq!(uri, again);
        assert_eq!(again.to_string(), s);
    }
}

#[test]
fn test_service_segment_is_normalized() {
    let uri: Uri = "service:track:abc123".parse().expect("uri");
    assert_eq!(uri.to_string(), "spotify:track:abc123");
}

#[test]
fn test_malformed_identifiers() {
    for s in [
        "",
        "spotify",
        "spotify:track",
        "spotify:track:",
        "spotify:album:a:b",
        "spotify:podcast:abc",
        "spotify:local:Artist:Album:Title:180",
    ] {
        let err = s.parse::<Uri>().unwrap_err();
        assert!(
            matches!(err, Error::MalformedIdentifier(ref value) if value == s),
            "{} should be malformed",
            s
        );
    }
}

#[test]
fn test_resource_type_names() {
    for kind in ResourceType::ALL {
        let parsed: ResourceType = kind.as_str().parse().expect("type");
        assert_eq!(parsed, kind);
    }
    assert_eq!(ResourceType::Episode.to_string(), "episode");
}

#[test]
fn test_uri_serde_as_string() {
    let uri = Uri::new(ResourceType::Album, "abc").expect("uri");
    let json = serde_json::to_value(&uri).expect("serialize");
    assert_eq!(json, serde_json::json!("spotify:album:abc"));

    let back: Uri = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, uri);

    let bad = serde_json::from_value::<Uri>(serde_json::json!("spotify:album"));
    assert!(bad.is_err());
}

#[test]
fn test_new_rejects_ids_that_cannot_round_trip() {
    for id in ["", "a:b", ":"] {
        let err = Uri::new(ResourceType::Track, id).unwrap_err();
        assert!(matches!(err, Error::MalformedIdentifier(_)), "{:?} accepted", id);
    }

    let uri = Uri::new(ResourceType::Track, "abc123").expect("uri");
    let parsed: Uri = uri.to_string().parse().expect("canonical form parses");
    assert_eq!(parsed, uri);
}
