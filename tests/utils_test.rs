use chrono::{TimeZone, Utc};
use spotcache::utils::*;

#[test]
fn test_generate_code_verifier() {
    let verifier = generate_code_verifier();

    // Should be exactly 128 characters
    assert_eq!(verifier.len(), 128);

    // Should contain only alphanumeric characters
    assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated verifiers should be different
    let verifier2 = generate_code_verifier();
    assert_ne!(verifier, verifier2);
}

#[test]
fn test_generate_code_challenge() {
    let verifier = "test_verifier_123";
    let challenge = generate_code_challenge(verifier);

    assert!(!challenge.is_empty());

    // Should be deterministic
    assert_eq!(challenge, generate_code_challenge(verifier));
    assert_ne!(challenge, generate_code_challenge("different_verifier"));

    // SHA-256 digest encoded as URL-safe base64 without padding
    assert_eq!(challenge.len(), 43);
    assert!(
        challenge
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
}

#[test]
fn test_generate_code_challenge_known_value() {
    // RFC 7636, appendix B
    let challenge = generate_code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
    assert_eq!(challenge, "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM");
}

#[test]
fn test_generate_state() {
    let state = generate_state();
    assert_eq!(state.len(), 16);
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn test_endpoint_with_params() {
    assert_eq!(endpoint_with_params("tracks/abc", &[]), "tracks/abc");
    assert_eq!(
        endpoint_with_params("tracks/abc", &[("fields", None)]),
        "tracks/abc"
    );
    assert_eq!(
        endpoint_with_params(
            "me/tracks",
            &[("offset", Some("50")), ("limit", Some("50")), ("fields", None)]
        ),
        "me/tracks?offset=50&limit=50"
    );
    assert_eq!(
        endpoint_with_params("search?q=x", &[("limit", Some("5"))]),
        "search?q=x&limit=5"
    );
    assert_eq!(
        endpoint_with_params("me/player/queue", &[("uri", Some("spotify:track:abc"))]),
        "me/player/queue?uri=spotify%3Atrack%3Aabc"
    );
    assert_eq!(
        endpoint_with_params("albums/a1/tracks", &[("fields", Some("next,items(uri)"))]),
        "albums/a1/tracks?fields=next%2Citems%28uri%29"
    );
}

#[test]
fn test_encode_query() {
    assert_eq!(
        encode_query(&[("q", "daft punk"), ("type", "album,track")]),
        "q=daft+punk&type=album%2Ctrack"
    );
    assert_eq!(encode_query(&[]), "");
}

#[test]
fn test_format_timestamp() {
    let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 5).unwrap();
    assert_eq!(format_timestamp(Some(&t)), "2024-03-01T12:00:05Z");
    assert_eq!(format_timestamp(None), "-");
}

#[test]
fn test_now_timestamp_is_current() {
    let now = Utc::now().timestamp();
    assert!((now_timestamp() - now).abs() <= 1);
}

#[test]
fn test_matches_all_terms() {
    let terms = vec!["love".to_string(), "NEED".to_string()];
    assert!(matches_all_terms("All You Need Is Love", &terms));
    assert!(!matches_all_terms("Love Me Do", &terms));
    assert!(matches_all_terms("anything", &[]));
}

#[test]
fn test_parse_search_types_valid_inputs() {
    let types = parse_search_types("track").unwrap();
    assert_eq!(types.as_slice(), ["track"]);

    let types = parse_search_types(" Album , track,show ").unwrap();
    assert_eq!(types.as_slice(), ["album", "track", "show"]);
}

#[test]
fn test_parse_search_types_invalid_inputs() {
    let result = parse_search_types("");
    assert!(result.unwrap_err().contains("cannot be empty"));

    let result = parse_search_types("   ");
    assert!(result.unwrap_err().contains("cannot be empty"));

    let result = parse_search_types("user");
    assert!(result.unwrap_err().contains("invalid value 'user'"));

    let result = parse_search_types("album,,track");
    assert!(result.unwrap_err().contains("empty segment"));
}

#[test]
fn test_parse_search_types_deduplication() {
    let types = parse_search_types("track,album,track").unwrap();
    assert_eq!(types, SearchTypes(vec!["track".to_string(), "album".to_string()]));
}
