use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, SecondsFormat, Utc};
use rand::{Rng, distr::Alphanumeric};
use reqwest::Url;
use sha2::{Digest, Sha256};

pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Appends percent-encoded `key=value` pairs to an endpoint, skipping `None` values.
///
/// An endpoint that already carries a query string is extended with `&`.
pub fn endpoint_with_params(endpoint: &str, params: &[(&str, Option<&str>)]) -> String {
    let present: Vec<(&str, &str)> = params
        .iter()
        .filter_map(|(key, value)| value.map(|v| (*key, v)))
        .collect();

    if present.is_empty() {
        return endpoint.to_string();
    }

    let separator = if endpoint.contains('?') { '&' } else { '?' };
    format!("{}{}{}", endpoint, separator, encode_query(&present))
}

pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}

pub fn format_timestamp(timestamp: Option<&DateTime<Utc>>) -> String {
    timestamp
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| "-".to_string())
}

/// True when `name` contains every term, ignoring case.
pub fn matches_all_terms(name: &str, terms: &[String]) -> bool {
    let name = name.to_lowercase();
    terms
        .iter()
        .all(|term| name.contains(&term.to_lowercase()))
}

/// Search types selected on the command line, deduplicated, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTypes(pub Vec<String>);

impl SearchTypes {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Splits a comma separated `--type` argument into Spotify search types.
pub fn parse_search_types(input: &str) -> Result<SearchTypes, String> {
    const VALID: [&str; 6] = ["album", "artist", "playlist", "track", "episode", "show"];

    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("search type cannot be empty".to_string());
    }

    let mut types: Vec<String> = Vec::new();
    for segment in trimmed.split(',') {
        let segment = segment.trim().to_lowercase();
        if segment.is_empty() {
            return Err(format!("empty segment in '{}'", input));
        }
        if !VALID.contains(&segment.as_str()) {
            return Err(format!(
                "invalid value '{}'; expected one of {}",
                segment,
                VALID.join(", ")
            ));
        }
        if !types.contains(&segment) {
            types.push(segment);
        }
    }

    Ok(SearchTypes(types))
}

/// Percent-encodes `params` as an `application/x-www-form-urlencoded` query string.
pub fn encode_query(params: &[(&str, &str)]) -> String {
    let mut url = match Url::parse("http://localhost/") {
        Ok(url) => url,
        Err(_) => return String::new(),
    };
    url.query_pairs_mut().extend_pairs(params);
    url.query().unwrap_or_default().to_string()
}
