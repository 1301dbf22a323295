//! Resource identifiers.
//!
//! Every Spotify resource is named by a three part string such as
//! `spotify:track:6rqhFgbbKwnb9MLmUQDhG6`. [`Uri`] is the parsed, immutable
//! form of that string and is the key of the identity map kept by
//! [`crate::cache::Cache`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Prefix used when rendering identifiers.
pub const SERVICE: &str = "spotify";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Track,
    Playlist,
    Album,
    Artist,
    Episode,
    Show,
    User,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Track,
        ResourceType::Playlist,
        ResourceType::Album,
        ResourceType::Artist,
        ResourceType::Episode,
        ResourceType::Show,
        ResourceType::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Track => "track",
            ResourceType::Playlist => "playlist",
            ResourceType::Album => "album",
            ResourceType::Artist => "artist",
            ResourceType::Episode => "episode",
            ResourceType::Show => "show",
            ResourceType::User => "user",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::MalformedIdentifier(s.to_string()))
    }
}

/// Parsed resource identifier: a resource type plus its opaque id.
///
/// Two identifiers are equal iff type and id match. The canonical string form
/// is always `spotify:{type}:{id}`; the service segment of a parsed string is
/// not checked.
///
/// # Example
///
/// ```
/// use spotcache::uri::{ResourceType, Uri};
///
/// let uri: Uri = "spotify:track:abc123".parse()?;
/// assert_eq!(uri.kind(), ResourceType::Track);
/// assert_eq!(uri.to_string(), "spotify:track:abc123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Uri {
    kind: ResourceType,
    id: String,
}

impl Uri {
    /// Builds an identifier from its parts.
    ///
    /// The id must be non-empty and free of `:` so that the canonical string
    /// parses back to the same identifier.
    pub fn new(kind: ResourceType, id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.is_empty() || id.contains(':') {
            return Err(Error::MalformedIdentifier(format!("{}:{}:{}", SERVICE, kind, id)));
        }
        Ok(Self { kind, id })
    }

    pub fn kind(&self) -> ResourceType {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", SERVICE, self.kind, self.id)
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let [_service, kind, id] = parts.as_slice() else {
            return Err(Error::MalformedIdentifier(s.to_string()));
        };
        kind.parse::<ResourceType>()
            .and_then(|kind| Uri::new(kind, *id))
            .map_err(|_| Error::MalformedIdentifier(s.to_string()))
    }
}

impl TryFrom<String> for Uri {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Uri> for String {
    fn from(uri: Uri) -> Self {
        uri.to_string()
    }
}
