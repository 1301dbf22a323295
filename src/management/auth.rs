use std::path::{Path, PathBuf};

use crate::{
    config,
    error::{Error, Result},
    spotify,
    types::{Authentication, TokenResponse},
    utils,
};

/// Seconds before the actual expiry at which a token is treated as expired.
pub const EXPIRY_MARGIN: i64 = 240;

pub struct AuthManager {
    auth: Authentication,
    path: PathBuf,
}

impl AuthManager {
    pub fn new(auth: Authentication) -> Self {
        Self::with_path(auth, Self::auth_path())
    }

    pub fn with_path(auth: Authentication, path: impl Into<PathBuf>) -> Self {
        AuthManager {
            auth,
            path: path.into(),
        }
    }

    pub async fn load() -> Result<Self> {
        Self::load_from(Self::auth_path()).await
    }

    pub async fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = async_fs::read_to_string(path).await.map_err(|e| {
            Error::Auth(format!(
                "cannot read {} ({}), run `spotcache auth` first",
                path.display(),
                e
            ))
        })?;
        let auth: Authentication = serde_json::from_str(&content)?;
        Ok(Self::with_path(auth, path))
    }

    pub async fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.auth)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Returns a usable access token, refreshing and persisting it first when
    /// it expires within the next four minutes.
    pub async fn valid_token(&mut self) -> Result<String> {
        match &self.auth.token {
            Some(token) if !self.is_expired() => Ok(token.clone()),
            _ => self.refresh().await,
        }
    }

    pub async fn refresh(&mut self) -> Result<String> {
        let response = spotify::auth::refresh_token(&self.auth).await?;
        self.apply(response);
        self.persist().await?;
        self.auth
            .token
            .clone()
            .ok_or_else(|| Error::Auth("token endpoint returned no access token".to_string()))
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(utils::now_timestamp())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.auth.token_expires - EXPIRY_MARGIN
    }

    /// Stores a token response. A response without a refresh token keeps the
    /// previous one.
    pub fn apply(&mut self, response: TokenResponse) {
        self.apply_at(response, utils::now_timestamp());
    }

    pub fn apply_at(&mut self, response: TokenResponse, now: i64) {
        self.auth.token = Some(response.access_token);
        self.auth.token_expires = now + response.expires_in;
        if let Some(refresh_token) = response.refresh_token {
            self.auth.refresh_token = Some(refresh_token);
        }
        if let Some(scope) = response.scope {
            self.auth.scope = scope;
        }
    }

    pub fn authentication(&self) -> &Authentication {
        &self.auth
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn auth_path() -> PathBuf {
        config::data_dir().join("authentication.json")
    }
}
