use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    config,
    error::{Error, Result},
    management::AuthManager,
    server::start_api_server,
    types::{Authentication, PkceToken, TokenResponse},
    utils, warning,
};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs the OAuth 2.0 authorization code flow with PKCE and persists the result.
///
/// # Arguments
///
/// * `shared_state` - State shared with the callback handler. It carries the
///   code verifier and the expected `state` value to the handler and the
///   exchanged token back.
///
/// # Authentication Flow
///
/// 1. **PKCE Setup**: Generates a code verifier and derives the S256 challenge
/// 2. **Server Start**: Launches the local callback server
/// 3. **Browser Launch**: Opens the authorization URL in the default browser
/// 4. **Callback Handling**: The callback exchanges the code for a token
/// 5. **Persistence**: The token is stored through [`AuthManager`]
///
/// # Errors
///
/// - [`Error::Config`] if the client id is missing or the authorization URL
///   cannot be built
/// - [`Error::Auth`] if no token arrives within 60 seconds
/// - I/O errors while persisting the authentication state
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tokio::sync::Mutex;
///
/// let shared_state = Arc::new(Mutex::new(None));
/// let manager = authorize(shared_state).await?;
/// ```
pub async fn authorize(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Result<AuthManager> {
    let client_id = config::spotify_client_id()?;
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let auth_url = authorization_url(&client_id, &code_challenge, &state)?;

    // store verifier before the browser can hit the callback
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier,
            state,
            token: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state)
        .await
        .ok_or_else(|| Error::Auth("authentication failed or timed out".to_string()))?;

    let mut manager = AuthManager::new(Authentication {
        client_id,
        client_secret: config::spotify_client_secret(),
        scope: config::spotify_scope(),
        show_dialog: false,
        refresh_token: None,
        token: None,
        token_expires: 0,
    });
    manager.apply(token);
    manager.persist().await?;

    Ok(manager)
}

/// Builds the authorize URL with all query parameters encoded.
pub fn authorization_url(client_id: &str, code_challenge: &str, state: &str) -> Result<Url> {
    let redirect_uri = config::spotify_redirect_uri();
    let scope = config::spotify_scope();
    Url::parse_with_params(
        &config::spotify_apiauth_url(),
        &[
            ("client_id", client_id),
            ("response_type", "code"),
            ("redirect_uri", redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid authorization url: {}", e)))
}

/// Polls the shared state once per second until the callback stored a token,
/// giving up after 60 seconds.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<TokenResponse> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|pkce| pkce.token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges a refresh token for a new access token.
///
/// When a client secret is configured the request is authenticated with HTTP
/// Basic authentication, otherwise the client id is sent in the form body as
/// required for PKCE clients.
///
/// # Errors
///
/// - [`Error::Auth`] if no refresh token is stored or the token endpoint
///   rejects the request
/// - [`Error::Http`] for network failures or an unparseable response
pub async fn refresh_token(auth: &Authentication) -> Result<TokenResponse> {
    let refresh_token = auth
        .refresh_token
        .as_deref()
        .ok_or_else(|| Error::Auth("no refresh token stored, run `spotcache auth`".to_string()))?;

    let client = Client::new();
    let request = client.post(config::spotify_apitoken_url());
    let request = match &auth.client_secret {
        Some(secret) => request
            .basic_auth(&auth.client_id, Some(secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ]),
        None => request.form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", auth.client_id.as_str()),
        ]),
    };

    debug!("refreshing access token");
    token_response(request.send().await?).await
}

/// Completes the PKCE flow by exchanging an authorization code for a token.
///
/// # Arguments
///
/// * `code` - Authorization code received on the callback
/// * `verifier` - The code verifier whose challenge was sent to the authorize endpoint
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<TokenResponse> {
    let client_id = config::spotify_client_id()?;
    let redirect_uri = config::spotify_redirect_uri();

    let client = Client::new();
    let res = client
        .post(config::spotify_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri.as_str()),
        ])
        .send()
        .await?;

    token_response(res).await
}

async fn token_response(res: reqwest::Response) -> Result<TokenResponse> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(Error::Auth(format!(
            "token endpoint returned {}: {}",
            status, body
        )));
    }
    Ok(res.json::<TokenResponse>().await?)
}
