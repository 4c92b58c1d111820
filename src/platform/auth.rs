//! OAuth token acquisition and caching for the Reddit API

use crate::error::RrdError;
use crate::platform::client::RedditClient;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Token exchange endpoint
const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Identity endpoint used to verify a credential actually works
const VERIFY_URL: &str = "https://oauth.reddit.com/api/v1/me";

/// Safety margin subtracted from the declared token lifetime
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Static OAuth application credentials
#[derive(Debug, Clone)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Present together with `password` for the password grant
    pub username: Option<String>,
    pub password: Option<String>,
}

impl OauthConfig {
    fn grant_type(&self) -> &'static str {
        match (&self.username, &self.password) {
            (Some(_), Some(_)) => "password",
            _ => "client_credentials",
        }
    }
}

/// A cached bearer credential
#[derive(Debug, Clone)]
struct Token {
    access_token: String,
    token_type: String,
    expires_at: Instant,
}

impl Token {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }

    fn header_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: u64,
}

/// Owns the cached credential and refreshes it transparently.
///
/// Shared across concurrent downloads; a race between two expired readers may
/// produce a duplicate exchange, which is harmless — the later write wins.
pub struct TokenManager {
    http: RedditClient,
    config: Option<OauthConfig>,
    token_url: String,
    verify_url: String,
    token: RwLock<Option<Token>>,
}

impl TokenManager {
    /// Create a new token manager; `config == None` means all requests go out
    /// unauthenticated.
    pub fn new(http: RedditClient, config: Option<OauthConfig>) -> Self {
        Self {
            http,
            config,
            token_url: TOKEN_URL.to_string(),
            verify_url: VERIFY_URL.to_string(),
            token: RwLock::new(None),
        }
    }

    /// Override the token exchange endpoint
    pub fn with_token_endpoint(mut self, url: &str) -> Self {
        self.token_url = url.to_string();
        self
    }

    /// Override the identity endpoint
    pub fn with_verify_endpoint(mut self, url: &str) -> Self {
        self.verify_url = url.to_string();
        self
    }

    /// Check whether credentials are configured at all
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Get the `Authorization` header value for an API call.
    ///
    /// Returns `None` when no credentials are configured. Refreshes the
    /// cached token when it is past its expiry margin.
    pub async fn bearer(&self) -> Result<Option<String>, RrdError> {
        if self.config.is_none() {
            return Ok(None);
        }

        {
            let token = self.token.read().await;
            if let Some(token) = token.as_ref().filter(|t| t.is_valid()) {
                return Ok(Some(token.header_value()));
            }
        }

        let mut slot = self.token.write().await;
        // Another request may have refreshed while we waited for the lock
        if let Some(token) = slot.as_ref().filter(|t| t.is_valid()) {
            return Ok(Some(token.header_value()));
        }

        let token = self.exchange().await?;
        let header = token.header_value();
        *slot = Some(token);
        Ok(Some(header))
    }

    /// Attach authorization to a request, degrading to unauthenticated if the
    /// exchange fails. Authentication is best-effort: a public fallback path
    /// exists for every authenticated call.
    pub async fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer().await {
            Ok(Some(value)) => request.header("Authorization", value),
            Ok(None) => request,
            Err(e) => {
                warn!("Failed to get OAuth token, proceeding without authentication: {}", e);
                request
            }
        }
    }

    /// Verify the credential against the identity endpoint
    pub async fn verify(&self) -> Result<bool, RrdError> {
        if self.config.is_none() {
            debug!("OAuth not configured, skipping verification");
            return Ok(false);
        }

        let request = self
            .http
            .create_api_request(reqwest::Method::GET, &self.verify_url);
        let response = self.apply(request).await.send().await?;

        if response.status().is_success() {
            info!("OAuth credential verified");
            Ok(true)
        } else {
            warn!("OAuth verification failed: {}", response.status());
            Ok(false)
        }
    }

    /// Perform the token exchange call
    async fn exchange(&self) -> Result<Token, RrdError> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| RrdError::AuthFailure("OAuth configuration not provided".to_string()))?;

        let grant_type = config.grant_type();
        debug!("Requesting OAuth token via {} grant", grant_type);

        let mut form: Vec<(&str, &str)> = vec![("grant_type", grant_type)];
        if grant_type == "password" {
            if let (Some(username), Some(password)) = (&config.username, &config.password) {
                form.push(("username", username));
                form.push(("password", password));
            }
        }

        let response = self
            .http
            .client()
            .post(&self.token_url)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&form)
            .send()
            .await
            .map_err(|e| RrdError::AuthFailure(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RrdError::AuthFailure(format!(
                "Token request failed: {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| RrdError::AuthFailure(format!("Malformed token response: {}", e)))?;

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_MARGIN);
        info!("Obtained OAuth token, valid for {:?}", lifetime);

        Ok(Token {
            access_token: body.access_token,
            token_type: body.token_type,
            expires_at: Instant::now() + lifetime,
        })
    }
}
