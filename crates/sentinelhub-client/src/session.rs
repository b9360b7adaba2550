//! OAuth2 sessions with Sentinel Hub
//!
//! A session holds a bearer token obtained with the client credentials grant and
//! replaces it before it expires.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use sentinelhub_core::constants::DEFAULT_REQUEST_TIMEOUT;
use sentinelhub_core::error::{Result, ShError};
use sentinelhub_core::ports::{Clock, SessionSettings};

/// Characters escaped in `application/x-www-form-urlencoded` values
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'*');

/// A bearer token and the moment it stops being accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Port for obtaining new tokens
pub trait TokenSource: Send + Sync {
    /// # Errors
    /// `ShError::Session` if the token exchange fails
    fn fetch_token(&self, settings: &SessionSettings) -> Result<Token>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// Seconds
    expires_in: Option<i64>,
    /// Epoch seconds
    expires_at: Option<i64>,
}

/// Client credentials grant against `{base_url}/oauth/token`
pub struct OAuthTokenSource {
    http: reqwest::blocking::Client,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl OAuthTokenSource {
    pub fn new(http: reqwest::blocking::Client, clock: Arc<dyn Clock>) -> Self {
        Self { http, clock, timeout: DEFAULT_REQUEST_TIMEOUT }
    }

    fn form_body(settings: &SessionSettings) -> String {
        [
            ("grant_type", "client_credentials"),
            ("client_id", settings.client_id.as_str()),
            ("client_secret", settings.client_secret.as_str()),
        ]
        .iter()
        .map(|(key, value)| format!("{}={}", key, utf8_percent_encode(value, FORM_VALUE)))
        .collect::<Vec<_>>()
        .join("&")
    }
}

fn session_error(reason: impl Into<String>) -> ShError {
    ShError::Session { reason: reason.into() }
}

impl TokenSource for OAuthTokenSource {
    fn fetch_token(&self, settings: &SessionSettings) -> Result<Token> {
        let url = format!("{}/oauth/token", settings.base_url.trim_end_matches('/'));

        tracing::info!("Creating a new authentication session with Sentinel Hub service");

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Self::form_body(settings))
            .timeout(self.timeout)
            .send()
            .map_err(|e| session_error(format!("Token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| session_error(format!("Failed to read token response: {}", e)))?;

        if !status.is_success() {
            return Err(session_error(format!("{} {}", status.as_u16(), body.trim())));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| session_error(format!("Invalid token response: {}", e)))?;

        let expires_at = match (token.expires_at, token.expires_in) {
            (Some(expires_at), _) => DateTime::from_timestamp(expires_at, 0),
            (None, Some(expires_in)) => Some(self.clock.now() + chrono::Duration::seconds(expires_in)),
            (None, None) => None,
        }
        .ok_or_else(|| session_error("Token response carries no expiry"))?;

        Ok(Token { access_token: token.access_token, expires_at })
    }
}

/// An authenticated session, refreshed transparently
pub struct Session {
    settings: SessionSettings,
    source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    token: Mutex<Option<Token>>,
}

impl Session {
    /// Tokens expiring within this margin are replaced
    pub const SECONDS_BEFORE_EXPIRY: i64 = 60;

    /// Create a session and fetch its first token, which validates the credentials
    pub fn new(
        settings: SessionSettings,
        source: Arc<dyn TokenSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let session = Self { settings, source, clock, token: Mutex::new(None) };
        session.token()?;
        Ok(session)
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// A token valid for at least `SECONDS_BEFORE_EXPIRY` more seconds
    pub fn token(&self) -> Result<Token> {
        let mut cached = self.token.lock().unwrap_or_else(PoisonError::into_inner);

        let deadline = self.clock.now() + chrono::Duration::seconds(Self::SECONDS_BEFORE_EXPIRY);
        if let Some(token) = cached.as_ref().filter(|token| token.expires_at > deadline) {
            return Ok(token.clone());
        }

        let token = self.source.fetch_token(&self.settings)?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// `Authorization` header carrying the bearer token
    pub fn session_headers(&self) -> Result<Vec<(String, String)>> {
        let token = self.token()?;
        Ok(vec![("Authorization".to_string(), format!("Bearer {}", token.access_token))])
    }
}
