use std::time::Duration;

use crate::error::Result;
use crate::models::HttpResponse;

/// Credentials identifying an authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionSettings {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Port for performing HTTP GET requests against Sentinel Hub
pub trait Downloader: Send + Sync {
    /// Download `url`, authenticating with `session` if given
    ///
    /// # Errors
    /// `ShError::Session` if a token cannot be obtained, `ShError::Download` for
    /// any transport failure or unsuccessful HTTP status.
    fn download(
        &self,
        url: &str,
        timeout: Duration,
        session: Option<&SessionSettings>,
    ) -> Result<HttpResponse>;
}
