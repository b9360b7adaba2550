//! Account information of the logged in user

use std::time::Duration;

use serde::Deserialize;
use sentinelhub_core::error::Result;
use sentinelhub_core::ports::Downloader;
use sentinelhub_core::settings::SettingsState;

#[derive(Debug, Default, Deserialize)]
struct TokenInfo {
    given_name: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

/// Display name of the user owning the credentials, if the account has one
pub fn get_username(
    settings: &SettingsState,
    downloader: &dyn Downloader,
    timeout: Duration,
) -> Result<Option<String>> {
    let url = format!("{}/oauth/tokeninfo", settings.base_url.trim_end_matches('/'));
    let info: TokenInfo = downloader
        .download(&url, timeout, Some(&settings.session_settings()))?
        .json()?;

    Ok([info.given_name, info.name, info.email]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty()))
}
