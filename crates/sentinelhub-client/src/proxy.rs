//! Host proxy configuration
//!
//! The host application keeps its proxy under the `proxy/` group of the settings store.

use sentinelhub_core::error::{Result, ShError};
use sentinelhub_core::ports::SettingsStore;

const PROXY_ENABLED: &str = "proxy/proxyEnabled";
const PROXY_HOST: &str = "proxy/proxyHost";
const PROXY_PORT: &str = "proxy/proxyPort";
const PROXY_USER: &str = "proxy/proxyUser";
const PROXY_PASSWORD: &str = "proxy/proxyPassword";

/// Proxy the host application is configured to use
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub host: Option<String>,
    pub port: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ProxyConfig {
    pub fn from_store(store: &dyn SettingsStore) -> Self {
        Self {
            enabled: store
                .get(PROXY_ENABLED)
                .map(|value| value.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            host: non_empty(store.get(PROXY_HOST)),
            port: non_empty(store.get(PROXY_PORT)),
            user: non_empty(store.get(PROXY_USER)),
            password: store.get(PROXY_PASSWORD).filter(|v| !v.is_empty()),
        }
    }

    /// `host[:port]` of an enabled proxy
    pub fn address(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let host = self.host.as_deref()?;
        Some(match &self.port {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    /// Credentials, if the proxy is enabled and both are set
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.enabled, self.user.as_deref(), self.password.as_deref()) {
            (true, Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }

    /// Proxy for all schemes, or `None` if no proxy is active
    pub fn to_reqwest(&self) -> Result<Option<reqwest::Proxy>> {
        let Some(address) = self.address() else {
            return Ok(None);
        };

        let mut proxy = reqwest::Proxy::all(format!("http://{}", address)).map_err(|e| {
            ShError::ConfigInvalid { key: "proxy".to_string(), reason: e.to_string() }
        })?;

        if let Some((user, password)) = self.credentials() {
            proxy = proxy.basic_auth(user, password);
        }

        Ok(Some(proxy))
    }
}
