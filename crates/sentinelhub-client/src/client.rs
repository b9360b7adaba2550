//! HTTP client for Sentinel Hub services
//!
//! Every request carries the plugin's `User-Agent` and goes through the proxy the
//! host application is configured with. Authenticated requests reuse one session per
//! set of credentials. Transport failures are turned into readable
//! [`ShError::Download`] messages.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::Reader;
use sentinelhub_core::clock::SystemClock;
use sentinelhub_core::error::{Result, ShError};
use sentinelhub_core::models::HttpResponse;
use sentinelhub_core::ports::{Clock, Downloader, SessionSettings, SettingsStore};

use crate::proxy::ProxyConfig;
use crate::session::{OAuthTokenSource, Session, TokenSource};

/// `User-Agent` of all requests
pub const USER_AGENT: &str = concat!("sh_qgis_plugin_", env!("CARGO_PKG_VERSION"));

/// Why a request failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure<'a> {
    Connection,
    Timeout,
    /// Unsuccessful status with the response body
    Http { body: &'a [u8] },
    Other(String),
}

impl Failure<'_> {
    fn from_reqwest(err: &reqwest::Error) -> Failure<'static> {
        if err.is_timeout() {
            Failure::Timeout
        } else if err.is_connect() {
            Failure::Connection
        } else {
            Failure::Other(err.to_string())
        }
    }
}

/// Readable message of a failed request
pub fn error_message(failure: &Failure<'_>, proxy: &ProxyConfig) -> String {
    let proxy_hint = || match proxy.address() {
        Some(address) => format!(" QGIS is configured to use proxy: {}", address),
        None => String::new(),
    };

    match failure {
        Failure::Connection => format!(
            "ConnectionError: Cannot access service, check your internet connection.{}",
            proxy_hint()
        ),
        Failure::Timeout => {
            format!("Timeout: Connection timed out, service is too slow{}", proxy_hint())
        }
        Failure::Http { body } => {
            let server_message = parse_service_exception(body)
                .unwrap_or_else(|| String::from_utf8_lossy(body).trim_matches(['\n', '\t', ' ']).to_string());
            format!("HTTPError: server response: \"{}\"", sanitize(&server_message))
        }
        Failure::Other(detail) => format!("RequestException: {}", detail),
    }
}

/// Printable ASCII only
fn sanitize(message: &str) -> String {
    message.chars().filter(|c| c.is_ascii_graphic() || *c == ' ').collect()
}

/// Text of the `ServiceException` elements of an OGC exception report
pub fn parse_service_exception(body: &[u8]) -> Option<String> {
    let content = String::from_utf8_lossy(body);
    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut in_exception = false;
    let mut found = false;
    let mut message = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                if depth == 2 && e.local_name().as_ref().ends_with(b"ServiceException") {
                    in_exception = true;
                    found = true;
                }
            }
            Ok(Event::End(_)) => {
                if depth == 2 {
                    in_exception = false;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(e)) if in_exception => {
                if let Ok(text) = e.unescape() {
                    message.push_str(text.trim_matches(['\n', '\t', ' ']));
                }
            }
            Ok(Event::CData(e)) if in_exception => {
                message.push_str(String::from_utf8_lossy(&e).trim_matches(['\n', '\t', ' ']));
            }
            Ok(Event::Eof) => break,
            Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }

    found.then_some(message)
}

struct HttpState {
    proxy: ProxyConfig,
    http: reqwest::blocking::Client,
}

fn build_http(proxy: &ProxyConfig) -> Result<reqwest::blocking::Client> {
    let mut builder = reqwest::blocking::Client::builder().user_agent(USER_AGENT);
    if let Some(proxy) = proxy.to_reqwest()? {
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ShError::download(format!("Failed to create HTTP client: {}", e)))
}

/// Blocking HTTP client implementing [`Downloader`]
pub struct Client {
    store: Arc<dyn SettingsStore>,
    token_source: Arc<dyn TokenSource>,
    clock: Arc<dyn Clock>,
    http: Mutex<HttpState>,
    sessions: Mutex<HashMap<SessionSettings, Arc<Session>>>,
}

impl Client {
    /// Client reading the host proxy from `store` and fetching tokens over OAuth2
    pub fn new(store: Arc<dyn SettingsStore>) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let proxy = ProxyConfig::from_store(store.as_ref());
        let http = build_http(&proxy)?;
        let token_source = Arc::new(OAuthTokenSource::new(http.clone(), clock.clone()));

        Ok(Self {
            store,
            token_source,
            clock,
            http: Mutex::new(HttpState { proxy, http }),
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Client with an injected token source and clock
    pub fn with_token_source(
        store: Arc<dyn SettingsStore>,
        token_source: Arc<dyn TokenSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let proxy = ProxyConfig::from_store(store.as_ref());
        let http = build_http(&proxy)?;

        Ok(Self {
            store,
            token_source,
            clock,
            http: Mutex::new(HttpState { proxy, http }),
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Session for the credentials, created on first use
    pub fn get_session(&self, settings: &SessionSettings) -> Result<Arc<Session>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.get(settings) {
            return Ok(session.clone());
        }

        let session =
            Arc::new(Session::new(settings.clone(), self.token_source.clone(), self.clock.clone())?);
        sessions.insert(settings.clone(), session.clone());
        Ok(session)
    }

    /// HTTP client matching the current proxy configuration
    fn http_client(&self, proxy: &ProxyConfig) -> Result<reqwest::blocking::Client> {
        let mut state = self.http.lock().unwrap_or_else(PoisonError::into_inner);
        if state.proxy != *proxy {
            tracing::debug!(proxy = ?proxy.address(), "Proxy configuration changed");
            state.http = build_http(proxy)?;
            state.proxy = proxy.clone();
        }
        Ok(state.http.clone())
    }
}

impl Downloader for Client {
    fn download(
        &self,
        url: &str,
        timeout: Duration,
        session: Option<&SessionSettings>,
    ) -> Result<HttpResponse> {
        let proxy = ProxyConfig::from_store(self.store.as_ref());
        let http = self.http_client(&proxy)?;

        let mut request = http.get(url).timeout(timeout);
        if let Some(settings) = session {
            for (name, value) in self.get_session(settings)?.session_headers()? {
                request = request.header(name, value);
            }
        }

        tracing::debug!(url, "Downloading");

        let response = request
            .send()
            .map_err(|e| ShError::download(error_message(&Failure::from_reqwest(&e), &proxy)))?;

        let status = response.status();
        let body = response
            .bytes()
            .map_err(|e| ShError::download(error_message(&Failure::from_reqwest(&e), &proxy)))?
            .to_vec();

        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "Request failed");
            return Err(ShError::download(error_message(&Failure::Http { body: &body }, &proxy)));
        }

        Ok(HttpResponse::new(status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy() -> ProxyConfig {
        ProxyConfig {
            enabled: true,
            host: Some("proxy.local".to_string()),
            port: Some("3128".to_string()),
            ..ProxyConfig::default()
        }
    }

    #[test]
    fn test_user_agent_carries_version() {
        assert!(USER_AGENT.starts_with("sh_qgis_plugin_"));
        assert!(USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_connection_error_message() {
        assert_eq!(
            error_message(&Failure::Connection, &ProxyConfig::default()),
            "ConnectionError: Cannot access service, check your internet connection."
        );
        assert_eq!(
            error_message(&Failure::Connection, &proxy()),
            "ConnectionError: Cannot access service, check your internet connection. QGIS is configured to use proxy: proxy.local:3128"
        );
    }

    #[test]
    fn test_timeout_message() {
        assert_eq!(
            error_message(&Failure::Timeout, &ProxyConfig::default()),
            "Timeout: Connection timed out, service is too slow"
        );
    }

    #[test]
    fn test_http_error_with_service_exception() {
        let body = br#"<?xml version='1.0' encoding="UTF-8"?>
<ServiceExceptionReport version="1.3.0" xmlns="http://www.opengis.net/ogc">
    <ServiceException>
        <![CDATA[ Dataset with id: 2 not found ]]>
    </ServiceException>
</ServiceExceptionReport>"#;

        assert_eq!(
            error_message(&Failure::Http { body }, &ProxyConfig::default()),
            "HTTPError: server response: \"Dataset with id: 2 not found\""
        );
    }

    #[test]
    fn test_http_error_with_namespace_prefix() {
        let body = br#"<ogc:ServiceExceptionReport xmlns:ogc="http://www.opengis.net/ogc"><ogc:ServiceException>Invalid &amp; unknown layer</ogc:ServiceException></ogc:ServiceExceptionReport>"#;
        assert_eq!(parse_service_exception(body).as_deref(), Some("Invalid & unknown layer"));
    }

    #[test]
    fn test_http_error_falls_back_to_text() {
        let body = "\n {\"error\":{\"status\":401,\"reason\":\"Unauthorized – token\"}}\t".as_bytes();
        assert_eq!(
            error_message(&Failure::Http { body }, &ProxyConfig::default()),
            "HTTPError: server response: \"{\"error\":{\"status\":401,\"reason\":\"Unauthorized  token\"}}\""
        );
    }

    #[test]
    fn test_client_builds_with_proxy() {
        let store = Arc::new(sentinelhub_core::store::MemoryStore::new());
        store.set("proxy/proxyEnabled", "true").unwrap();
        store.set("proxy/proxyHost", "proxy.local").unwrap();

        let client = Client::new(store.clone()).unwrap();
        let proxy = ProxyConfig::from_store(store.as_ref());
        assert!(client.http_client(&proxy).is_ok());
    }
}
