//! Sentinel Hub Client - Authenticated access to the Sentinel Hub services
//!
//! This crate implements the network side of the plugin core: OAuth2 sessions, the
//! HTTP client with proxy support and error translation, the Configuration API, WMS
//! capabilities, cloud coverage lookups, and WCS downloads.

pub mod capabilities;
pub mod client;
pub mod configuration;
pub mod proxy;
pub mod session;
pub mod user;
pub mod wcs;
pub mod wfs;

pub use capabilities::WmsCapabilities;
pub use client::Client;
pub use configuration::ConfigurationManager;
pub use proxy::ProxyConfig;
pub use session::{OAuthTokenSource, Session, Token, TokenSource};
pub use user::get_username;
pub use wcs::download_wcs_image;
pub use wfs::{CloudCoverLookup, CloudCoverMap};
