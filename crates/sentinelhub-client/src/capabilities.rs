//! WMS capabilities of a configuration
//!
//! Only the CRS list is read from `GetCapabilities`. It is filtered to the CRS the
//! host registry recognizes and sorted by EPSG code, with unparsable codes last.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::Reader;
use sentinelhub_core::constants::{CrsType, ServiceType, DEFAULT_REQUEST_TIMEOUT};
use sentinelhub_core::error::{Result, ShError};
use sentinelhub_core::models::Crs;
use sentinelhub_core::ports::{CrsRegistry, Downloader};

/// Element path of the CRS entries, below the document root
const CRS_PATH: [&[u8]; 3] = [b"Capability", b"Layer", b"CRS"];

/// Extract the `<Capability><Layer><CRS>` entries of a WMS capabilities document.
///
/// Namespace prefixes are ignored.
pub fn parse_crs_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut crs_ids = Vec::new();

    let at_crs = |path: &[Vec<u8>]| {
        path.len() == CRS_PATH.len() + 1
            && path[1..].iter().zip(CRS_PATH).all(|(name, expected)| name.as_slice() == expected)
    };

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => path.push(e.local_name().as_ref().to_vec()),
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(e)) if at_crs(&path) => {
                let text = e
                    .unescape()
                    .map_err(|e| ShError::Serialization(format!("Invalid capabilities XML: {}", e)))?;
                let crs_id = text.trim();
                if !crs_id.is_empty() {
                    crs_ids.push(crs_id.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ShError::Serialization(format!("Invalid capabilities XML: {}", e)));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(crs_ids)
}

/// Sort by EPSG code ascending, unparsable codes last in their original order
fn sort_crs_list(crs_list: &mut [Crs]) {
    crs_list.sort_by_key(|crs| match crs.epsg_code() {
        Some(code) => (false, code),
        None => (true, 0),
    });
}

/// CRS offered by one configuration, loaded once
pub struct WmsCapabilities {
    downloader: Arc<dyn Downloader>,
    registry: Arc<dyn CrsRegistry>,
    base_url: String,
    instance_id: String,
    timeout: Duration,
    crs_list: RwLock<Option<Vec<Crs>>>,
}

impl WmsCapabilities {
    pub fn new(
        downloader: Arc<dyn Downloader>,
        registry: Arc<dyn CrsRegistry>,
        base_url: impl Into<String>,
        instance_id: impl Into<String>,
    ) -> Self {
        Self {
            downloader,
            registry,
            base_url: base_url.into(),
            instance_id: instance_id.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
            crs_list: RwLock::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn capabilities_url(&self) -> String {
        format!(
            "{}/ogc/wms/{}?service=WMS&request=GetCapabilities&version=1.3.0",
            self.base_url.trim_end_matches('/'),
            self.instance_id
        )
    }

    /// Every supported CRS of the configuration
    fn load_crs_list(&self) -> Result<Vec<Crs>> {
        if let Some(crs_list) = self.crs_list.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            return Ok(crs_list.clone());
        }

        tracing::debug!(instance_id = %self.instance_id, "Loading WMS capabilities");
        let response = self.downloader.download(&self.capabilities_url(), self.timeout, None)?;

        let mut crs_list: Vec<Crs> = parse_crs_ids(&response.text())?
            .into_iter()
            .filter(|crs_id| {
                let supported = self.registry.is_supported(crs_id);
                if !supported {
                    tracing::debug!(crs = %crs_id, "Skipping CRS unknown to the registry");
                }
                supported
            })
            .map(|crs_id| {
                let name = crs_id.replace(':', ": ");
                Crs::new(crs_id, name)
            })
            .collect();
        sort_crs_list(&mut crs_list);

        *self.crs_list.write().unwrap_or_else(PoisonError::into_inner) = Some(crs_list.clone());
        Ok(crs_list)
    }

    /// CRS that can be selected for the service type.
    ///
    /// WMTS tiles are only served in the web mercator tile matrix set.
    pub fn get_available_crs(&self, service_type: ServiceType) -> Result<Vec<Crs>> {
        let crs_list = self.load_crs_list()?;

        Ok(match service_type {
            ServiceType::Wmts => {
                vec![Crs::new(CrsType::POP_WEB, CrsType::POP_WEB.replace(':', ": "))]
            }
            _ => crs_list,
        })
    }

    /// Position of `crs_id` in the list for the service type, 0 if absent
    pub fn get_crs_index(&self, service_type: ServiceType, crs_id: &str) -> Result<usize> {
        let crs_list = self.get_available_crs(service_type)?;
        Ok(crs_list.iter().position(|crs| crs.id == crs_id).unwrap_or(0))
    }
}
