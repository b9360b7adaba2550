//! Configurations and layers from the Sentinel Hub Configuration API
//!
//! Lists are cached for the lifetime of the manager and only reloaded on request.
//! The deployment hosting a data source is resolved on first use and remembered per
//! data source.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde::Deserialize;
use sentinelhub_core::constants::DEFAULT_REQUEST_TIMEOUT;
use sentinelhub_core::error::{Result, ShError};
use sentinelhub_core::models::{Configuration, Crs, DataSource, DataSourceKey, Layer};
use sentinelhub_core::ports::{CrsRegistry, Downloader};
use sentinelhub_core::settings::SettingsState;

use crate::capabilities::WmsCapabilities;

#[derive(Debug, Deserialize)]
struct InstancePayload {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayerPayload {
    id: String,
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    datasource_defaults: Option<DatasourceDefaults>,
    dataset_source: Option<DatasetSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasourceDefaults {
    #[serde(rename = "type")]
    source_type: Option<String>,
    collection_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatasetSource {
    #[serde(rename = "@id")]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceSettings {
    index_service_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourcePayload {
    #[serde(default)]
    settings: SourceSettings,
}

impl LayerPayload {
    /// `None` if the payload does not name its data source
    fn into_layer(self) -> Option<Layer> {
        let source_type = self.datasource_defaults.as_ref()?.source_type.clone()?;
        let source_id = self.dataset_source?.id.rsplit('/').next()?.parse::<i64>().ok()?;

        let mut data_source = DataSource::new(source_type, source_id);
        if let Some(collection_id) = self.datasource_defaults.and_then(|d| d.collection_id) {
            data_source = data_source.with_collection_id(collection_id);
        }

        let name = self.title.unwrap_or_else(|| self.id.clone());
        Some(Layer::new(self.id, name, data_source).with_info(self.description.unwrap_or_default()))
    }
}

/// Scheme and host of an index service URL
fn service_root(index_service_url: &str) -> Option<String> {
    let (scheme, rest) = index_service_url.split_once("://")?;
    let host = rest.split('/').next().filter(|host| !host.is_empty())?;
    Some(format!("{}://{}", scheme, host))
}

fn index_by_id<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    ids.enumerate().map(|(index, id)| (id.to_string(), index)).collect()
}

#[derive(Debug, Clone)]
struct LayerList {
    layers: Vec<Layer>,
    index: HashMap<String, usize>,
}

#[derive(Debug, Default)]
struct ConfigurationList {
    configurations: Vec<Configuration>,
    index: HashMap<String, usize>,
}

/// Queries and caches configurations, layers and the CRS they offer
pub struct ConfigurationManager {
    downloader: Arc<dyn Downloader>,
    registry: Arc<dyn CrsRegistry>,
    timeout: Duration,
    configurations: RwLock<Option<ConfigurationList>>,
    layers: RwLock<HashMap<String, LayerList>>,
    service_urls: RwLock<HashMap<DataSourceKey, String>>,
    capabilities: RwLock<Option<Arc<WmsCapabilities>>>,
}

impl ConfigurationManager {
    pub fn new(downloader: Arc<dyn Downloader>, registry: Arc<dyn CrsRegistry>) -> Self {
        Self {
            downloader,
            registry,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            configurations: RwLock::new(None),
            layers: RwLock::new(HashMap::new()),
            service_urls: RwLock::new(HashMap::new()),
            capabilities: RwLock::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn configuration_url(settings: &SettingsState) -> String {
        format!("{}/configuration/v1", settings.base_url.trim_end_matches('/'))
    }

    fn fetch_json<T: serde::de::DeserializeOwned>(&self, settings: &SettingsState, url: &str) -> Result<T> {
        self.downloader.download(url, self.timeout, Some(&settings.session_settings()))?.json()
    }

    /// All configurations of the account, sorted by name
    pub fn get_configurations(&self, settings: &SettingsState, reload: bool) -> Result<Vec<Configuration>> {
        if !reload {
            if let Some(cached) = self.configurations.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
                tracing::debug!("Using cached configurations");
                return Ok(cached.configurations.clone());
            }
        }

        let url = format!("{}/wms/instances", Self::configuration_url(settings));
        let instances: Vec<InstancePayload> = self.fetch_json(settings, &url)?;

        let mut configurations: Vec<Configuration> =
            instances.into_iter().map(|instance| Configuration::new(instance.id, instance.name)).collect();
        configurations.sort_by_key(|configuration| configuration.name.to_lowercase());

        tracing::info!(count = configurations.len(), "Loaded configurations");

        let index = index_by_id(configurations.iter().map(|c| c.id.as_str()));
        *self.configurations.write().unwrap_or_else(PoisonError::into_inner) =
            Some(ConfigurationList { configurations: configurations.clone(), index });

        if reload {
            self.layers.write().unwrap_or_else(PoisonError::into_inner).clear();
            *self.capabilities.write().unwrap_or_else(PoisonError::into_inner) = None;
        }

        Ok(configurations)
    }

    /// Position of the configuration among the loaded ones
    pub fn get_configuration_index(&self, instance_id: &str) -> Option<usize> {
        self.configurations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(|cached| cached.index.get(instance_id).copied())
    }

    /// Layers of a configuration, sorted by name
    pub fn get_layers(&self, settings: &SettingsState, instance_id: &str, reload: bool) -> Result<Vec<Layer>> {
        if !reload {
            if let Some(cached) = self.layers.read().unwrap_or_else(PoisonError::into_inner).get(instance_id) {
                tracing::debug!(instance_id, "Using cached layers");
                return Ok(cached.layers.clone());
            }
        }

        if instance_id.trim().is_empty() {
            return Err(ShError::InvalidInstanceId { instance_id: instance_id.to_string() });
        }

        let url = format!("{}/wms/instances/{}/layers", Self::configuration_url(settings), instance_id);
        let payload: Vec<LayerPayload> = self.fetch_json(settings, &url)?;

        let mut layers: Vec<Layer> = payload
            .into_iter()
            .filter_map(|layer| {
                let id = layer.id.clone();
                let parsed = layer.into_layer();
                if parsed.is_none() {
                    tracing::warn!(instance_id, layer = %id, "Skipping layer without a data source");
                }
                parsed
            })
            .collect();
        layers.sort_by_key(|layer| layer.name.to_lowercase());

        tracing::debug!(instance_id, count = layers.len(), "Loaded layers");

        let index = index_by_id(layers.iter().map(|layer| layer.id.as_str()));
        self.layers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(instance_id.to_string(), LayerList { layers: layers.clone(), index });

        let mut configurations = self.configurations.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = configurations.as_mut() {
            if let Some(&position) = cached.index.get(instance_id) {
                cached.configurations[position].layers = Some(layers.clone());
            }
        }

        Ok(layers)
    }

    /// Position of the layer among the loaded layers of its configuration
    pub fn get_layer_index(&self, instance_id: &str, layer_id: &str) -> Option<usize> {
        self.layers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(instance_id)
            .and_then(|cached| cached.index.get(layer_id).copied())
    }

    /// A layer of a configuration.
    ///
    /// With `load_url` the service URL of its data source is resolved if it is not
    /// known yet.
    pub fn get_layer(
        &self,
        settings: &SettingsState,
        instance_id: &str,
        layer_id: &str,
        load_url: bool,
    ) -> Result<Option<Layer>> {
        let layers = self.get_layers(settings, instance_id, false)?;
        let Some(position) = self.get_layer_index(instance_id, layer_id) else {
            return Ok(None);
        };
        let Some(mut layer) = layers.into_iter().nth(position) else {
            return Ok(None);
        };

        let key = layer.data_source.key();
        let known = self.service_urls.read().unwrap_or_else(PoisonError::into_inner).get(&key).cloned();

        match known {
            Some(service_url) => layer.data_source.service_url = Some(service_url),
            None if load_url => {
                let service_url = self.load_service_url(settings, &layer.data_source)?;
                self.service_urls
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, service_url.clone());
                layer.data_source.service_url = Some(service_url);
            }
            None => {}
        }

        Ok(Some(layer))
    }

    fn load_service_url(&self, settings: &SettingsState, data_source: &DataSource) -> Result<String> {
        let url = format!(
            "{}/datasets/{}/sources/{}",
            Self::configuration_url(settings),
            data_source.source_type,
            data_source.id
        );
        let source: SourcePayload = self.fetch_json(settings, &url)?;

        let service_url = match source.settings.index_service_url.as_deref().and_then(service_root) {
            Some(service_url) => service_url,
            None => {
                tracing::debug!(
                    source_type = %data_source.source_type,
                    "Data source has no index service, using base URL"
                );
                settings.base_url.trim_end_matches('/').to_string()
            }
        };

        tracing::debug!(source_type = %data_source.source_type, id = data_source.id, %service_url, "Resolved service URL");
        Ok(service_url)
    }

    /// Capabilities of the selected configuration, recreated when the selection changes
    fn capabilities(&self, settings: &SettingsState) -> Arc<WmsCapabilities> {
        if let Some(capabilities) = self.capabilities.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            if capabilities.instance_id() == settings.instance_id && capabilities.base_url() == settings.base_url {
                return capabilities.clone();
            }
        }

        let capabilities = Arc::new(
            WmsCapabilities::new(
                self.downloader.clone(),
                self.registry.clone(),
                settings.base_url.clone(),
                settings.instance_id.clone(),
            )
            .with_timeout(self.timeout),
        );
        *self.capabilities.write().unwrap_or_else(PoisonError::into_inner) = Some(capabilities.clone());
        capabilities
    }

    /// CRS offered by the selected configuration for the selected service type
    pub fn get_available_crs(&self, settings: &SettingsState) -> Result<Vec<Crs>> {
        self.capabilities(settings).get_available_crs(settings.service_type)
    }

    /// Position of `crs_id` among the available CRS, 0 if it is not offered
    pub fn get_crs_index(&self, settings: &SettingsState, crs_id: &str) -> Result<usize> {
        self.capabilities(settings).get_crs_index(settings.service_type, crs_id)
    }
}
