//! Sentinel Hub configurations ("instances"), their layers, and data sources

use serde::{Deserialize, Serialize};

/// Data source types that carry no cloud coverage information
const CLOUDLESS_TYPES: [&str; 2] = ["S1GRD", "DEM"];

/// Data source types without a time dimension
const TIMELESS_TYPES: [&str; 1] = ["DEM"];

/// Data source type of BYOC (bring your own COG) collections
const CUSTOM_TYPE: &str = "CUSTOM";

/// Display names of the built-in data source types
const DATA_SOURCE_NAMES: [(&str, &str); 11] = [
    ("S2L1C", "Sentinel-2 L1C"),
    ("S2L2A", "Sentinel-2 L2A"),
    ("S1GRD", "Sentinel-1 GRD"),
    ("L8L1C", "Landsat 8 L1C"),
    ("LOTL1", "Landsat 8-9 L1"),
    ("LOTL2", "Landsat 8-9 L2"),
    ("MODIS", "MODIS"),
    ("DEM", "DEM"),
    ("S3OLCI", "Sentinel-3 OLCI"),
    ("S3SLSTR", "Sentinel-3 SLSTR"),
    ("S5PL2", "Sentinel-5P L2"),
];

/// A named account configuration bundling a set of layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: String,
    pub name: String,
    /// `None` until the layers of this configuration are loaded
    pub layers: Option<Vec<Layer>>,
}

impl Configuration {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), layers: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.layers.is_some()
    }
}

/// A layer of a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub info: String,
    pub data_source: DataSource,
}

impl Layer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data_source: DataSource) -> Self {
        Self { id: id.into(), name: name.into(), info: String::new(), data_source }
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }
}

/// Identity of a data source, used to memoize its service URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataSourceKey {
    pub source_type: String,
    pub id: i64,
}

/// The satellite dataset backing a layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    /// Dataset type, e.g. `S2L1C`, `S1GRD`, `DEM`
    pub source_type: String,
    pub id: i64,
    pub collection_id: Option<String>,
    pub name: Option<String>,
    /// Deployment hosting this data source. `None` means not resolved yet.
    pub service_url: Option<String>,
}

impl DataSource {
    pub fn new(source_type: impl Into<String>, id: i64) -> Self {
        Self {
            source_type: source_type.into(),
            id,
            collection_id: None,
            name: None,
            service_url: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_collection_id(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn with_service_url(mut self, service_url: impl Into<String>) -> Self {
        self.service_url = Some(service_url.into());
        self
    }

    pub fn key(&self) -> DataSourceKey {
        DataSourceKey { source_type: self.source_type.clone(), id: self.id }
    }

    /// True if imagery of this source has no cloud coverage (`maxcc` is meaningless)
    pub fn is_cloudless(&self) -> bool {
        CLOUDLESS_TYPES.contains(&self.source_type.as_str())
    }

    /// True if imagery of this source has no time dimension
    pub fn is_timeless(&self) -> bool {
        TIMELESS_TYPES.contains(&self.source_type.as_str())
    }

    pub fn is_resolved(&self) -> bool {
        self.service_url.is_some()
    }

    /// Feature type name of this source's tiles in the WFS service
    pub fn wfs_typename(&self) -> String {
        match (&self.collection_id, self.source_type.as_str()) {
            (Some(collection_id), CUSTOM_TYPE) => format!("byoc-{}", collection_id),
            _ => format!("DSS{}", self.id),
        }
    }

    /// Name used in layer names and filenames
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }

        DATA_SOURCE_NAMES
            .iter()
            .find(|(source_type, _)| *source_type == self.source_type)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| self.source_type.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloudless_and_timeless() {
        let dem = DataSource::new("DEM", 1);
        assert!(dem.is_cloudless());
        assert!(dem.is_timeless());

        let s1 = DataSource::new("S1GRD", 3);
        assert!(s1.is_cloudless());
        assert!(!s1.is_timeless());

        let s2 = DataSource::new("S2L1C", 1);
        assert!(!s2.is_cloudless());
        assert!(!s2.is_timeless());
    }

    #[test]
    fn test_wfs_typename() {
        assert_eq!(DataSource::new("S2L2A", 2).wfs_typename(), "DSS2");
        assert_eq!(
            DataSource::new("CUSTOM", 10).with_collection_id("abc-123").wfs_typename(),
            "byoc-abc-123"
        );
    }

    #[test]
    fn test_display_name() {
        assert_eq!(DataSource::new("S2L1C", 1).display_name(), "Sentinel-2 L1C");
        assert_eq!(DataSource::new("DEM", 4).with_name("COP_30").display_name(), "COP_30");
        assert_eq!(DataSource::new("HLS", 9).display_name(), "HLS");
    }

    #[test]
    fn test_configuration_starts_unloaded() {
        let configuration = Configuration::new("abc", "Test");
        assert!(!configuration.is_loaded());
    }
}
