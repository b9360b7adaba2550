//! Service constants and closed enumerations used across the plugin core

use crate::error::{Result, ShError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default timeout for configuration and download requests
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for cloud coverage (WFS) requests
pub const COVERAGE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for user info requests
pub const USER_INFO_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Window in which a repeated network-bound action is ignored
pub const ACTION_COOLDOWN: Duration = Duration::from_secs(2);

/// Cloud coverage is not queried for extents larger than this (meters)
pub const MAX_CLOUD_COVER_BBOX_SIZE: f64 = 100_000.0;

/// Bounded size of the cloud coverage lookup cache
pub const CLOUD_COVER_CACHE_SIZE: usize = 10_000;

/// Namespace of all plugin keys in the settings store
pub const STORE_NAMESPACE: &str = "SentinelHub";

/// Tile matrix set used for WMTS layers
pub const WMTS_TILE_MATRIX_SET: &str = "PopularWebMercator512";

/// Sentinel Hub deployments
pub struct BaseUrl;

impl BaseUrl {
    pub const MAIN: &'static str = "https://services.sentinel-hub.com";
    pub const USWEST: &'static str = "https://services-uswest2.sentinel-hub.com";
}

/// Well-known CRS identifiers
pub struct CrsType;

impl CrsType {
    pub const POP_WEB: &'static str = "EPSG:3857";
    pub const WGS84: &'static str = "EPSG:4326";
}

fn invalid(key: &str, value: &str, expected: &str) -> ShError {
    ShError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("'{}' is not one of {}", value, expected),
    }
}

/// OGC service variants offered by Sentinel Hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ServiceType {
    #[default]
    Wms,
    Wmts,
    Wfs,
    Wcs,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] =
        [ServiceType::Wms, ServiceType::Wmts, ServiceType::Wfs, ServiceType::Wcs];

    /// Upper-case name, e.g. `WMTS`
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Wms => "WMS",
            ServiceType::Wmts => "WMTS",
            ServiceType::Wfs => "WFS",
            ServiceType::Wcs => "WCS",
        }
    }

    /// Path segment used in `/ogc/<service>/<instance>` endpoints
    pub fn path_segment(&self) -> &'static str {
        match self {
            ServiceType::Wms => "wms",
            ServiceType::Wmts => "wmts",
            ServiceType::Wfs => "wfs",
            ServiceType::Wcs => "wcs",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ShError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "wms" => Ok(ServiceType::Wms),
            "wmts" => Ok(ServiceType::Wmts),
            "wfs" => Ok(ServiceType::Wfs),
            "wcs" => Ok(ServiceType::Wcs),
            _ => Err(invalid("service_type", s, "WMS, WMTS, WFS, WCS")),
        }
    }
}

/// Mosaicking priority of overlapping acquisitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ImagePriority {
    #[default]
    MostRecent,
    LeastRecent,
    LeastCloudCoverage,
}

impl ImagePriority {
    /// Value of the `priority` URL parameter
    pub fn url_param(&self) -> &'static str {
        match self {
            ImagePriority::MostRecent => "mostRecent",
            ImagePriority::LeastRecent => "leastRecent",
            ImagePriority::LeastCloudCoverage => "leastCC",
        }
    }

    pub fn nice_name(&self) -> &'static str {
        match self {
            ImagePriority::MostRecent => "Most recent",
            ImagePriority::LeastRecent => "Least recent",
            ImagePriority::LeastCloudCoverage => "Least cloud coverage",
        }
    }
}

impl fmt::Display for ImagePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_param())
    }
}

impl FromStr for ImagePriority {
    type Err = ShError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mostRecent" => Ok(ImagePriority::MostRecent),
            "leastRecent" => Ok(ImagePriority::LeastRecent),
            "leastCC" => Ok(ImagePriority::LeastCloudCoverage),
            _ => Err(invalid("priority", s, "mostRecent, leastRecent, leastCC")),
        }
    }
}

/// Output formats offered for WCS downloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Tiff,
    Tiff32,
}

impl ImageFormat {
    pub fn url_param(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Tiff32 => "image/tiff;depth=32f",
        }
    }

    /// File extension derived from the MIME subtype
    pub fn extension(&self) -> &'static str {
        let param = self.url_param();
        param.split_once('/').map(|(_, subtype)| subtype).unwrap_or(param)
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_param())
    }
}

impl FromStr for ImageFormat {
    type Err = ShError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "image/png" => Ok(ImageFormat::Png),
            "image/jpeg" => Ok(ImageFormat::Jpeg),
            "image/tiff" => Ok(ImageFormat::Tiff),
            "image/tiff;depth=32f" => Ok(ImageFormat::Tiff32),
            _ => Err(invalid(
                "image_format",
                s,
                "image/png, image/jpeg, image/tiff, image/tiff;depth=32f",
            )),
        }
    }
}

/// Which extent a WCS download covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExtentType {
    #[default]
    Current,
    Custom,
}

impl ExtentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtentType::Current => "current",
            ExtentType::Custom => "custom",
        }
    }
}

impl FromStr for ExtentType {
    type Err = ShError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "current" => Ok(ExtentType::Current),
            "custom" => Ok(ExtentType::Custom),
            _ => Err(invalid("download_extent_type", s, "current, custom")),
        }
    }
}

/// Time field currently edited by the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeType {
    #[default]
    StartTime,
    EndTime,
}

impl TimeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeType::StartTime => "start_time",
            TimeType::EndTime => "end_time",
        }
    }
}

impl FromStr for TimeType {
    type Err = ShError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "start_time" => Ok(TimeType::StartTime),
            "end_time" => Ok(TimeType::EndTime),
            _ => Err(invalid("active_time", s, "start_time, end_time")),
        }
    }
}
