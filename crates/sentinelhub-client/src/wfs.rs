//! Cloud coverage of available acquisition dates, from the WFS tile index

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use geojson::GeoJson;
use sentinelhub_core::constants::{
    CrsType, CLOUD_COVER_CACHE_SIZE, COVERAGE_REQUEST_TIMEOUT, MAX_CLOUD_COVER_BBOX_SIZE,
};
use sentinelhub_core::error::{Result, ShError};
use sentinelhub_core::extent::bbox_to_string;
use sentinelhub_core::models::{BBox, Layer};
use sentinelhub_core::ogc::get_wfs_url;
use sentinelhub_core::ports::Downloader;
use sentinelhub_core::settings::SettingsState;
use sentinelhub_geo::{is_bbox_too_large, transform_bbox};

/// Cloud coverage in percent by acquisition date
pub type CloudCoverMap = BTreeMap<String, f64>;

/// Parse a WFS `GetFeature` JSON response into a cloud coverage map.
///
/// Features without a date are skipped. A missing `cloudCoverPercentage` counts as 0.
pub fn parse_cloud_cover(body: &str) -> Result<CloudCoverMap> {
    let geojson: GeoJson = body
        .parse()
        .map_err(|e| ShError::Serialization(format!("Invalid WFS response: {}", e)))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(ShError::Serialization("WFS response is not a feature collection".to_string()));
    };

    let mut cloud_cover = CloudCoverMap::new();
    for feature in collection.features {
        let Some(properties) = feature.properties else {
            continue;
        };

        let date = match properties.get("date") {
            Some(serde_json::Value::String(date)) => date.clone(),
            Some(serde_json::Value::Null) | None => continue,
            Some(other) => other.to_string(),
        };

        let percentage = properties
            .get("cloudCoverPercentage")
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0);

        cloud_cover.insert(date, percentage);
    }

    Ok(cloud_cover)
}

/// Memo of successful lookups, evicting the oldest entry when full
struct BoundedCache {
    capacity: usize,
    entries: HashMap<String, CloudCoverMap>,
    order: VecDeque<String>,
}

impl BoundedCache {
    fn new(capacity: usize) -> Self {
        Self { capacity, entries: HashMap::new(), order: VecDeque::new() }
    }

    fn get(&self, key: &str) -> Option<&CloudCoverMap> {
        self.entries.get(key)
    }

    fn insert(&mut self, key: String, value: CloudCoverMap) {
        if self.entries.insert(key.clone(), value).is_some() {
            return;
        }
        self.order.push_back(key);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Looks up cloud coverage through WFS and remembers the results per request URL
pub struct CloudCoverLookup {
    downloader: Arc<dyn Downloader>,
    timeout: Duration,
    cache: Mutex<BoundedCache>,
}

impl CloudCoverLookup {
    pub fn new(downloader: Arc<dyn Downloader>) -> Self {
        Self::with_capacity(downloader, CLOUD_COVER_CACHE_SIZE)
    }

    pub fn with_capacity(downloader: Arc<dyn Downloader>, capacity: usize) -> Self {
        Self {
            downloader,
            timeout: COVERAGE_REQUEST_TIMEOUT,
            cache: Mutex::new(BoundedCache::new(capacity)),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Cloud coverage of every date in `time_interval` with imagery over `bbox`.
    ///
    /// `bbox` is given in `crs`. Extents too large for the tile index give an empty map.
    pub fn try_get_cloud_cover(
        &self,
        settings: &SettingsState,
        layer: &Layer,
        bbox: &BBox,
        crs: &str,
        time_interval: &str,
    ) -> Result<CloudCoverMap> {
        if is_bbox_too_large(bbox, crs, MAX_CLOUD_COVER_BBOX_SIZE) == Some(true) {
            tracing::debug!("Extent too large for a cloud coverage lookup");
            return Ok(CloudCoverMap::new());
        }

        let projected = transform_bbox(bbox, crs, CrsType::POP_WEB)?;
        let bbox_str = bbox_to_string(&projected, CrsType::POP_WEB);
        let url = get_wfs_url(settings, layer, &bbox_str, time_interval, Some(100));

        if let Some(cached) = self.cache.lock().unwrap_or_else(PoisonError::into_inner).get(&url) {
            tracing::debug!("Using cached cloud coverage");
            return Ok(cached.clone());
        }

        let response = self.downloader.download(&url, self.timeout, None)?;
        let cloud_cover = parse_cloud_cover(&response.text())?;

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url, cloud_cover.clone());
        Ok(cloud_cover)
    }

    /// Like [`try_get_cloud_cover`](Self::try_get_cloud_cover), with failures giving an empty map
    pub fn get_cloud_cover(
        &self,
        settings: &SettingsState,
        layer: &Layer,
        bbox: &BBox,
        crs: &str,
        time_interval: &str,
    ) -> CloudCoverMap {
        self.try_get_cloud_cover(settings, layer, bbox, crs, time_interval)
            .unwrap_or_else(|e| {
                tracing::warn!(layer = %layer.id, "Cloud coverage lookup failed: {}", e);
                CloudCoverMap::new()
            })
    }
}
