//! Image downloads from the WCS service

use std::fs;
use std::path::Path;
use std::time::Duration;

use sentinelhub_core::constants::{CrsType, ExtentType};
use sentinelhub_core::error::Result;
use sentinelhub_core::extent::bbox_to_string;
use sentinelhub_core::models::{BBox, Layer};
use sentinelhub_core::naming::get_filename;
use sentinelhub_core::ogc::get_wcs_url;
use sentinelhub_core::ports::{Clock, Downloader};
use sentinelhub_core::settings::SettingsState;
use sentinelhub_core::validation::require_download_folder;

/// CRS of the download extent: the map CRS for the current extent, WGS84 for a custom one
pub fn download_crs(settings: &SettingsState) -> &str {
    match settings.download_extent_type {
        ExtentType::Current => &settings.crs,
        ExtentType::Custom => CrsType::WGS84,
    }
}

/// Download an image of `bbox` into the download folder and return its filename.
///
/// `bbox` is given in [`download_crs`].
pub fn download_wcs_image(
    settings: &SettingsState,
    layer: &Layer,
    bbox: &BBox,
    downloader: &dyn Downloader,
    clock: &dyn Clock,
    timeout: Duration,
) -> Result<String> {
    require_download_folder(settings)?;

    let crs = download_crs(settings);
    let bbox_str = bbox_to_string(bbox, crs);
    let url = get_wcs_url(settings, layer, &bbox_str, Some(crs), clock);
    let filename = get_filename(settings, layer, &bbox_str);

    tracing::info!(layer = %layer.id, %filename, "Downloading image");
    let response = downloader.download(&url, timeout, None)?;

    fs::write(Path::new(&settings.download_folder).join(&filename), &response.body)?;
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use sentinelhub_core::clock::FixedClock;
    use sentinelhub_core::error::ShError;
    use sentinelhub_core::models::{DataSource, HttpResponse};
    use sentinelhub_core::ports::SessionSettings;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct ImageDownloader {
        urls: Mutex<Vec<String>>,
        timeouts: Mutex<Vec<Duration>>,
    }

    impl Downloader for ImageDownloader {
        fn download(&self, url: &str, timeout: Duration, session: Option<&SessionSettings>) -> Result<HttpResponse> {
            assert!(session.is_none());
            self.urls.lock().unwrap().push(url.to_string());
            self.timeouts.lock().unwrap().push(timeout);
            Ok(HttpResponse::ok(b"\x89PNG".to_vec()))
        }
    }

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2023, 3, 20, 0, 0, 0).unwrap())
    }

    fn layer() -> Layer {
        Layer::new("1", "Aspect", DataSource::new("DEM", 4).with_name("COP_30"))
    }

    #[test]
    fn test_download_writes_image() {
        let dir = TempDir::new().unwrap();
        let settings = SettingsState {
            instance_id: "abc".to_string(),
            crs: "EPSG:3035".to_string(),
            download_extent_type: ExtentType::Custom,
            show_logo: true,
            download_folder: dir.path().to_string_lossy().into_owned(),
            ..SettingsState::default()
        };
        let downloader = ImageDownloader::default();
        let bbox = BBox::new(41.870072, 12.44693, 41.917096, 12.541001);

        let filename =
            download_wcs_image(&settings, &layer(), &bbox, &downloader, &clock(), Duration::from_secs(90)).unwrap();

        assert_eq!(filename, "COP_30_1_12.44693_41.870072_12.541001_41.917096_EPSG_3035_logo.png");
        assert_eq!(fs::read(dir.path().join(&filename)).unwrap(), b"\x89PNG");

        let urls = downloader.urls.lock().unwrap();
        assert!(urls[0].contains("crs=EPSG:4326"));
        assert!(urls[0].contains("bbox=12.44693,41.870072,12.541001,41.917096"));
        assert_eq!(*downloader.timeouts.lock().unwrap(), vec![Duration::from_secs(90)]);
    }

    #[test]
    fn test_download_requires_folder() {
        let settings = SettingsState::default();
        let downloader = ImageDownloader::default();
        let bbox = BBox::new(0.0, 0.0, 1.0, 1.0);

        let result = download_wcs_image(&settings, &layer(), &bbox, &downloader, &clock(), Duration::from_secs(60));
        assert!(matches!(result, Err(ShError::Validation { .. })));
        assert!(downloader.urls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_download_crs() {
        let mut settings = SettingsState { crs: "EPSG:32633".to_string(), ..SettingsState::default() };
        assert_eq!(download_crs(&settings), "EPSG:32633");
        settings.download_extent_type = ExtentType::Custom;
        assert_eq!(download_crs(&settings), "EPSG:4326");
    }
}
