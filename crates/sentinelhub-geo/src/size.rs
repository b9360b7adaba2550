//! Approximate bounding box dimensions in meters

use sentinelhub_core::constants::CrsType;
use sentinelhub_core::error::Result;
use sentinelhub_core::models::BBox;

use crate::transform::transform_bbox;

/// WGS84 UTM zone of a point, e.g. `EPSG:32633`
pub fn lng_to_utm_zone(lng: f64, lat: f64) -> String {
    let zone = (((lng + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60);
    let hemisphere = if lat > 0.0 { 6 } else { 7 };
    format!("EPSG:32{}{:02}", hemisphere, zone)
}

/// Width and height of `bbox` measured in the UTM zone of its center
pub fn bbox_size(bbox: &BBox, crs: &str) -> Result<(f64, f64)> {
    let wgs84 = transform_bbox(bbox, crs, CrsType::WGS84)?;
    let (lng, lat) = wgs84.center();

    let utm = transform_bbox(&wgs84, CrsType::WGS84, &lng_to_utm_zone(lng, lat))?;
    Ok((utm.width(), utm.height()))
}

/// Whether any dimension of `bbox` exceeds `size_limit` meters.
///
/// `None` if the size cannot be estimated.
pub fn is_bbox_too_large(bbox: &BBox, crs: &str, size_limit: f64) -> Option<bool> {
    match bbox_size(bbox, crs) {
        Ok((width, height)) => Some(width.max(height) > size_limit),
        Err(e) => {
            tracing::debug!(crs, "Cannot estimate bbox size: {}", e);
            None
        }
    }
}
