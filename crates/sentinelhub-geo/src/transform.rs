//! Bounding box reprojection

use geo::{BoundingRect, Coord, MultiPoint, Point};
use proj::Proj;
use sentinelhub_core::error::{Result, ShError};
use sentinelhub_core::models::BBox;

fn corners(bbox: &BBox) -> [(f64, f64); 4] {
    [
        (bbox.min_x, bbox.min_y),
        (bbox.min_x, bbox.max_y),
        (bbox.max_x, bbox.min_y),
        (bbox.max_x, bbox.max_y),
    ]
}

/// Envelope of the transformed corners
fn envelope(points: Vec<(f64, f64)>, target_crs: &str) -> Result<BBox> {
    let points: MultiPoint<f64> = points.into_iter().map(|(x, y)| Point::new(x, y)).collect();

    if points.iter().any(|p| !p.x().is_finite() || !p.y().is_finite()) {
        return Err(ShError::BBoxTransform {
            target_crs: target_crs.to_string(),
            reason: "Projected coordinates are not finite".to_string(),
        });
    }

    let rect = points.bounding_rect().ok_or_else(|| ShError::BBoxTransform {
        target_crs: target_crs.to_string(),
        reason: "Empty bounding box".to_string(),
    })?;

    let (Coord { x: min_x, y: min_y }, Coord { x: max_x, y: max_y }) = (rect.min(), rect.max());
    Ok(BBox::new(min_x, min_y, max_x, max_y))
}

/// Projection between two `EPSG:<code>` ids, axes in easting/northing (longitude/latitude) order
pub(crate) fn projection(from_crs: &str, to_crs: &str) -> Result<Proj> {
    Proj::new_known_crs(from_crs, to_crs, None).map_err(|e| ShError::BBoxTransform {
        target_crs: to_crs.to_string(),
        reason: format!("Failed to create projection from {}: {}", from_crs, e),
    })
}

/// Reproject `bbox` from `from_crs` to `to_crs`, returning the envelope of its corners
pub fn transform_bbox(bbox: &BBox, from_crs: &str, to_crs: &str) -> Result<BBox> {
    if from_crs == to_crs {
        return Ok(*bbox);
    }

    tracing::trace!(from = from_crs, to = to_crs, "Reprojecting bbox");
    let proj = projection(from_crs, to_crs)?;

    let points = corners(bbox)
        .iter()
        .map(|corner| {
            proj.convert(*corner).map_err(|e| ShError::BBoxTransform {
                target_crs: to_crs.to_string(),
                reason: format!("Projection failed: {}", e),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    envelope(points, to_crs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!((actual - expected).abs() <= tolerance, "{} != {} (±{})", actual, expected, tolerance);
    }

    #[test]
    fn test_identity() {
        let bbox = BBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(transform_bbox(&bbox, "EPSG:3035", "EPSG:3035").unwrap(), bbox);
    }

    #[test]
    fn test_wgs84_to_web_mercator() {
        let bbox = transform_bbox(&BBox::new(0.0, 0.0, 180.0, 45.0), "EPSG:4326", "EPSG:3857").unwrap();
        assert_close(bbox.min_x, 0.0, 1e-6);
        assert_close(bbox.min_y, 0.0, 1e-6);
        assert_close(bbox.max_x, 20_037_508.342_789_244, 1e-3);
        assert_close(bbox.max_y, 5_621_521.486_192_066, 1e-3);
    }

    #[test]
    fn test_web_mercator_round_trip() {
        let original = BBox::new(12.44693, 41.870072, 12.541001, 41.917096);
        let projected = transform_bbox(&original, "EPSG:4326", "EPSG:3857").unwrap();
        let back = transform_bbox(&projected, "EPSG:3857", "EPSG:4326").unwrap();

        assert_close(back.min_x, original.min_x, 1e-7);
        assert_close(back.min_y, original.min_y, 1e-7);
        assert_close(back.max_x, original.max_x, 1e-7);
        assert_close(back.max_y, original.max_y, 1e-7);
    }

    #[test]
    fn test_wgs84_to_utm() {
        // Central meridian of zone 31, from the equator to one degree north
        let bbox = transform_bbox(&BBox::new(3.0, 0.0, 3.0, 1.0), "EPSG:4326", "EPSG:32631").unwrap();
        assert_close(bbox.min_x, 500_000.0, 1e-3);
        assert_close(bbox.min_y, 0.0, 1e-3);
        assert_close(bbox.max_y, 110_530.0, 5.0);
    }

    #[test]
    fn test_utm_to_web_mercator() {
        // About 10 km around Rome
        let utm = BBox::new(288_000.0, 4_636_000.0, 298_000.0, 4_646_000.0);
        let bbox = transform_bbox(&utm, "EPSG:32633", "EPSG:3857").unwrap();

        let wgs84 = transform_bbox(&bbox, "EPSG:3857", "EPSG:4326").unwrap();
        assert!(wgs84.min_x > 12.3 && wgs84.max_x < 12.6, "{:?}", wgs84);
        assert!(wgs84.min_y > 41.8 && wgs84.max_y < 42.0, "{:?}", wgs84);
    }

    #[test]
    fn test_laea_europe_to_wgs84() {
        let laea = BBox::new(4_500_000.0, 2_000_000.0, 4_510_000.0, 2_010_000.0);
        let bbox = transform_bbox(&laea, "EPSG:3035", "EPSG:4326").unwrap();
        assert!(bbox.min_x > 10.0 && bbox.max_x < 20.0, "{:?}", bbox);
        assert!(bbox.min_y > 35.0 && bbox.max_y < 45.0, "{:?}", bbox);
    }

    #[test]
    fn test_unknown_crs_is_a_transform_error() {
        let bbox = BBox::new(1.0, 2.0, 3.0, 4.0);
        let err = transform_bbox(&bbox, "EPSG:4326", "EPSG:not-a-code").unwrap_err();
        match err {
            ShError::BBoxTransform { target_crs, .. } => assert_eq!(target_crs, "EPSG:not-a-code"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
