//! Bounding box extraction and formatting

use crate::constants::CrsType;
use crate::error::{Result, ShError};
use crate::models::BBox;
use crate::settings::SettingsState;

/// Decimal places kept for degrees
const DEGREE_PRECISION: i32 = 6;

/// Decimal places kept for projected coordinates
const PROJECTED_PRECISION: i32 = 2;

fn parse_bound(name: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ShError::validation(format!("Invalid {} value '{}'", name, value)))
}

/// Custom download extent in WGS84, as typed in the lat/lng fields
pub fn get_custom_bbox(settings: &SettingsState) -> Result<BBox> {
    let lat_min = parse_bound("lat_min", &settings.lat_min)?;
    let lat_max = parse_bound("lat_max", &settings.lat_max)?;
    let lng_min = parse_bound("lng_min", &settings.lng_min)?;
    let lng_max = parse_bound("lng_max", &settings.lng_max)?;

    Ok(BBox::new(lng_min, lat_min, lng_max, lat_max))
}

fn round_to(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

/// Comma-separated bbox in the axis order the service expects for `crs`.
///
/// WGS84 uses latitude first with 6 decimals; projected systems use `x,y` with 2.
pub fn bbox_to_string(bbox: &BBox, crs: &str) -> String {
    let (coords, precision) = if crs == CrsType::WGS84 {
        ([bbox.min_y, bbox.min_x, bbox.max_y, bbox.max_x], DEGREE_PRECISION)
    } else {
        ([bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y], PROJECTED_PRECISION)
    };

    coords
        .iter()
        .map(|coord| format!("{:?}", round_to(*coord, precision)))
        .collect::<Vec<_>>()
        .join(",")
}
