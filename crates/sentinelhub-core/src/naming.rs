//! Names of QGIS layers and downloaded files

use crate::constants::ServiceType;
use crate::models::Layer;
use crate::settings::SettingsState;
use crate::time::time_interval_name;

/// Name of a QGIS layer, e.g. `S2L2A - TRUE-COLOR (WCS, 2023-03-01/2023-03-10, 20%, mostRecent, EPSG:3857)`
pub fn get_qgis_layer_name(settings: &SettingsState, layer: &Layer) -> String {
    let data_source = &layer.data_source;
    let mut params = vec![settings.service_type.as_str().to_string()];

    if !data_source.is_timeless() {
        params.push(time_interval_name(settings));
    }
    if !data_source.is_cloudless() {
        params.push(format!("{}%", settings.maxcc));
    }
    if !(data_source.is_timeless() && data_source.is_cloudless()) {
        params.push(settings.priority.url_param().to_string());
    }
    params.push(settings.crs.clone());

    let params = params.join(", ");
    match settings.service_type {
        ServiceType::Wfs => format!("{} ({})", data_source.display_name(), params),
        _ => format!("{} - {} ({})", data_source.display_name(), layer.name, params),
    }
}

/// Name of a downloaded image.
///
/// `<source>_<layer>[_<time>]_<bbox>_<crs>[_<maxcc>][_<priority>][_logo].<ext>`, with
/// spaces removed and `:` and `/` replaced by `_`.
pub fn get_filename(settings: &SettingsState, layer: &Layer, bbox: &str) -> String {
    let data_source = &layer.data_source;
    let mut parts = vec![data_source.display_name(), layer.id.clone()];

    if !data_source.is_timeless() {
        parts.push(time_interval_name(settings));
    }

    parts.extend(bbox.split(',').map(str::to_string));
    parts.push(settings.crs.clone());

    if !data_source.is_cloudless() {
        parts.push(settings.maxcc.to_string());
    }
    if !(data_source.is_timeless() && data_source.is_cloudless()) {
        parts.push(settings.priority.url_param().to_string());
    }
    if settings.show_logo {
        parts.push("logo".to_string());
    }

    let filename = format!("{}.{}", parts.join("_"), settings.image_format.extension());
    filename.replace(' ', "").replace([':', '/'], "_")
}
