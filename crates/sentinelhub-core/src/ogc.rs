//! OGC request URLs and QGIS layer URIs
//!
//! Every function here is pure: the same settings, layer, and date produce the
//! same string. Endpoints are rooted at the service URL of the layer's data source,
//! since data sources can be hosted on different deployments.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::constants::{CrsType, ServiceType, WMTS_TILE_MATRIX_SET};
use crate::models::Layer;
use crate::ports::Clock;
use crate::settings::SettingsState;
use crate::time::build_time;

/// Characters escaped in query values. Separators that appear in bbox, CRS,
/// time and format values stay readable.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b',')
    .remove(b':')
    .remove(b'/')
    .remove(b';');

/// Characters escaped in a URL embedded into a layer URI
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Flags and fixed OGC parameters of QGIS raster layer URIs
const MAP_LAYER_FLAGS: [(&str, &str); 3] =
    [("IgnoreGetFeatureInfoUrl", "1"), ("IgnoreGetMapUrl", "1"), ("contextualWMSLegend", "0")];

const WMS_VERSION: &str = "1.3.0";
const WFS_VERSION: &str = "2.0.0";

/// Page size of WFS tile queries
const WFS_MAX_FEATURES: u32 = 100;

type Params = Vec<(&'static str, String)>;

fn encode_query(params: &[(&'static str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, utf8_percent_encode(value, QUERY_VALUE)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Layer URIs are read by QGIS without decoding, so the outer parameters stay raw
fn join_uri_params(params: &[(&'static str, String)]) -> String {
    params.iter().map(|(key, value)| format!("{}={}", key, value)).collect::<Vec<_>>().join("&")
}

fn bool_param(value: bool) -> String {
    value.to_string()
}

/// `{service_url}/ogc/{service}/{instance_id}`
fn service_endpoint(settings: &SettingsState, layer: &Layer, service: ServiceType) -> String {
    let base_url = match &layer.data_source.service_url {
        Some(service_url) => service_url.as_str(),
        None => {
            tracing::debug!(
                layer = %layer.id,
                "Service URL of data source {} not resolved, using base URL",
                layer.data_source.source_type
            );
            settings.base_url.as_str()
        }
    };

    format!(
        "{}/ogc/{}/{}",
        base_url.trim_end_matches('/'),
        service.path_segment(),
        settings.instance_id
    )
}

/// Pushes `time` and `maxcc` where the data source supports them
fn push_filters(params: &mut Params, settings: &SettingsState, layer: &Layer, time: String) {
    if !layer.data_source.is_timeless() && !time.is_empty() {
        params.push(("time", time));
    }
    if !layer.data_source.is_cloudless() {
        params.push(("maxcc", settings.maxcc.to_string()));
    }
}

/// QGIS connection URI of a WMS or WMTS raster layer
pub fn get_wms_or_wmts_uri(settings: &SettingsState, layer: &Layer, clock: &dyn Clock) -> String {
    let service = match settings.service_type {
        ServiceType::Wmts => ServiceType::Wmts,
        _ => ServiceType::Wms,
    };

    let mut url_params: Params = vec![("showLogo", bool_param(settings.show_logo))];
    push_filters(&mut url_params, settings, layer, build_time(settings, clock));
    url_params.push(("priority", settings.priority.url_param().to_string()));
    url_params.push(("preview", "1".to_string()));

    let url = format!("{}?{}", service_endpoint(settings, layer, service), encode_query(&url_params));

    let mut uri_params: Params =
        MAP_LAYER_FLAGS.iter().map(|(key, value)| (*key, value.to_string())).collect();
    uri_params.push(("service", service.as_str().to_string()));

    if service == ServiceType::Wmts {
        uri_params.push(("request", "GetTile".to_string()));
    } else {
        uri_params.push(("request", "GetMap".to_string()));
        uri_params.push(("version", WMS_VERSION.to_string()));
    }

    uri_params.extend([
        ("styles", String::new()),
        ("format", "image/png".to_string()),
        ("transparent", "true".to_string()),
        ("layers", layer.id.clone()),
        ("crs", settings.crs.clone()),
    ]);

    if service == ServiceType::Wmts {
        uri_params.push(("tileMatrixSet", WMTS_TILE_MATRIX_SET.to_string()));
    }

    uri_params.push(("url", utf8_percent_encode(&url, URI_COMPONENT).to_string()));
    join_uri_params(&uri_params)
}

/// QGIS connection URI of a WFS vector layer with the data source's tiles
pub fn get_wfs_uri(settings: &SettingsState, layer: &Layer, clock: &dyn Clock) -> String {
    let mut url_params: Params = vec![("srsname", settings.crs.clone())];
    push_filters(&mut url_params, settings, layer, build_time(settings, clock));
    url_params.push(("priority", settings.priority.url_param().to_string()));

    let url = format!(
        "{}?{}",
        service_endpoint(settings, layer, ServiceType::Wfs),
        encode_query(&url_params)
    );

    let uri_params: Params = vec![
        ("pagingEnabled", "true".to_string()),
        ("restrictToRequestBBOX", "1".to_string()),
        ("typename", layer.data_source.wfs_typename()),
        ("url", utf8_percent_encode(&url, URI_COMPONENT).to_string()),
        ("version", "auto".to_string()),
    ];
    join_uri_params(&uri_params)
}

/// URI of the layer for the selected service type
pub fn get_service_uri(settings: &SettingsState, layer: &Layer, clock: &dyn Clock) -> String {
    match settings.service_type {
        ServiceType::Wfs => get_wfs_uri(settings, layer, clock),
        _ => get_wms_or_wmts_uri(settings, layer, clock),
    }
}

/// WFS `GetFeature` request for the tiles of a data source.
///
/// `bbox` must be given in `EPSG:3857`. `maxcc` defaults to 100 so that dates are
/// discovered regardless of their cloud coverage.
pub fn get_wfs_url(
    settings: &SettingsState,
    layer: &Layer,
    bbox: &str,
    time_range: &str,
    maxcc: Option<u8>,
) -> String {
    let params: Params = vec![
        ("service", ServiceType::Wfs.as_str().to_string()),
        ("version", WFS_VERSION.to_string()),
        ("request", "GetFeature".to_string()),
        ("typenames", layer.data_source.wfs_typename()),
        ("bbox", bbox.to_string()),
        ("time", time_range.to_string()),
        ("srsname", CrsType::POP_WEB.to_string()),
        ("maxcc", maxcc.unwrap_or(100).to_string()),
        ("maxfeatures", WFS_MAX_FEATURES.to_string()),
        ("outputformat", "application/json".to_string()),
    ];

    format!(
        "{}?{}",
        service_endpoint(settings, layer, ServiceType::Wfs),
        encode_query(&params)
    )
}

fn resolution(value: &str) -> String {
    format!("{}m", value.trim().trim_end_matches('m'))
}

/// WCS `GetCoverage` request of the layer over `bbox`.
///
/// `crs` overrides the CRS selected in the settings.
pub fn get_wcs_url(
    settings: &SettingsState,
    layer: &Layer,
    bbox: &str,
    crs: Option<&str>,
    clock: &dyn Clock,
) -> String {
    let mut params: Params = vec![
        ("service", ServiceType::Wcs.path_segment().to_string()),
        ("request", "GetCoverage".to_string()),
        ("coverage", layer.id.clone()),
    ];

    let time = build_time(settings, clock);
    if !layer.data_source.is_timeless() && !time.is_empty() {
        params.push(("time", time));
    }

    params.push(("bbox", bbox.to_string()));
    params.push(("crs", crs.unwrap_or(&settings.crs).to_string()));

    if !layer.data_source.is_cloudless() {
        params.push(("maxcc", settings.maxcc.to_string()));
    }

    params.extend([
        ("priority", settings.priority.url_param().to_string()),
        ("format", settings.image_format.url_param().to_string()),
        ("resx", resolution(&settings.resx)),
        ("resy", resolution(&settings.resy)),
        ("showLogo", bool_param(settings.show_logo)),
        ("transparent", "false".to_string()),
    ]);

    format!(
        "{}?{}",
        service_endpoint(settings, layer, ServiceType::Wcs),
        encode_query(&params)
    )
}
