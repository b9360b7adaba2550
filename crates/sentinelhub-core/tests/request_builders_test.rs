//! Properties of the request builders, naming, and extent formatting

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use sentinelhub_core::clock::FixedClock;
use sentinelhub_core::constants::{ImagePriority, ServiceType};
use sentinelhub_core::extent::{bbox_to_string, get_custom_bbox};
use sentinelhub_core::models::{DataSource, Layer};
use sentinelhub_core::naming::{get_filename, get_qgis_layer_name};
use sentinelhub_core::ogc::{get_service_uri, get_wcs_url, get_wfs_url};
use sentinelhub_core::settings::{SettingField, Settings};
use sentinelhub_core::SettingsState;

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2023, 3, 15, 12, 0, 0).unwrap())
}

fn service_type() -> impl Strategy<Value = ServiceType> {
    prop::sample::select(ServiceType::ALL.to_vec())
}

fn priority() -> impl Strategy<Value = ImagePriority> {
    prop::sample::select(vec![
        ImagePriority::MostRecent,
        ImagePriority::LeastRecent,
        ImagePriority::LeastCloudCoverage,
    ])
}

fn source_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["S2L1C", "S2L2A", "S1GRD", "DEM", "CUSTOM"])
}

fn date() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (2017u32..2024, 1u32..13, 1u32..29).prop_map(|(y, m, d)| format!("{:04}-{:02}-{:02}", y, m, d)),
    ]
}

prop_compose! {
    fn settings_state()(
        service_type in service_type(),
        priority in priority(),
        maxcc in 0u8..=100,
        start_time in date(),
        end_time in date(),
        is_exact_date in any::<bool>(),
        show_logo in any::<bool>(),
        crs in prop::sample::select(vec!["EPSG:3857", "EPSG:4326", "EPSG:3035"]),
    ) -> SettingsState {
        SettingsState {
            instance_id: "abc".to_string(),
            service_type,
            priority,
            maxcc,
            start_time,
            end_time,
            is_exact_date,
            show_logo,
            crs: crs.to_string(),
            ..SettingsState::default()
        }
    }
}

prop_compose! {
    fn layer()(source_type in source_type(), id in 1i64..20) -> Layer {
        Layer::new(
            "TRUE-COLOR",
            "True color",
            DataSource::new(source_type, id)
                .with_collection_id("0c5ab0e4")
                .with_service_url("https://creodias.sentinel-hub.com"),
        )
    }
}

proptest! {
    #[test]
    fn builders_are_pure(settings in settings_state(), layer in layer()) {
        let clock = clock();
        let bbox = "10,20,11,21";

        prop_assert_eq!(get_service_uri(&settings, &layer, &clock), get_service_uri(&settings, &layer, &clock));
        prop_assert_eq!(get_wcs_url(&settings, &layer, bbox, None, &clock), get_wcs_url(&settings, &layer, bbox, None, &clock));
        prop_assert_eq!(
            get_wfs_url(&settings, &layer, bbox, "2023-03-01/2023-03-31/P1D", None),
            get_wfs_url(&settings, &layer, bbox, "2023-03-01/2023-03-31/P1D", None)
        );
        prop_assert_eq!(get_qgis_layer_name(&settings, &layer), get_qgis_layer_name(&settings, &layer));
        prop_assert_eq!(get_filename(&settings, &layer, bbox), get_filename(&settings, &layer, bbox));
    }

    #[test]
    fn urls_are_rooted_at_the_service_url(settings in settings_state(), layer in layer()) {
        let url = get_wcs_url(&settings, &layer, "10,20,11,21", None, &clock());
        prop_assert!(url.starts_with("https://creodias.sentinel-hub.com/ogc/wcs/abc?"));
        prop_assert!(url.contains("&bbox=10,20,11,21&"));
        let expected_crs = format!("&crs={}&", settings.crs);
        prop_assert!(url.contains(&expected_crs));
        prop_assert_eq!(url.contains("&maxcc="), !layer.data_source.is_cloudless());
    }

    #[test]
    fn filenames_have_no_illegal_characters(settings in settings_state(), layer in layer()) {
        let filename = get_filename(&settings, &layer, "12.44693, 41.870072, 12.541001, 41.917096");
        prop_assert!(!filename.contains(' '));
        prop_assert!(!filename.contains(':'));
        prop_assert!(!filename.contains('/'));
        prop_assert!(filename.ends_with(".png"));
    }

    #[test]
    fn custom_bbox_is_normalized(
        lat_a in -90.0f64..90.0,
        lat_b in -90.0f64..90.0,
        lng_a in -180.0f64..180.0,
        lng_b in -180.0f64..180.0,
        crs in prop::sample::select(vec!["EPSG:4326", "EPSG:3857"]),
    ) {
        let settings = SettingsState {
            lat_min: lat_a.to_string(),
            lat_max: lat_b.to_string(),
            lng_min: lng_a.to_string(),
            lng_max: lng_b.to_string(),
            ..SettingsState::default()
        };

        let bbox = get_custom_bbox(&settings).unwrap();
        let coords: Vec<f64> = bbox_to_string(&bbox, crs)
            .split(',')
            .map(|part| part.parse().unwrap())
            .collect();

        prop_assert_eq!(coords.len(), 4);
        prop_assert!(coords[0] <= coords[2]);
        prop_assert!(coords[1] <= coords[3]);
    }
}

#[test]
fn settings_feed_builders_through_deref() {
    let mut settings = Settings::ephemeral();
    settings.set(SettingField::InstanceId, "abc").unwrap();
    settings.set(SettingField::ServiceType, "WFS").unwrap();
    settings.set(SettingField::Crs, "EPSG:4326").unwrap();

    let layer = Layer::new("TRUE-COLOR", "True color", DataSource::new("S2L1C", 1));
    let uri = get_service_uri(&settings, &layer, &clock());

    assert!(uri.starts_with("pagingEnabled=true"));
    assert!(uri.contains("typename=DSS1"));
    assert!(uri.contains("srsname%3DEPSG%3A4326"));
}
