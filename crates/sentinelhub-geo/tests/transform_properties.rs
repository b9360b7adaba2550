use proptest::prelude::*;
use sentinelhub_core::models::BBox;
use sentinelhub_core::ports::CrsRegistry;
use sentinelhub_geo::{is_bbox_too_large, transform_bbox, EpsgRegistry};

proptest! {
    #[test]
    fn transformed_bbox_stays_normalized(
        x1 in -179.0f64..179.0,
        x2 in -179.0f64..179.0,
        y1 in -80.0f64..80.0,
        y2 in -80.0f64..80.0,
    ) {
        let bbox = BBox::new(x1, y1, x2, y2);
        let projected = transform_bbox(&bbox, "EPSG:4326", "EPSG:3857").unwrap();

        prop_assert!(projected.min_x <= projected.max_x);
        prop_assert!(projected.min_y <= projected.max_y);
    }

    #[test]
    fn small_extents_are_never_too_large(
        lng in -170.0f64..170.0,
        lat in -70.0f64..70.0,
        span in 0.0001f64..0.05,
    ) {
        let bbox = BBox::new(lng, lat, lng + span, lat + span);
        prop_assert_eq!(is_bbox_too_large(&bbox, "EPSG:4326", 100_000.0), Some(false));
    }
}

#[test]
fn registry_recognizes_offered_crs() {
    let registry = EpsgRegistry::new();
    for crs in ["EPSG:3857", "EPSG:4326", "EPSG:32633", "EPSG:3035"] {
        assert!(registry.is_supported(crs));
    }
    assert!(!registry.is_supported("urn:ogc:def:crs:OGC::CRS84"));
    assert!(!registry.is_supported("EPSG:9001"));
}
