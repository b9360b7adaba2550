//! Sentinel Hub Geo - CRS registry and bounding box reprojection
//!
//! Reprojection and CRS lookups go through the PROJ library and its EPSG database.

pub mod registry;
pub mod size;
pub mod transform;

pub use registry::{is_supported_crs, EpsgRegistry};
pub use size::{is_bbox_too_large, lng_to_utm_zone};
pub use transform::transform_bbox;
