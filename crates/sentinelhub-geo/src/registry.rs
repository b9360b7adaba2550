//! Registry of recognized coordinate reference systems

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use sentinelhub_core::constants::CrsType;
use sentinelhub_core::models::crs::epsg_code;
use sentinelhub_core::ports::CrsRegistry;

use crate::transform::projection;

/// Names of commonly offered CRS
const KNOWN_CRS_NAMES: [(u32, &str); 8] = [
    (3857, "WGS 84 / Pseudo-Mercator"),
    (4326, "WGS 84"),
    (3035, "ETRS89-extended / LAEA Europe"),
    (3395, "WGS 84 / World Mercator"),
    (2154, "RGF93 v1 / Lambert-93"),
    (2193, "NZGD2000 / New Zealand Transverse Mercator 2000"),
    (3031, "WGS 84 / Antarctic Polar Stereographic"),
    (4258, "ETRS89"),
];

/// Registry recognizing the `EPSG:<code>` ids PROJ can reproject to WGS84.
///
/// Lookups hit the PROJ database once per id.
#[derive(Debug, Default)]
pub struct EpsgRegistry {
    known: Mutex<HashMap<String, bool>>,
}

impl EpsgRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CrsRegistry for EpsgRegistry {
    fn is_supported(&self, crs_id: &str) -> bool {
        if let Some(supported) = self.known.lock().unwrap_or_else(PoisonError::into_inner).get(crs_id) {
            return *supported;
        }

        let supported = is_supported_crs(crs_id);
        self.known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(crs_id.to_string(), supported);
        supported
    }

    fn describe(&self, crs_id: &str) -> Option<String> {
        if !self.is_supported(crs_id) {
            return None;
        }
        let code = epsg_code(crs_id)?;

        if let Some((_, name)) = KNOWN_CRS_NAMES.iter().find(|(known, _)| *known == code) {
            return Some(name.to_string());
        }

        match code {
            32601..=32660 => Some(format!("WGS 84 / UTM zone {}N", code - 32600)),
            32701..=32760 => Some(format!("WGS 84 / UTM zone {}S", code - 32700)),
            _ => None,
        }
    }
}

/// Whether `crs_id` is an EPSG id that PROJ can reproject to WGS84
pub fn is_supported_crs(crs_id: &str) -> bool {
    if epsg_code(crs_id).is_none() {
        return false;
    }

    match projection(crs_id, CrsType::WGS84) {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(crs = crs_id, "Unrecognized CRS: {}", e);
            false
        }
    }
}
