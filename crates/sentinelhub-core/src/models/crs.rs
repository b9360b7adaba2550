//! Coordinate reference systems advertised by the service

use serde::{Deserialize, Serialize};

/// A CRS offered by a configuration, identified by its authority id (e.g. `EPSG:3857`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    pub id: String,
    pub name: String,
}

impl Crs {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }

    /// Numeric EPSG code, if the id has the form `EPSG:<code>`
    pub fn epsg_code(&self) -> Option<u32> {
        epsg_code(&self.id)
    }
}

/// Parses the numeric code out of an `EPSG:<code>` id
pub fn epsg_code(crs_id: &str) -> Option<u32> {
    let (authority, code) = crs_id.split_once(':')?;
    if !authority.trim().eq_ignore_ascii_case("EPSG") {
        return None;
    }
    code.trim().parse().ok()
}
