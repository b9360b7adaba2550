/// Port to the host's CRS registry
pub trait CrsRegistry: Send + Sync {
    /// Whether the registry recognizes the CRS id (e.g. `EPSG:3035`)
    fn is_supported(&self, crs_id: &str) -> bool;

    /// Human readable description of the CRS, if known
    fn describe(&self, crs_id: &str) -> Option<String>;
}
