//! Settings state of the plugin with selective persistence
//!
//! All user-selected and derived request parameters live in [`SettingsState`]. A
//! [`Settings`] wraps that state together with a handle to the key-value store.
//! Every mutation goes through [`Settings::update`], which writes the changed
//! auto-saved fields to the store. Credentials are written only by
//! [`Settings::save_credentials`], so partially typed secrets never reach the store.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::constants::{
    BaseUrl, CrsType, ExtentType, ImageFormat, ImagePriority, ServiceType, TimeType,
    STORE_NAMESPACE,
};
use crate::error::{Result, ShError};
use crate::ports::{SessionSettings, SettingsStore};
use crate::store::MemoryStore;
use crate::time::parse_date;

/// Every field of the settings state that can be read or written by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingField {
    BaseUrl,
    ClientId,
    ClientSecret,
    InstanceId,
    ServiceType,
    LayerId,
    DataSource,
    Crs,
    Maxcc,
    Priority,
    ActiveTime,
    StartTime,
    EndTime,
    IsExactDate,
    ImageFormat,
    ShowLogo,
    DownloadExtentType,
    Resx,
    Resy,
    LatMin,
    LatMax,
    LngMin,
    LngMax,
    DownloadFolder,
}

impl SettingField {
    pub const ALL: [SettingField; 24] = [
        SettingField::BaseUrl,
        SettingField::ClientId,
        SettingField::ClientSecret,
        SettingField::InstanceId,
        SettingField::ServiceType,
        SettingField::LayerId,
        SettingField::DataSource,
        SettingField::Crs,
        SettingField::Maxcc,
        SettingField::Priority,
        SettingField::ActiveTime,
        SettingField::StartTime,
        SettingField::EndTime,
        SettingField::IsExactDate,
        SettingField::ImageFormat,
        SettingField::ShowLogo,
        SettingField::DownloadExtentType,
        SettingField::Resx,
        SettingField::Resy,
        SettingField::LatMin,
        SettingField::LatMax,
        SettingField::LngMin,
        SettingField::LngMax,
        SettingField::DownloadFolder,
    ];

    /// Fields written to the store on every change
    pub const AUTO_SAVE: [SettingField; 15] = [
        SettingField::InstanceId,
        SettingField::ServiceType,
        SettingField::LayerId,
        SettingField::Crs,
        SettingField::StartTime,
        SettingField::EndTime,
        SettingField::Priority,
        SettingField::ImageFormat,
        SettingField::Resx,
        SettingField::Resy,
        SettingField::LatMin,
        SettingField::LatMax,
        SettingField::LngMin,
        SettingField::LngMax,
        SettingField::DownloadFolder,
    ];

    /// Fields written only on an explicit save
    pub const CREDENTIALS: [SettingField; 3] =
        [SettingField::BaseUrl, SettingField::ClientId, SettingField::ClientSecret];

    pub fn name(&self) -> &'static str {
        match self {
            SettingField::BaseUrl => "base_url",
            SettingField::ClientId => "client_id",
            SettingField::ClientSecret => "client_secret",
            SettingField::InstanceId => "instance_id",
            SettingField::ServiceType => "service_type",
            SettingField::LayerId => "layer_id",
            SettingField::DataSource => "data_source",
            SettingField::Crs => "crs",
            SettingField::Maxcc => "maxcc",
            SettingField::Priority => "priority",
            SettingField::ActiveTime => "active_time",
            SettingField::StartTime => "start_time",
            SettingField::EndTime => "end_time",
            SettingField::IsExactDate => "is_exact_date",
            SettingField::ImageFormat => "image_format",
            SettingField::ShowLogo => "show_logo",
            SettingField::DownloadExtentType => "download_extent_type",
            SettingField::Resx => "resx",
            SettingField::Resy => "resy",
            SettingField::LatMin => "lat_min",
            SettingField::LatMax => "lat_max",
            SettingField::LngMin => "lng_min",
            SettingField::LngMax => "lng_max",
            SettingField::DownloadFolder => "download_folder",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.name() == name)
    }

    /// Location of the field in the settings store
    pub fn store_path(&self) -> String {
        format!("{}/{}", STORE_NAMESPACE, self.name())
    }

    pub fn is_auto_saved(&self) -> bool {
        Self::AUTO_SAVE.contains(self)
    }

    pub fn is_credential(&self) -> bool {
        Self::CREDENTIALS.contains(self)
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All request parameters selected in the plugin
#[derive(Clone, PartialEq)]
pub struct SettingsState {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,

    pub instance_id: String,
    pub service_type: ServiceType,
    pub layer_id: String,
    /// Type of the selected layer's data source
    pub data_source: String,
    pub crs: String,
    /// Maximum cloud coverage in percent
    pub maxcc: u8,
    pub priority: ImagePriority,

    pub active_time: TimeType,
    /// ISO date or empty
    pub start_time: String,
    /// ISO date or empty
    pub end_time: String,
    pub is_exact_date: bool,

    pub image_format: ImageFormat,
    pub show_logo: bool,

    pub download_extent_type: ExtentType,
    pub resx: String,
    pub resy: String,
    pub lat_min: String,
    pub lat_max: String,
    pub lng_min: String,
    pub lng_max: String,

    pub download_folder: String,
}

impl Default for SettingsState {
    fn default() -> Self {
        Self {
            base_url: BaseUrl::MAIN.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            instance_id: String::new(),
            service_type: ServiceType::Wms,
            layer_id: String::new(),
            data_source: String::new(),
            crs: CrsType::POP_WEB.to_string(),
            maxcc: 100,
            priority: ImagePriority::MostRecent,
            active_time: TimeType::StartTime,
            start_time: String::new(),
            end_time: String::new(),
            is_exact_date: false,
            image_format: ImageFormat::Png,
            show_logo: false,
            download_extent_type: ExtentType::Current,
            resx: "10".to_string(),
            resy: "10".to_string(),
            lat_min: String::new(),
            lat_max: String::new(),
            lng_min: String::new(),
            lng_max: String::new(),
            download_folder: String::new(),
        }
    }
}

impl fmt::Debug for SettingsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsState")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("instance_id", &self.instance_id)
            .field("service_type", &self.service_type)
            .field("layer_id", &self.layer_id)
            .field("crs", &self.crs)
            .field("start_time", &self.start_time)
            .field("end_time", &self.end_time)
            .finish_non_exhaustive()
    }
}

fn parse_bool(field: SettingField, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ShError::ConfigInvalid {
            key: field.name().to_string(),
            reason: format!("'{}' is not a boolean", value),
        }),
    }
}

fn parse_time(field: SettingField, value: &str) -> Result<String> {
    parse_date(value).ok_or_else(|| ShError::ConfigInvalid {
        key: field.name().to_string(),
        reason: format!("'{}' is not a date", value),
    })
}

fn parse_maxcc(value: &str) -> Result<u8> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|maxcc| *maxcc <= 100)
        .ok_or_else(|| ShError::ConfigInvalid {
            key: SettingField::Maxcc.name().to_string(),
            reason: format!("'{}' is not a percentage between 0 and 100", value),
        })
}

impl SettingsState {
    /// String form of a field, as persisted in the store
    pub fn value(&self, field: SettingField) -> String {
        match field {
            SettingField::BaseUrl => self.base_url.clone(),
            SettingField::ClientId => self.client_id.clone(),
            SettingField::ClientSecret => self.client_secret.clone(),
            SettingField::InstanceId => self.instance_id.clone(),
            SettingField::ServiceType => self.service_type.as_str().to_string(),
            SettingField::LayerId => self.layer_id.clone(),
            SettingField::DataSource => self.data_source.clone(),
            SettingField::Crs => self.crs.clone(),
            SettingField::Maxcc => self.maxcc.to_string(),
            SettingField::Priority => self.priority.url_param().to_string(),
            SettingField::ActiveTime => self.active_time.as_str().to_string(),
            SettingField::StartTime => self.start_time.clone(),
            SettingField::EndTime => self.end_time.clone(),
            SettingField::IsExactDate => self.is_exact_date.to_string(),
            SettingField::ImageFormat => self.image_format.url_param().to_string(),
            SettingField::ShowLogo => self.show_logo.to_string(),
            SettingField::DownloadExtentType => self.download_extent_type.as_str().to_string(),
            SettingField::Resx => self.resx.clone(),
            SettingField::Resy => self.resy.clone(),
            SettingField::LatMin => self.lat_min.clone(),
            SettingField::LatMax => self.lat_max.clone(),
            SettingField::LngMin => self.lng_min.clone(),
            SettingField::LngMax => self.lng_max.clone(),
            SettingField::DownloadFolder => self.download_folder.clone(),
        }
    }

    /// Parse `value` and assign it to `field`
    pub fn apply(&mut self, field: SettingField, value: &str) -> Result<()> {
        match field {
            SettingField::BaseUrl => self.base_url = value.to_string(),
            SettingField::ClientId => self.client_id = value.to_string(),
            SettingField::ClientSecret => self.client_secret = value.to_string(),
            SettingField::InstanceId => self.instance_id = value.to_string(),
            SettingField::ServiceType => self.service_type = value.parse()?,
            SettingField::LayerId => self.layer_id = value.to_string(),
            SettingField::DataSource => self.data_source = value.to_string(),
            SettingField::Crs => self.crs = value.to_string(),
            SettingField::Maxcc => self.maxcc = parse_maxcc(value)?,
            SettingField::Priority => self.priority = value.parse()?,
            SettingField::ActiveTime => self.active_time = value.parse()?,
            SettingField::StartTime => self.start_time = parse_time(field, value)?,
            SettingField::EndTime => self.end_time = parse_time(field, value)?,
            SettingField::IsExactDate => self.is_exact_date = parse_bool(field, value)?,
            SettingField::ImageFormat => self.image_format = value.parse()?,
            SettingField::ShowLogo => self.show_logo = parse_bool(field, value)?,
            SettingField::DownloadExtentType => self.download_extent_type = value.parse()?,
            SettingField::Resx => self.resx = value.to_string(),
            SettingField::Resy => self.resy = value.to_string(),
            SettingField::LatMin => self.lat_min = value.to_string(),
            SettingField::LatMax => self.lat_max = value.to_string(),
            SettingField::LngMin => self.lng_min = value.to_string(),
            SettingField::LngMax => self.lng_max = value.to_string(),
            SettingField::DownloadFolder => self.download_folder = value.to_string(),
        }
        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            base_url: self.base_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

/// Settings state bound to the store it persists to.
///
/// Cloning is shallow: the clone shares the store handle, which is how a new
/// login is tried out before it is committed.
#[derive(Clone)]
pub struct Settings {
    state: SettingsState,
    store: Arc<dyn SettingsStore>,
}

impl Settings {
    /// Load persisted values from `store` on top of the defaults
    pub fn load(store: Arc<dyn SettingsStore>) -> Self {
        let mut state = SettingsState::default();

        for field in SettingField::AUTO_SAVE.iter().chain(SettingField::CREDENTIALS.iter()) {
            if let Some(value) = store.get(&field.store_path()) {
                if let Err(e) = state.apply(*field, &value) {
                    tracing::warn!(field = %field, "Ignoring stored setting: {}", e);
                }
            }
        }

        Self { state, store }
    }

    /// Settings backed by a fresh in-memory store
    pub fn ephemeral() -> Self {
        Self::load(Arc::new(MemoryStore::new()))
    }

    pub fn state(&self) -> &SettingsState {
        &self.state
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Mutate the state and persist every auto-saved field that changed
    pub fn update<F>(&mut self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut SettingsState),
    {
        let before = self.state.clone();
        mutate(&mut self.state);

        for field in SettingField::AUTO_SAVE {
            let value = self.state.value(field);
            if value != before.value(field) {
                tracing::debug!(field = %field, "Auto-saving setting");
                self.store.set(&field.store_path(), &value)?;
            }
        }

        Ok(())
    }

    /// Set a field from its string form
    pub fn set(&mut self, field: SettingField, value: &str) -> Result<()> {
        let mut parsed = self.state.clone();
        parsed.apply(field, value)?;
        self.update(|state| *state = parsed)
    }

    /// Write credentials to the store
    pub fn save_credentials(&self) -> Result<()> {
        for field in SettingField::CREDENTIALS {
            self.store.set(&field.store_path(), &self.state.value(field))?;
        }
        Ok(())
    }
}

impl Deref for Settings {
    type Target = SettingsState;

    fn deref(&self) -> &SettingsState {
        &self.state
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings").field("state", &self.state).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(settings: &Settings, field: SettingField) -> Option<String> {
        settings.store().get(&field.store_path())
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::ephemeral();
        assert_eq!(settings.crs, "EPSG:3857");
        assert_eq!(settings.base_url, BaseUrl::MAIN);
        assert_eq!(settings.maxcc, 100);
        assert_eq!(settings.priority, ImagePriority::MostRecent);
        assert_eq!(settings.resx, "10");
    }

    #[test]
    fn test_auto_save() {
        let mut settings = Settings::ephemeral();
        settings.update(|s| s.crs = "new crs".to_string()).unwrap();

        assert_eq!(stored(&settings, SettingField::Crs).as_deref(), Some("new crs"));
    }

    #[test]
    fn test_no_autosave_credentials() {
        let mut settings = Settings::ephemeral();
        settings
            .update(|s| {
                s.client_secret = "abcdef123".to_string();
                s.client_id = "test_client_id".to_string();
                s.base_url = "www.base-url.com".to_string();
            })
            .unwrap();

        for field in SettingField::CREDENTIALS {
            assert_eq!(stored(&settings, field), None, "{} must not be auto-saved", field);
        }
    }

    #[test]
    fn test_save_credentials() {
        let mut settings = Settings::ephemeral();
        settings
            .update(|s| {
                s.client_secret = "abcdef123".to_string();
                s.client_id = "test_client_id".to_string();
                s.base_url = "www.base-url.com".to_string();
            })
            .unwrap();
        settings.save_credentials().unwrap();

        assert_eq!(stored(&settings, SettingField::ClientSecret).as_deref(), Some("abcdef123"));
        assert_eq!(stored(&settings, SettingField::ClientId).as_deref(), Some("test_client_id"));
        assert_eq!(stored(&settings, SettingField::BaseUrl).as_deref(), Some("www.base-url.com"));
    }

    #[test]
    fn test_non_auto_saved_fields_stay_local() {
        let mut settings = Settings::ephemeral();
        settings
            .update(|s| {
                s.maxcc = 20;
                s.show_logo = true;
            })
            .unwrap();

        assert_eq!(stored(&settings, SettingField::Maxcc), None);
        assert_eq!(stored(&settings, SettingField::ShowLogo), None);
    }

    #[test]
    fn test_load_restores_persisted_values() {
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        let mut settings = Settings::load(store.clone());
        settings
            .update(|s| {
                s.instance_id = "abc".to_string();
                s.service_type = ServiceType::Wcs;
                s.client_id = "id".to_string();
            })
            .unwrap();
        settings.save_credentials().unwrap();

        let reloaded = Settings::load(store);
        assert_eq!(reloaded.instance_id, "abc");
        assert_eq!(reloaded.service_type, ServiceType::Wcs);
        assert_eq!(reloaded.client_id, "id");
    }

    #[test]
    fn test_load_ignores_unparsable_values() {
        let store: Arc<dyn SettingsStore> = Arc::new(MemoryStore::new());
        store.set("SentinelHub/service_type", "tms").unwrap();
        store.set("SentinelHub/layer_id", "TRUE-COLOR").unwrap();

        let settings = Settings::load(store);
        assert_eq!(settings.service_type, ServiceType::Wms);
        assert_eq!(settings.layer_id, "TRUE-COLOR");
    }

    #[test]
    fn test_set_by_name() {
        let mut settings = Settings::ephemeral();
        settings.set(SettingField::Maxcc, "35").unwrap();
        settings.set(SettingField::ImageFormat, "image/tiff").unwrap();
        assert_eq!(settings.maxcc, 35);
        assert_eq!(settings.image_format, ImageFormat::Tiff);
        assert_eq!(stored(&settings, SettingField::ImageFormat).as_deref(), Some("image/tiff"));

        assert!(settings.set(SettingField::Maxcc, "101").is_err());
        assert_eq!(settings.maxcc, 35);
    }

    #[test]
    fn test_set_time_normalizes_dates() {
        let mut settings = Settings::ephemeral();
        settings.set(SettingField::StartTime, "5/3/2023").unwrap();
        settings.set(SettingField::EndTime, "2023.03.31").unwrap();
        assert_eq!(settings.start_time, "2023-05-03");
        assert_eq!(stored(&settings, SettingField::EndTime).as_deref(), Some("2023-03-31"));

        settings.set(SettingField::EndTime, "").unwrap();
        assert_eq!(settings.end_time, "");

        assert!(settings.set(SettingField::StartTime, "2023-02-30").is_err());
        assert_eq!(settings.start_time, "2023-05-03");
    }

    #[test]
    fn test_clone_shares_store() {
        let mut settings = Settings::ephemeral();
        let mut candidate = settings.clone();
        candidate.update(|s| s.layer_id = "NDVI".to_string()).unwrap();

        assert_eq!(settings.layer_id, "");
        settings.update(|s| s.crs = "EPSG:4326".to_string()).unwrap();
        assert_eq!(stored(&candidate, SettingField::LayerId).as_deref(), Some("NDVI"));
        assert_eq!(stored(&candidate, SettingField::Crs).as_deref(), Some("EPSG:4326"));
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in SettingField::ALL {
            assert_eq!(SettingField::from_name(field.name()), Some(field));
        }
        assert_eq!(SettingField::Crs.store_path(), "SentinelHub/crs");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut settings = Settings::ephemeral();
        settings.update(|s| s.client_secret = "hunter2".to_string()).unwrap();
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}
