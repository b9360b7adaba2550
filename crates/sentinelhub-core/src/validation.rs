//! Preconditions checked before network-bound actions

use std::path::Path;

use crate::constants::BaseUrl;
use crate::error::{Result, ShError};
use crate::settings::SettingsState;

/// Precondition on the settings, checked before an action runs
pub type Validator = fn(&SettingsState) -> Result<()>;

/// True for an empty string or a finite number
pub fn is_float_or_undefined(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    value.trim().parse::<f64>().map(f64::is_finite).unwrap_or(false)
}

/// Base URL without trailing slashes, or the main deployment if empty
pub fn validate_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        BaseUrl::MAIN.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn require_instance(settings: &SettingsState) -> Result<()> {
    if settings.instance_id.is_empty() {
        return Err(ShError::validation("Please set Sentinel Hub Instance ID first."));
    }
    Ok(())
}

pub fn require_layer(settings: &SettingsState) -> Result<()> {
    if settings.layer_id.is_empty() {
        return Err(ShError::validation("Please select a layer first."));
    }
    Ok(())
}

pub fn require_download_folder(settings: &SettingsState) -> Result<()> {
    if settings.download_folder.is_empty() {
        return Err(ShError::validation("Please select a download folder first."));
    }
    if !Path::new(&settings.download_folder).is_dir() {
        return Err(ShError::validation(format!(
            "Folder {} does not exist. Please set a valid folder",
            settings.download_folder
        )));
    }
    Ok(())
}

fn is_positive(value: &str) -> bool {
    value.trim().trim_end_matches('m').parse::<f64>().map(|v| v.is_finite() && v > 0.0).unwrap_or(false)
}

/// Both resolutions must be positive numbers of meters
pub fn require_resolution(settings: &SettingsState) -> Result<()> {
    if !is_positive(&settings.resx) || !is_positive(&settings.resy) {
        return Err(ShError::validation(
            "Please set a positive numerical value for the image resolution.",
        ));
    }
    Ok(())
}

pub fn require_custom_bbox(settings: &SettingsState) -> Result<()> {
    let bounds = [&settings.lat_min, &settings.lat_max, &settings.lng_min, &settings.lng_max];
    if bounds.iter().any(|bound| bound.is_empty() || !is_float_or_undefined(bound)) {
        return Err(ShError::validation(
            "Please set all four numerical bounds of the custom extent.",
        ));
    }
    Ok(())
}

pub fn require_valid_maxcc(settings: &SettingsState) -> Result<()> {
    if settings.maxcc > 100 {
        return Err(ShError::validation("Cloud coverage must be between 0 and 100."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_float_or_undefined() {
        let cases = [
            ("", true),
            ("3", true),
            ("-2.5", true),
            ("1e3", true),
            ("inf", false),
            ("nan", false),
            ("abc", false),
            ("1,5", false),
        ];
        for (value, expected) in cases {
            assert_eq!(is_float_or_undefined(value), expected, "value {:?}", value);
        }
    }

    #[test]
    fn test_validate_base_url() {
        assert_eq!(validate_base_url("https://example.com//"), "https://example.com");
        assert_eq!(validate_base_url(""), BaseUrl::MAIN);
        assert_eq!(validate_base_url("/"), BaseUrl::MAIN);
        assert_eq!(validate_base_url(BaseUrl::USWEST), BaseUrl::USWEST);
    }

    #[test]
    fn test_require_selection() {
        let mut settings = SettingsState::default();
        assert!(matches!(require_instance(&settings), Err(ShError::Validation { .. })));
        assert!(require_layer(&settings).is_err());

        settings.instance_id = "abc".to_string();
        settings.layer_id = "TRUE-COLOR".to_string();
        assert!(require_instance(&settings).is_ok());
        assert!(require_layer(&settings).is_ok());
    }

    #[test]
    fn test_require_download_folder() {
        let dir = TempDir::new().unwrap();
        let mut settings = SettingsState::default();
        assert!(require_download_folder(&settings).is_err());

        settings.download_folder = dir.path().join("missing").display().to_string();
        let err = require_download_folder(&settings).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        settings.download_folder = dir.path().display().to_string();
        assert!(require_download_folder(&settings).is_ok());
    }

    #[test]
    fn test_require_resolution() {
        let mut settings = SettingsState::default();
        assert!(require_resolution(&settings).is_ok());

        settings.resx = "0".to_string();
        assert!(require_resolution(&settings).is_err());

        settings.resx = "15m".to_string();
        settings.resy = "abc".to_string();
        assert!(require_resolution(&settings).is_err());
    }

    #[test]
    fn test_require_custom_bbox() {
        let mut settings = SettingsState {
            lat_min: "41.8".to_string(),
            lat_max: "41.9".to_string(),
            lng_min: "12.4".to_string(),
            lng_max: String::new(),
            ..SettingsState::default()
        };
        assert!(require_custom_bbox(&settings).is_err());

        settings.lng_max = "12.5".to_string();
        assert!(require_custom_bbox(&settings).is_ok());
    }
}
