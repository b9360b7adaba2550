//! Configuration, settings and service handles shared by the commands

use anyhow::{Context, Result};
use sentinelhub_client::{Client, ConfigurationManager};
use sentinelhub_core::clock::SystemClock;
use sentinelhub_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};
use sentinelhub_core::constants::ACTION_COOLDOWN;
use sentinelhub_core::cooldown::Cooldown;
use sentinelhub_core::models::Layer;
use sentinelhub_core::ports::{Clock, SettingsStore};
use sentinelhub_core::store::FileStore;
use sentinelhub_core::validation::{require_instance, require_layer, validate_base_url};
use sentinelhub_core::Settings;
use sentinelhub_geo::EpsgRegistry;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::Cli;
use crate::errors;

/// Config file read when `--config` is not given
const DEFAULT_CONFIG_FILE: &str = ".config/sentinelhub/config.toml";

/// Load layered configuration: defaults, config file, environment, then flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    match &cli.config {
        Some(path) => {
            config = config
                .load_from_file(path)
                .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
        }
        None => {
            if let Some(path) = std::env::var_os("HOME").map(|home| PathBuf::from(home).join(DEFAULT_CONFIG_FILE)) {
                if path.exists() {
                    config = config.load_from_file(&path).context("Failed to load configuration file")?;
                }
            }
        }
    }

    let mut config = config.load_from_env();
    config.update_from_cli(CliConfigOverrides {
        base_url: cli.base_url.clone(),
        request_timeout: cli.timeout,
        settings_path: cli.settings.clone(),
    });

    Ok(config)
}

pub struct AppContext {
    pub config: LayeredConfig,
    pub settings: Settings,
    pub client: Arc<Client>,
    pub manager: ConfigurationManager,
    pub clock: Arc<dyn Clock>,
    /// Gate for network-bound actions
    pub actions: Cooldown,
}

impl AppContext {
    pub fn load(cli: &Cli) -> Result<Self> {
        let config = load_config(cli)?;

        let store: Arc<dyn SettingsStore> = Arc::new(FileStore::open(&config.settings_path.value)?);
        let mut settings = Settings::load(store.clone());

        // A deployment chosen through config, environment or flags applies to this run only
        if config.base_url.source != ConfigSource::Default {
            let base_url = validate_base_url(&config.base_url.value);
            settings.update(|state| state.base_url = base_url)?;
        }

        let client = Arc::new(Client::new(store)?);
        let manager = ConfigurationManager::new(client.clone(), Arc::new(EpsgRegistry::new()))
            .with_timeout(config.request_timeout());

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let actions = Cooldown::new(ACTION_COOLDOWN, clock.clone());

        Ok(Self { config, settings, client, manager, clock, actions })
    }

    /// Selected layer with its service URL resolved
    pub fn selected_layer(&self) -> Result<Layer> {
        require_instance(&self.settings)?;
        require_layer(&self.settings)?;

        let instance_id = &self.settings.instance_id;
        let layer_id = &self.settings.layer_id;
        self.manager
            .get_layer(&self.settings, instance_id, layer_id, true)?
            .ok_or_else(|| errors::layer_not_found(instance_id, layer_id).into())
    }
}
