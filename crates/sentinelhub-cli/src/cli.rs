use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// shub - Sentinel Hub OGC services from the command line
#[derive(Parser, Debug)]
#[command(name = "shub")]
#[command(about = "Browse Sentinel Hub configurations and build OGC requests", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Settings file holding the persisted plugin settings
    #[arg(long, global = true, value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Sentinel Hub deployment to use
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in with OAuth client credentials
    Login(LoginArgs),

    /// Show the name of the logged in user
    Whoami,

    /// List or select configurations
    Configurations(ConfigurationsArgs),

    /// List or select layers of the selected configuration
    Layers(LayersArgs),

    /// List or select CRS offered by the selected configuration
    Crs(CrsArgs),

    /// Show or change settings
    Settings(SettingsArgs),

    /// Build the request URL of the selected layer
    Url(UrlArgs),

    /// Show the layer name and download filename of the selected layer
    Name(NameArgs),

    /// Show cloud coverage of available dates
    CloudCover(CloudCoverArgs),

    /// Download an image of the selected layer through WCS
    Download(DownloadArgs),
}

#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// OAuth client ID
    #[arg(long)]
    pub client_id: String,

    /// OAuth client secret
    #[arg(long, env = "SH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    /// Check the credentials without saving them
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigurationsArgs {
    /// Reload the list from the service
    #[arg(long)]
    pub reload: bool,

    /// Select a configuration by ID
    #[arg(long, value_name = "ID")]
    pub select: Option<String>,
}

#[derive(Parser, Debug)]
pub struct LayersArgs {
    /// Configuration ID (defaults to the selected one)
    #[arg(long)]
    pub instance: Option<String>,

    /// Reload the list from the service
    #[arg(long)]
    pub reload: bool,

    /// Select a layer by ID
    #[arg(long, value_name = "ID")]
    pub select: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CrsArgs {
    /// Select a CRS by ID (e.g. EPSG:4326)
    #[arg(long, value_name = "CRS")]
    pub select: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Show all settings
    Show,

    /// Set a setting by name
    Set(SetArgs),

    /// Show the effective configuration and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Setting name (e.g. crs, maxcc, start_time)
    pub field: String,

    /// New value
    pub value: String,
}

/// OGC service to build a request for
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ServiceArg {
    Wms,
    Wmts,
    Wfs,
    Wcs,
}

#[derive(Parser, Debug)]
pub struct UrlArgs {
    /// Service type (defaults to the selected one)
    #[arg(value_enum)]
    pub service: Option<ServiceArg>,

    /// Bounding box `x1,y1,x2,y2`, required for WCS and WFS feature requests
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<String>,

    /// CRS of the WCS request (defaults to the selected one)
    #[arg(long)]
    pub crs: Option<String>,

    /// Time range of a WFS feature request
    #[arg(long)]
    pub time: Option<String>,
}

#[derive(Parser, Debug)]
pub struct NameArgs {
    /// Bounding box, used for the download filename
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CloudCoverArgs {
    /// Bounding box `x1,y1,x2,y2`
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: String,

    /// CRS of the bounding box (defaults to the selected one)
    #[arg(long)]
    pub crs: Option<String>,

    /// Month to look up, e.g. 2023-03
    #[arg(long, value_name = "YYYY-MM", conflicts_with = "time")]
    pub month: Option<String>,

    /// Time range, e.g. 2023-03-01/2023-03-31/P1D (defaults to the selected dates)
    #[arg(long)]
    pub time: Option<String>,
}

#[derive(Parser, Debug)]
pub struct DownloadArgs {
    /// Bounding box in the selected CRS, required unless the extent type is custom
    #[arg(long, allow_hyphen_values = true)]
    pub bbox: Option<String>,
}
