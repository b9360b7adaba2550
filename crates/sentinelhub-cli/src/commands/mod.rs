//! Command implementations

mod cloud_cover;
mod configurations;
mod crs;
mod download;
mod layers;
mod login;
mod name;
mod settings;
mod url;
mod whoami;

use crate::cli::{Cli, Commands};
use crate::context::AppContext;
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let mut context = AppContext::load(&cli)?;

    match cli.command {
        Commands::Login(args) => login::execute(args, &mut context, &output),
        Commands::Whoami => whoami::execute(&context, &output),
        Commands::Configurations(args) => configurations::execute(args, &mut context, &output),
        Commands::Layers(args) => layers::execute(args, &mut context, &output),
        Commands::Crs(args) => crs::execute(args, &mut context, &output),
        Commands::Settings(args) => settings::execute(args, &mut context, &output),
        Commands::Url(args) => url::execute(args, &context, &output),
        Commands::Name(args) => name::execute(args, &context, &output),
        Commands::CloudCover(args) => cloud_cover::execute(args, &context, &output),
        Commands::Download(args) => download::execute(args, &context, &output),
    }
}
