//! Settings command implementation

use crate::cli::{SetArgs, SettingsArgs, SettingsCommand};
use crate::context::AppContext;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::{ConfigRow, SettingRow};
use anyhow::Result;
use sentinelhub_core::settings::SettingField;

pub fn execute(args: SettingsArgs, context: &mut AppContext, output: &OutputWriter) -> Result<()> {
    match args.command {
        SettingsCommand::Show => show(context, output),
        SettingsCommand::Set(args) => set(args, context, output),
        SettingsCommand::Config => config(context, output),
    }
}

fn show(context: &AppContext, output: &OutputWriter) -> Result<()> {
    let rows = SettingField::ALL
        .into_iter()
        .map(|field| {
            let value = match field {
                SettingField::ClientSecret if !context.settings.client_secret.is_empty() => {
                    "********".to_string()
                }
                _ => context.settings.value(field),
            };
            let saved = if field.is_auto_saved() {
                "auto"
            } else if field.is_credential() {
                "on login"
            } else {
                "no"
            };
            SettingRow { name: field.name().to_string(), value, saved }
        })
        .collect();

    output.table(rows)
}

fn set(args: SetArgs, context: &mut AppContext, output: &OutputWriter) -> Result<()> {
    let field = SettingField::from_name(&args.field).ok_or_else(|| errors::unknown_setting(&args.field))?;

    context.settings.set(field, &args.value)?;
    if field.is_credential() {
        context.settings.save_credentials()?;
    }

    output.success(format!("{} = {}", field, context.settings.value(field)));
    if !field.is_auto_saved() && !field.is_credential() {
        output.info(format!("{} is not persisted and only applies to this run", field));
    }

    Ok(())
}

fn config(context: &AppContext, output: &OutputWriter) -> Result<()> {
    let mut entries: Vec<_> = context.config.to_inspection_map().into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let rows = entries
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();

    output.table(rows)
}
