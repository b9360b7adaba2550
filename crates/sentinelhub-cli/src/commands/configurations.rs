//! Configurations command implementation

use crate::cli::ConfigurationsArgs;
use crate::context::AppContext;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::ConfigurationRow;
use anyhow::Result;

pub fn execute(args: ConfigurationsArgs, context: &mut AppContext, output: &OutputWriter) -> Result<()> {
    let configurations = context.manager.get_configurations(&context.settings, args.reload)?;

    if let Some(instance_id) = args.select {
        if context.manager.get_configuration_index(&instance_id).is_none() {
            return Err(errors::configuration_not_found(&instance_id).into());
        }

        if instance_id != context.settings.instance_id {
            context.settings.update(|state| {
                state.instance_id = instance_id.clone();
                state.layer_id.clear();
                state.data_source.clear();
            })?;
        }
        output.success(format!("Selected configuration {}", instance_id));
        return Ok(());
    }

    let selected = context.manager.get_configuration_index(&context.settings.instance_id);
    let rows = configurations
        .into_iter()
        .enumerate()
        .map(|(index, configuration)| {
            ConfigurationRow::new(configuration.id, configuration.name, Some(index) == selected)
        })
        .collect();

    output.table(rows)
}
