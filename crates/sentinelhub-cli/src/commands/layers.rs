//! Layers command implementation

use crate::cli::LayersArgs;
use crate::context::AppContext;
use crate::errors;
use crate::output::OutputWriter;
use crate::output_types::LayerRow;
use anyhow::Result;
use sentinelhub_core::validation::require_instance;

pub fn execute(args: LayersArgs, context: &mut AppContext, output: &OutputWriter) -> Result<()> {
    let instance_id = match args.instance {
        Some(instance_id) => instance_id,
        None => {
            require_instance(&context.settings)?;
            context.settings.instance_id.clone()
        }
    };

    let layers = context.manager.get_layers(&context.settings, &instance_id, args.reload)?;

    if let Some(layer_id) = args.select {
        let Some(layer) = layers.iter().find(|layer| layer.id == layer_id) else {
            return Err(errors::layer_not_found(&instance_id, &layer_id).into());
        };

        let source_type = layer.data_source.source_type.clone();
        context.settings.update(|state| {
            state.instance_id = instance_id.clone();
            state.layer_id = layer_id.clone();
            state.data_source = source_type;
        })?;
        output.success(format!("Selected layer {} of configuration {}", layer_id, instance_id));
        return Ok(());
    }

    let selected = context.manager.get_layer_index(&instance_id, &context.settings.layer_id);
    let rows = layers
        .into_iter()
        .enumerate()
        .map(|(index, layer)| {
            LayerRow::new(
                layer.id,
                layer.name,
                layer.data_source.display_name(),
                layer.data_source.source_type,
                instance_id == context.settings.instance_id && Some(index) == selected,
            )
        })
        .collect();

    output.table(rows)
}
