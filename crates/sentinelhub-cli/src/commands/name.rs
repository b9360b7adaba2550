//! Name command implementation

use crate::cli::NameArgs;
use crate::context::AppContext;
use crate::output::OutputWriter;
use anyhow::Result;
use sentinelhub_core::naming::{get_filename, get_qgis_layer_name};

use super::url::bbox_param;

pub fn execute(args: NameArgs, context: &AppContext, output: &OutputWriter) -> Result<()> {
    let layer = context.selected_layer()?;
    let layer_name = get_qgis_layer_name(&context.settings, &layer);

    let filename = match args.bbox.as_deref() {
        Some(bbox) => Some(get_filename(&context.settings, &layer, &bbox_param(bbox)?)),
        None => None,
    };

    if output.is_json() {
        return output.result(serde_json::json!({
            "layer_name": layer_name,
            "filename": filename,
        }));
    }

    output.kv("Layer name", layer_name);
    if let Some(filename) = filename {
        output.kv("Filename", filename);
    }
    Ok(())
}
