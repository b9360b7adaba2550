//! CRS command implementation

use crate::cli::CrsArgs;
use crate::context::AppContext;
use crate::output::OutputWriter;
use crate::output_types::CrsRow;
use anyhow::Result;
use sentinelhub_core::ports::CrsRegistry;
use sentinelhub_core::validation::require_instance;
use sentinelhub_geo::EpsgRegistry;

pub fn execute(args: CrsArgs, context: &mut AppContext, output: &OutputWriter) -> Result<()> {
    require_instance(&context.settings)?;

    let crs_list = context.manager.get_available_crs(&context.settings)?;

    if let Some(crs_id) = args.select {
        // Unknown ids fall back to the first offered CRS
        let index = context.manager.get_crs_index(&context.settings, &crs_id)?;
        let Some(crs) = crs_list.get(index) else {
            output.warning("The configuration offers no CRS");
            return Ok(());
        };

        if crs.id != crs_id {
            output.warning(format!("{} is not offered, using {}", crs_id, crs.id));
        }
        let selected = crs.id.clone();
        context.settings.update(|state| state.crs = selected.clone())?;
        output.success(format!("Selected CRS {}", selected));
        return Ok(());
    }

    let registry = EpsgRegistry::new();
    let selected = context.manager.get_crs_index(&context.settings, &context.settings.crs)?;
    let rows = crs_list
        .into_iter()
        .enumerate()
        .map(|(index, crs)| {
            let description = registry.describe(&crs.id).unwrap_or_default();
            let is_selected = index == selected && crs.id == context.settings.crs;
            CrsRow::new(crs.id, crs.name, description, is_selected)
        })
        .collect();

    output.table(rows)
}
