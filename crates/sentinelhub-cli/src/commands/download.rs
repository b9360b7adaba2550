//! Download command implementation

use crate::cli::DownloadArgs;
use crate::context::AppContext;
use crate::output::OutputWriter;
use anyhow::{bail, Result};
use sentinelhub_client::download_wcs_image;
use sentinelhub_core::constants::ExtentType;
use sentinelhub_core::extent::get_custom_bbox;
use sentinelhub_core::models::BBox;
use sentinelhub_core::validation::{
    require_custom_bbox, require_download_folder, require_instance, require_layer,
    require_resolution, require_valid_maxcc, Validator,
};

pub fn execute(args: DownloadArgs, context: &AppContext, output: &OutputWriter) -> Result<()> {
    let settings = &context.settings;
    let validators: [Validator; 5] = [
        require_instance,
        require_layer,
        require_resolution,
        require_valid_maxcc,
        require_download_folder,
    ];

    let saved = context.actions.run("download", settings, &validators, || -> Result<String> {
        let bbox = match (settings.download_extent_type, args.bbox.as_deref()) {
            (ExtentType::Custom, _) => {
                require_custom_bbox(settings)?;
                get_custom_bbox(settings)?
            }
            (ExtentType::Current, Some(bbox)) => BBox::parse(bbox)?,
            (ExtentType::Current, None) => bail!(
                "Downloading the current extent needs a bounding box in {}: pass --bbox x1,y1,x2,y2",
                settings.crs
            ),
        };

        let layer = context.selected_layer()?;
        let timeout = context.config.request_timeout();
        Ok(download_wcs_image(settings, &layer, &bbox, context.client.as_ref(), context.clock.as_ref(), timeout)?)
    })?;

    match saved {
        Some(filename) => output.success(format!("Saved {}", filename)),
        None => output.info("A download is already running"),
    }
    Ok(())
}
