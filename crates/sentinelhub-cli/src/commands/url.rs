//! URL command implementation

use crate::cli::{ServiceArg, UrlArgs};
use crate::context::AppContext;
use crate::output::OutputWriter;
use anyhow::{bail, Result};
use sentinelhub_core::constants::ServiceType;
use sentinelhub_core::models::BBox;
use sentinelhub_core::ogc::{get_service_uri, get_wcs_url, get_wfs_url};
use sentinelhub_core::time::build_time;

impl From<ServiceArg> for ServiceType {
    fn from(service: ServiceArg) -> Self {
        match service {
            ServiceArg::Wms => ServiceType::Wms,
            ServiceArg::Wmts => ServiceType::Wmts,
            ServiceArg::Wfs => ServiceType::Wfs,
            ServiceArg::Wcs => ServiceType::Wcs,
        }
    }
}

/// Bbox text as the service expects it: normalized, comma separated
pub(crate) fn bbox_param(text: &str) -> Result<String> {
    let bbox = BBox::parse(text)?;
    Ok(format!("{},{},{},{}", bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y))
}

pub fn execute(args: UrlArgs, context: &AppContext, output: &OutputWriter) -> Result<()> {
    let layer = context.selected_layer()?;

    let mut state = context.settings.state().clone();
    if let Some(service) = args.service {
        state.service_type = service.into();
    }
    let clock = context.clock.as_ref();

    let url = match (state.service_type, args.bbox.as_deref()) {
        (ServiceType::Wcs, Some(bbox)) => get_wcs_url(&state, &layer, &bbox_param(bbox)?, args.crs.as_deref(), clock),
        (ServiceType::Wcs, None) => bail!("A WCS request needs a bounding box: pass --bbox x1,y1,x2,y2"),
        (ServiceType::Wfs, Some(bbox)) => {
            let time = args.time.unwrap_or_else(|| build_time(&state, clock));
            get_wfs_url(&state, &layer, &bbox_param(bbox)?, &time, Some(state.maxcc))
        }
        _ => get_service_uri(&state, &layer, clock),
    };

    output.value("url", url);
    Ok(())
}
