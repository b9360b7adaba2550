//! Cloud cover command implementation

use crate::cli::CloudCoverArgs;
use crate::context::AppContext;
use crate::output::OutputWriter;
use crate::output_types::CloudCoverRow;
use anyhow::{Context, Result};
use sentinelhub_client::CloudCoverLookup;
use sentinelhub_core::models::BBox;
use sentinelhub_core::ShError;
use sentinelhub_core::time::{build_time, get_month_time_interval};

fn month_interval(month: &str) -> Option<String> {
    let (year, month) = month.trim().split_once('-')?;
    get_month_time_interval(year.parse().ok()?, month.parse().ok()?)
}

pub fn execute(args: CloudCoverArgs, context: &AppContext, output: &OutputWriter) -> Result<()> {
    let layer = context.selected_layer()?;
    let bbox = BBox::parse(&args.bbox)?;
    let crs = args.crs.unwrap_or_else(|| context.settings.crs.clone());

    let time_interval = match (args.month, args.time) {
        (Some(month), _) => month_interval(&month)
            .with_context(|| format!("Invalid month {}: expected YYYY-MM", month))?,
        (None, Some(time)) => time,
        (None, None) => build_time(&context.settings, context.clock.as_ref()),
    };

    let lookup = CloudCoverLookup::new(context.client.clone()).with_timeout(context.config.coverage_timeout());
    let Some(cloud_cover) = context.actions.run("cloud-cover", &context.settings, &[], || {
        Ok::<_, ShError>(lookup.get_cloud_cover(&context.settings, &layer, &bbox, &crs, &time_interval))
    })?
    else {
        output.info("A cloud coverage lookup is already running");
        return Ok(());
    };

    if cloud_cover.is_empty() {
        output.info("No acquisitions found (or the extent is too large to look up)");
    }

    let rows = cloud_cover
        .into_iter()
        .map(|(date, cloud_cover)| CloudCoverRow { date, cloud_cover })
        .collect();

    output.table(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_interval() {
        assert_eq!(month_interval("2023-02").as_deref(), Some("2023-02-01/2023-02-28/P1D"));
        assert_eq!(month_interval("2023-13"), None);
        assert_eq!(month_interval("March"), None);
    }
}
