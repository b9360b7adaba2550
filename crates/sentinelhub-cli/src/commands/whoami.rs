//! Whoami command implementation

use crate::context::AppContext;
use crate::output::OutputWriter;
use anyhow::Result;
use sentinelhub_client::get_username;

pub fn execute(context: &AppContext, output: &OutputWriter) -> Result<()> {
    let user = get_username(&context.settings, context.client.as_ref(), context.config.user_info_timeout())?;

    if output.is_json() {
        return output.result(serde_json::json!({
            "user": user,
            "base_url": context.settings.base_url,
        }));
    }

    output.kv("User", user.as_deref().unwrap_or("(unnamed)"));
    output.kv("Deployment", &context.settings.base_url);
    Ok(())
}
