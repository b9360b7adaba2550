//! Login command implementation

use crate::cli::LoginArgs;
use crate::context::AppContext;
use crate::output::OutputWriter;
use anyhow::Result;
use sentinelhub_client::get_username;

pub fn execute(args: LoginArgs, context: &mut AppContext, output: &OutputWriter) -> Result<()> {
    // Try the credentials on a copy so that a failed login leaves the settings untouched
    let mut candidate = context.settings.clone();
    candidate.update(|state| {
        state.client_id = args.client_id.trim().to_string();
        state.client_secret = args.client_secret.trim().to_string();
    })?;

    let Some(configurations) =
        context.actions.run("login", &candidate, &[], || context.manager.get_configurations(&candidate, true))?
    else {
        output.info("Login is already in progress");
        return Ok(());
    };

    if !args.no_save {
        candidate.save_credentials()?;
    }

    let user = match get_username(&candidate, context.client.as_ref(), context.config.user_info_timeout()) {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!("Cannot read user info: {}", e);
            None
        }
    };

    context.settings = candidate;

    let greeting = match user {
        Some(name) => format!("Logged in as {}", name),
        None => "Logged in".to_string(),
    };
    output.success(format!("{} ({} configurations)", greeting, configurations.len()));
    if args.no_save {
        output.info("Credentials were not saved");
    }

    Ok(())
}
