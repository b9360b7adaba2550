use console::style;
use sentinelhub_core::{MessageType, ShError};
use std::fmt;

/// Error with suggestions on how to fix it
pub struct CliError {
    pub kind: MessageType,
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: MessageType::Critical,
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_kind(mut self, kind: MessageType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        let label = format!("{}:", self.kind.nice_name());
        let label = match self.kind {
            MessageType::Warning => style(label).yellow().bold(),
            _ => style(label).red().bold(),
        };
        eprintln!("{} {}\n", label, style(&self.message).bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Error for a setting name that does not exist
pub fn unknown_setting(name: &str) -> CliError {
    CliError::new(format!("Unknown setting: {}", name))
        .with_kind(MessageType::Warning)
        .with_suggestion("List the available settings: shub settings show")
        .with_help("Run: shub settings set --help")
}

/// Error for a layer missing from the selected configuration
pub fn layer_not_found(instance_id: &str, layer_id: &str) -> CliError {
    CliError::new(format!("Layer {} not found", layer_id))
        .with_kind(MessageType::Warning)
        .with_context(format!("Configuration {} has no layer with this ID.", instance_id))
        .with_suggestion("List the layers: shub layers --reload")
        .with_help("Run: shub layers --help")
}

/// Error for a configuration missing from the account
pub fn configuration_not_found(instance_id: &str) -> CliError {
    CliError::new(format!("Configuration {} not found", instance_id))
        .with_kind(MessageType::Warning)
        .with_suggestion("List the configurations: shub configurations --reload")
        .with_help("Run: shub configurations --help")
}

fn from_sh_error(error: &ShError) -> CliError {
    let cli_error = CliError::new(error.to_string()).with_kind(error.message_type());

    match error {
        ShError::Session { .. } => cli_error
            .with_suggestion("Check your client ID and client secret")
            .with_suggestion("Log in again: shub login --client-id <ID>")
            .with_help("Run: shub login --help"),
        ShError::Download { message } if message.starts_with("ConnectionError") => cli_error
            .with_suggestion("Check your internet connection")
            .with_suggestion("Check the proxy configuration (proxy/* in the settings file)"),
        ShError::Download { .. } => cli_error.with_suggestion("Check the selected configuration and layer"),
        ShError::InvalidInstanceId { .. } => cli_error
            .with_suggestion("Select a configuration: shub configurations --select <ID>"),
        ShError::ConfigInvalid { .. } | ShError::ConfigMissing { .. } => cli_error
            .with_suggestion("Check the configuration file and SH_* environment variables")
            .with_help("Run: shub settings config"),
        ShError::Store { .. } => cli_error.with_suggestion("Check the settings file or pass --settings <PATH>"),
        _ => cli_error,
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let error = match error.downcast::<CliError>() {
        Ok(cli_error) => return cli_error,
        Err(error) => error,
    };

    if let Some(sh_error) = error.downcast_ref::<ShError>() {
        return from_sh_error(sh_error);
    }

    let message = error.to_string();
    if message.contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(message)
    }
}
