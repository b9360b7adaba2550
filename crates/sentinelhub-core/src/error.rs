//! Error types for Sentinel Hub

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShError {
    // Authentication errors
    #[error("Authentication with Sentinel Hub failed: {reason}. Check your client ID and client secret")]
    Session { reason: String },

    // Transport errors
    #[error("{message}")]
    Download { message: String },

    // Precondition errors
    #[error("{message}")]
    Validation { message: String },

    #[error("Failed to transform bounding box to {target_crs}: {reason}")]
    BBoxTransform { target_crs: String, reason: String },

    #[error("Invalid instance ID: {instance_id}")]
    InvalidInstanceId { instance_id: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // Settings store errors
    #[error("Settings store error: {reason}")]
    Store { reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ShError {
    pub fn download(message: impl Into<String>) -> Self {
        Self::Download { message: message.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    /// How the error should be surfaced to the user
    pub fn message_type(&self) -> MessageType {
        match self {
            ShError::Validation { .. } | ShError::InvalidInstanceId { .. } => MessageType::Warning,
            _ => MessageType::Critical,
        }
    }
}

impl From<serde_json::Error> for ShError {
    fn from(err: serde_json::Error) -> Self {
        ShError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ShError>;

/// Kind of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Info,
    Warning,
    Critical,
    Success,
}

/// Label and host-notification severity for each message type.
///
/// Severities follow the usual message bar levels (0 info, 1 warning, 2 critical, 3 success).
const MESSAGE_TYPES: [(MessageType, &str, u8); 4] = [
    (MessageType::Info, "Info", 0),
    (MessageType::Warning, "Warning", 1),
    (MessageType::Critical, "Error", 2),
    (MessageType::Success, "Success", 3),
];

impl MessageType {
    fn entry(&self) -> &'static (MessageType, &'static str, u8) {
        MESSAGE_TYPES
            .iter()
            .find(|(kind, _, _)| kind == self)
            .unwrap_or(&MESSAGE_TYPES[2])
    }

    /// Human readable label
    pub fn nice_name(&self) -> &'static str {
        self.entry().1
    }

    /// Numeric severity passed to the host notification API
    pub fn level(&self) -> u8 {
        self.entry().2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_table() {
        assert_eq!(MessageType::Info.nice_name(), "Info");
        assert_eq!(MessageType::Critical.nice_name(), "Error");
        assert_eq!(MessageType::Success.level(), 3);
        assert_eq!(MessageType::Warning.level(), 1);
    }

    #[test]
    fn test_error_message_types() {
        assert_eq!(ShError::validation("No layer selected").message_type(), MessageType::Warning);
        assert_eq!(ShError::download("boom").message_type(), MessageType::Critical);
        assert_eq!(
            ShError::Session { reason: "invalid_client".to_string() }.message_type(),
            MessageType::Critical
        );
    }

    #[test]
    fn test_download_error_displays_message_verbatim() {
        let err = ShError::download("ConnectionError: Cannot access service");
        assert_eq!(err.to_string(), "ConnectionError: Cannot access service");
    }
}
