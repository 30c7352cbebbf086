use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration key [{section}] {key} in {file}")]
    MissingConfig {
        file: String,
        section: String,
        key: String,
    },

    #[error("Invalid value for {field} ({value:?}): {reason}")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration parse error in {file}: {message}")]
    ConfigParse { file: String, message: String },

    #[error("Status query failed: {message}")]
    StatusQuery { message: String },

    #[error("Unable to connect to messaging sink: {message}")]
    SinkConnect { message: String },

    #[error("Message delivery failed: {message}")]
    SinkDelivery { message: String },

    #[error("GitHub request failed ({operation}): {message}")]
    Github { operation: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Logging setup failed: {message}")]
    Logging { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    StatusProvider,
    MessagingSink,
    SourceControl,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::MissingConfig { .. }
            | AppError::InvalidConfigValue { .. }
            | AppError::ConfigParse { .. } => ErrorCategory::Configuration,
            AppError::StatusQuery { .. } => ErrorCategory::StatusProvider,
            AppError::SinkConnect { .. } | AppError::SinkDelivery { .. } => {
                ErrorCategory::MessagingSink
            }
            AppError::Github { .. } => ErrorCategory::SourceControl,
            AppError::Http(_) => ErrorCategory::Network,
            AppError::Io(_) | AppError::Serialization(_) | AppError::Logging { .. } => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::StatusProvider
            | ErrorCategory::MessagingSink
            | ErrorCategory::SourceControl
            | ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            AppError::MissingConfig { file, section, key } => {
                format!("Add `{key} = ...` under [{section}] in {file}")
            }
            AppError::InvalidConfigValue { field, .. } => {
                format!("Check the value given for {field}")
            }
            AppError::ConfigParse { file, .. } => {
                format!("Make sure {file} is a valid INI file")
            }
            AppError::StatusQuery { .. } => {
                "Verify the Steam API key and SteamID, then try again later".to_string()
            }
            AppError::SinkConnect { .. } => {
                "Check the Hangouts client_id/client_secret or delete the cached token to log in again"
                    .to_string()
            }
            AppError::SinkDelivery { .. } => {
                "The message may have been partially delivered; check the log file".to_string()
            }
            AppError::Github { .. } => {
                "Check the oauth_token scopes and the GitHub rate limit".to_string()
            }
            AppError::Http(_) => "Check network connectivity".to_string(),
            AppError::Io(_) => "Check permissions on the config and cache directories".to_string(),
            AppError::Serialization(_) => "The remote service returned unexpected data".to_string(),
            AppError::Logging { .. } => "Check that the logs directory is writable".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::StatusProvider => format!("Could not read player status: {}", self),
            ErrorCategory::MessagingSink => format!("Could not send the notification: {}", self),
            ErrorCategory::SourceControl => format!("GitHub sync failed: {}", self),
            ErrorCategory::Network => format!("Network error: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
