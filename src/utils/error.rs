use std::fmt;
use thiserror::Error;

/// Handshake step that rejected the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    PosemeshAccount,
    DomainDds,
    DomainAccess,
}

impl AuthStage {
    pub fn failure_message(&self) -> &'static str {
        match self {
            AuthStage::PosemeshAccount => "Failed to authenticate posemesh account",
            AuthStage::DomainDds => "Failed to authenticate domain dds",
            AuthStage::DomainAccess => "Failed to authenticate domain access",
        }
    }
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthStage::PosemeshAccount => "posemesh_account",
            AuthStage::DomainDds => "domain_dds",
            AuthStage::DomainAccess => "domain_access",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum MapError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Image codec error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{}", .stage.failure_message())]
    AuthenticationFailed { stage: AuthStage },

    #[error("Session is not authenticated; call authenticate() before fetching the map")]
    NotAuthenticated,

    #[error("Map request failed with status {status}")]
    MapFetchFailed { status: u16 },

    #[error("Metadata error: {message}")]
    MetadataError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::ApiError(_) | MapError::MapFetchFailed { .. } => ErrorCategory::Network,
            MapError::AuthenticationFailed { .. } | MapError::NotAuthenticated => {
                ErrorCategory::Authentication
            }
            MapError::ConfigValidationError { .. } | MapError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            MapError::SerializationError(_)
            | MapError::YamlError(_)
            | MapError::ImageError(_)
            | MapError::MetadataError { .. } => ErrorCategory::Data,
            MapError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Authentication
            | ErrorCategory::Configuration
            | ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MapError::AuthenticationFailed {
                stage: AuthStage::PosemeshAccount,
            } => "Check posemesh_account and posemesh_password in the domain configuration",
            MapError::AuthenticationFailed { .. } => {
                "Check that the account has access to the configured domain_id"
            }
            MapError::NotAuthenticated => "Authenticate the domain session before fetching",
            MapError::ApiError(_) => "Check network connectivity and the service URLs",
            MapError::MapFetchFailed { .. } => {
                "Check map_endpoint and that the domain server is reachable"
            }
            MapError::ConfigValidationError { .. } | MapError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line arguments"
            }
            MapError::IoError(_) => "Check that the output directory exists and is writable",
            MapError::SerializationError(_)
            | MapError::YamlError(_)
            | MapError::ImageError(_)
            | MapError::MetadataError { .. } => {
                "The service returned data in an unexpected format"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Authentication => format!("Authentication failed: {}", self),
            ErrorCategory::Network => format!("Could not retrieve the map: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Data => format!("Unexpected map data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;
