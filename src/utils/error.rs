use thiserror::Error;

#[derive(Error, Debug)]
pub enum FenceError {
    #[error("Geocoding request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Geocoding error: {message}")]
    GeocodeError { message: String },

    #[error("Map unavailable: {message}")]
    MapUnavailable { message: String },

    #[error("Access denied: {message}")]
    AccessDenied { message: String },
}

pub type Result<T> = std::result::Result<T, FenceError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Input,
    Access,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FenceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FenceError::HttpError(_) | FenceError::GeocodeError { .. } => ErrorCategory::Network,
            FenceError::ConfigValidationError { .. }
            | FenceError::InvalidConfigValueError { .. }
            | FenceError::MissingConfigError { .. } => ErrorCategory::Configuration,
            FenceError::ValidationError { .. } => ErrorCategory::Input,
            FenceError::AccessDenied { .. } => ErrorCategory::Access,
            FenceError::IoError(_)
            | FenceError::SerializationError(_)
            | FenceError::MapUnavailable { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 地圖或定位失敗不影響風速與表單
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Access => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => match self {
                FenceError::MapUnavailable { .. } => ErrorSeverity::Low,
                _ => ErrorSeverity::Critical,
            },
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            FenceError::HttpError(_) | FenceError::GeocodeError { .. } => {
                "Could not reach the geocoding service.".to_string()
            }
            FenceError::ConfigValidationError { field, .. }
            | FenceError::InvalidConfigValueError { field, .. }
            | FenceError::MissingConfigError { field } => {
                format!("The configuration value '{}' is not usable.", field)
            }
            FenceError::ValidationError { message } => message.clone(),
            FenceError::AccessDenied { message } => message.clone(),
            FenceError::MapUnavailable { .. } => "Could not load map library.".to_string(),
            FenceError::IoError(e) => format!("File system error: {}", e),
            FenceError::SerializationError(e) => format!("Could not encode output: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the network connection and the geocoder base_url.",
            ErrorCategory::Configuration => "Fix the configuration file and run again.",
            ErrorCategory::Input => "Correct the highlighted fields and submit again.",
            ErrorCategory::Access => "Enter the access PIN with --pin.",
            ErrorCategory::System => "Check file permissions for the session file.",
        }
    }
}
