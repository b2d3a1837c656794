use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntelError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Input error: {message}")]
    InputError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("AI provider rejected the API key")]
    AiAuthError,

    #[error("AI report generation requires billing-enabled API access: {message}")]
    AiBillingError { message: String },

    #[error("AI provider rate limit reached")]
    AiRateLimited,

    #[error("AI provider returned HTTP {status}: {message}")]
    AiResponseError { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Processing,
    Output,
    AiProvider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IntelError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            IntelError::ConfigError { .. }
            | IntelError::ConfigValidationError { .. }
            | IntelError::InvalidConfigValueError { .. }
            | IntelError::MissingConfigError { .. } => ErrorCategory::Configuration,
            IntelError::InputError { .. } => ErrorCategory::Input,
            IntelError::ApiError(_) => ErrorCategory::Network,
            IntelError::CsvError(_)
            | IntelError::SerializationError(_)
            | IntelError::ProcessingError { .. } => ErrorCategory::Processing,
            IntelError::ZipError(_) | IntelError::IoError(_) => ErrorCategory::Output,
            IntelError::AiAuthError
            | IntelError::AiBillingError { .. }
            | IntelError::AiRateLimited
            | IntelError::AiResponseError { .. } => ErrorCategory::AiProvider,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            IntelError::AiRateLimited | IntelError::ApiError(_) => ErrorSeverity::Medium,
            IntelError::AiAuthError
            | IntelError::AiBillingError { .. }
            | IntelError::AiResponseError { .. } => ErrorSeverity::Medium,
            IntelError::IoError(_) | IntelError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            IntelError::ConfigError { .. }
            | IntelError::ConfigValidationError { .. }
            | IntelError::InvalidConfigValueError { .. } => {
                "Check the command line flags and the TOML configuration file"
            }
            IntelError::MissingConfigError { .. } => {
                "Provide the missing setting on the command line or in the configuration file"
            }
            IntelError::InputError { .. } => {
                "Pass a readable email file with --input, pipe text on stdin, or use --sample"
            }
            IntelError::ApiError(_) => "Check network connectivity and the --api-base URL",
            IntelError::AiAuthError => "Set a valid OPENAI_API_KEY or pass --api-key",
            IntelError::AiBillingError { .. } => {
                "Enable billing on the OpenAI account or run without --ai-report"
            }
            IntelError::AiRateLimited => "Wait a minute and run again",
            IntelError::AiResponseError { .. } => "Retry later or choose another --model",
            IntelError::IoError(_) | IntelError::ZipError(_) => {
                "Check that the output directory exists and is writable"
            }
            IntelError::CsvError(_)
            | IntelError::SerializationError(_)
            | IntelError::ProcessingError { .. } => {
                "Inspect the input email for unusual formatting and run with --verbose"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read the email content: {}", self),
            ErrorCategory::Network => format!("Could not reach the AI provider: {}", self),
            ErrorCategory::Processing => format!("Could not process the deals: {}", self),
            ErrorCategory::Output => format!("Could not write the results: {}", self),
            ErrorCategory::AiProvider => format!("AI report unavailable: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, IntelError>;
