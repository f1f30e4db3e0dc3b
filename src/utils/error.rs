use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP source {url} returned status {status}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },

    #[error("Import failed at line {line}: {message}")]
    ImportError { line: usize, message: String },

    #[error("All {skipped} passengers in this upload are already in the system")]
    AllDuplicatesError { skipped: usize },

    #[error("Invalid passenger: {message}")]
    InvalidPassengerError { message: String },

    #[error("Unknown passenger id '{id}'")]
    UnknownPassengerError { id: String },

    #[error("Invalid contact query: {message}")]
    InvalidContactQueryError { message: String },

    #[error("No passengers in database")]
    EmptyDatasetError,

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    FileSystem,
    Configuration,
    Data,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl StatsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StatsError::HttpError(_) | StatsError::HttpStatusError { .. } => ErrorCategory::Network,
            StatsError::IoError(_) | StatsError::ZipError(_) => ErrorCategory::FileSystem,
            StatsError::ConfigError { .. }
            | StatsError::ConfigValidationError { .. }
            | StatsError::InvalidConfigValueError { .. }
            | StatsError::MissingConfigError { .. } => ErrorCategory::Configuration,
            StatsError::CsvError(_)
            | StatsError::ImportError { .. }
            | StatsError::AllDuplicatesError { .. }
            | StatsError::InvalidPassengerError { .. }
            | StatsError::UnknownPassengerError { .. }
            | StatsError::InvalidContactQueryError { .. }
            | StatsError::EmptyDatasetError => ErrorCategory::Data,
            StatsError::SerializationError(_) | StatsError::ProcessingError { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 重複上傳只是警告，資料已在系統中
            StatsError::AllDuplicatesError { .. } => ErrorSeverity::Low,
            StatsError::HttpError(_) | StatsError::HttpStatusError { .. } => ErrorSeverity::Medium,
            StatsError::SerializationError(_)
            | StatsError::ZipError(_)
            | StatsError::ProcessingError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check that the passenger data endpoint is reachable and retry",
            ErrorCategory::FileSystem => {
                "Check that the input files exist and the output directory is writable"
            }
            ErrorCategory::Configuration => "Review the command line arguments or TOML configuration",
            ErrorCategory::Data => match self {
                StatsError::EmptyDatasetError => "Upload passenger data before requesting statistics",
                StatsError::UnknownPassengerError { .. } => {
                    "Make sure the passenger id exists in the uploaded data"
                }
                _ => "Check the CSV file formatting and content",
            },
            ErrorCategory::Internal => "This is likely a bug, please report it with the input data",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StatsError::EmptyDatasetError => "No passengers in database.".to_string(),
            StatsError::AllDuplicatesError { .. } => {
                "All passengers in this file are already in the system".to_string()
            }
            StatsError::ImportError { .. } => {
                "No successful uploads, check file formatting and content".to_string()
            }
            StatsError::UnknownPassengerError { .. } => "Invalid passenger Id.".to_string(),
            StatsError::InvalidContactQueryError { message } => format!("Invalid contact search: {}", message),
            StatsError::HttpError(_) | StatsError::HttpStatusError { .. } => {
                format!("Could not fetch passenger data: {}", self)
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
