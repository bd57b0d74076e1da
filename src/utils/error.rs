use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdaError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Download failed with status {status}: {url}")]
    DownloadError { url: String, status: u16 },

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

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Missing column(s) {columns:?}; columns found: {found:?}")]
    MissingColumnError {
        columns: Vec<String>,
        found: Vec<String>,
    },

    #[error("Not enough data for {operation}: {message}")]
    InsufficientDataError { operation: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Network,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EdaError {
    pub fn missing_columns(columns: &[&str], found: &[String]) -> Self {
        EdaError::MissingColumnError {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            found: found.to_vec(),
        }
    }

    pub fn insufficient(operation: &str, message: impl Into<String>) -> Self {
        EdaError::InsufficientDataError {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EdaError::ConfigError { .. }
            | EdaError::ConfigValidationError { .. }
            | EdaError::InvalidConfigValueError { .. }
            | EdaError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EdaError::CsvError(_) | EdaError::MissingColumnError { .. } => ErrorCategory::Input,
            EdaError::HttpError(_) | EdaError::DownloadError { .. } => ErrorCategory::Network,
            EdaError::InsufficientDataError { .. } | EdaError::ProcessingError { .. } => {
                ErrorCategory::Processing
            }
            EdaError::ZipError(_) | EdaError::IoError(_) | EdaError::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EdaError::HttpError(_) | EdaError::DownloadError { .. } => ErrorSeverity::Medium,
            EdaError::InsufficientDataError { .. } => ErrorSeverity::Medium,
            EdaError::IoError(_) | EdaError::ZipError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            EdaError::MissingColumnError { columns, .. } => format!(
                "Check that the input is the NASA Meteorite Landings export and contains: {}",
                columns.join(", ")
            ),
            EdaError::CsvError(_) => {
                "Make sure the input file is a comma-separated file with a header row".to_string()
            }
            EdaError::HttpError(_) | EdaError::DownloadError { .. } => {
                "Check the source URL and your network connection, then retry".to_string()
            }
            EdaError::IoError(_) => {
                "Check that the input path exists and the output directory is writable".to_string()
            }
            EdaError::InsufficientDataError { .. } => {
                "Relax the year window or filters so that more years remain".to_string()
            }
            EdaError::ConfigError { .. }
            | EdaError::ConfigValidationError { .. }
            | EdaError::InvalidConfigValueError { .. }
            | EdaError::MissingConfigError { .. } => {
                "Review the command line flags or the TOML configuration file".to_string()
            }
            EdaError::ZipError(_) | EdaError::SerializationError(_) => {
                "Retry with compression disabled or a different output directory".to_string()
            }
            EdaError::ProcessingError { .. } => {
                "Re-run with --verbose to see which stage failed".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Input => format!("Could not read the dataset: {}", self),
            ErrorCategory::Network => format!("Could not download the dataset: {}", self),
            ErrorCategory::Processing => format!("Analysis failed: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
        }
    }

    /// Process exit code for the binaries.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, EdaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_lists_found_headers() {
        let err = EdaError::missing_columns(&["year"], &["id".to_string(), "name".to_string()]);
        let message = err.to_string();
        assert!(message.contains("year"));
        assert!(message.contains("name"));
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_severity_mapping() {
        let io = EdaError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(io.severity(), ErrorSeverity::Critical);
        assert_eq!(io.exit_code(), 3);

        let download = EdaError::DownloadError {
            url: "https://example.com/data.csv".to_string(),
            status: 503,
        };
        assert_eq!(download.category(), ErrorCategory::Network);
        assert_eq!(download.exit_code(), 2);
    }
}
