use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in `{field}`: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value `{value}` for `{field}`: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field `{field}`")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, MigrationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Database,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Recoverable, the run can be considered successful.
    Low,
    /// Transient, retrying the run may succeed.
    Medium,
    /// The run failed on data it could not process.
    High,
    /// Environment or configuration is broken.
    Critical,
}

impl MigrationError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DatabaseError(_) => ErrorCategory::Database,
            Self::SerializationError(_) | Self::ProcessingError { .. } => ErrorCategory::Data,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Connection-level failures are worth a retry; everything else
            // coming out of the database means the run hit broken data.
            Self::DatabaseError(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => {
                ErrorSeverity::Medium
            }
            Self::DatabaseError(_) => ErrorSeverity::High,
            Self::SerializationError(_) | Self::ProcessingError { .. } => ErrorSeverity::High,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::Critical,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DatabaseError(e) => format!("Database operation failed: {}", e),
            Self::SerializationError(e) => format!("Could not decode stored data: {}", e),
            Self::IoError(e) => format!("File system error: {}", e),
            Self::ConfigValidationError { field, message } => {
                format!("Configuration field `{}` is invalid: {}", field, message)
            }
            Self::InvalidConfigValueError { field, value, .. } => {
                format!("`{}` is not a valid value for `{}`", value, field)
            }
            Self::MissingConfigError { field } => {
                format!("Configuration field `{}` is required", field)
            }
            Self::ProcessingError { message } => format!("Processing failed: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Database => {
                "Check that the database is reachable and the url is correct".to_string()
            }
            ErrorCategory::Data => {
                "Inspect the logged auction id and fix or skip the offending row".to_string()
            }
            ErrorCategory::Configuration => {
                "Fix the configuration and run again; no data was modified".to_string()
            }
            ErrorCategory::System => "Check file permissions and disk space".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_critical() {
        let err = MigrationError::MissingConfigError {
            field: "db_url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_serialization_errors_are_data_errors() {
        let err: MigrationError = serde_json::from_str::<i64>("not json").unwrap_err().into();
        assert_eq!(err.category(), ErrorCategory::Data);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_pool_timeout_is_retryable() {
        let err = MigrationError::DatabaseError(sqlx::Error::PoolTimedOut);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
    }
}
