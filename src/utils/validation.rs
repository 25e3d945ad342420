use crate::utils::error::{MigrationError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_db_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(MigrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "postgres" | "postgresql" => Ok(()),
            scheme => Err(MigrationError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(MigrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: i64, min_value: i64) -> Result<()> {
    if value < min_value {
        return Err(MigrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(MigrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_task_names(field_name: &str, tasks: &[String], known: &[&str]) -> Result<()> {
    if tasks.is_empty() {
        return Err(MigrationError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    for task in tasks {
        if !known.contains(&task.as_str()) {
            return Err(MigrationError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: task.clone(),
                reason: format!("Unknown task. Known tasks: {}", known.join(", ")),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MigrationError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_db_url() {
        assert!(validate_db_url("db_url", "postgresql://localhost/db").is_ok());
        assert!(validate_db_url("db_url", "postgres://user:pw@host:5432/db").is_ok());
        assert!(validate_db_url("db_url", "").is_err());
        assert!(validate_db_url("db_url", "not-a-url").is_err());
        assert!(validate_db_url("db_url", "https://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("batch_size", 5, 1).is_ok());
        assert!(validate_positive_number("batch_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("throttle_ms", 50u64, 0, 60_000).is_ok());
        assert!(validate_range("throttle_ms", 61_000u64, 0, 60_000).is_err());
    }

    #[test]
    fn test_validate_task_names() {
        let known = ["auctions", "fees"];
        let tasks = vec!["auctions".to_string(), "fees".to_string()];
        assert!(validate_task_names("tasks", &tasks, &known).is_ok());

        let unknown = vec!["orders".to_string()];
        assert!(validate_task_names("tasks", &unknown, &known).is_err());

        assert!(validate_task_names("tasks", &[], &known).is_err());
    }
}
