use crate::core::{ConfigProvider, KNOWN_TASKS};
use crate::utils::error::{MigrationError, Result};
use crate::utils::validation::{
    validate_db_url, validate_non_empty_string, validate_positive_number, validate_range,
    validate_task_names, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub migration: MigrationMeta,
    pub database: DatabaseConfig,
    pub tasks: TasksConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationMeta {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    pub run: Vec<String>,
    pub batch_size: Option<i64>,
    pub throttle_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MigrationError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MigrationError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` references with the environment variable's value.
    /// Unset variables are left verbatim so validation reports them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn db_url(&self) -> &str {
        &self.database.url
    }

    fn max_connections(&self) -> u32 {
        self.database.max_connections.unwrap_or(5)
    }

    fn batch_size(&self) -> i64 {
        self.tasks.batch_size.unwrap_or(1)
    }

    fn throttle_ms(&self) -> u64 {
        self.tasks.throttle_ms.unwrap_or(50)
    }

    fn tasks(&self) -> &[String] {
        &self.tasks.run
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("migration.name", &self.migration.name)?;
        validate_db_url("database.url", &self.database.url)?;
        validate_positive_number("tasks.batch_size", self.batch_size(), 1)?;
        validate_range("tasks.throttle_ms", self.throttle_ms(), 0, 60_000)?;
        validate_positive_number(
            "database.max_connections",
            i64::from(self.max_connections()),
            1,
        )?;
        validate_task_names("tasks.run", &self.tasks.run, &KNOWN_TASKS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[migration]
name = "auction-backfill"
description = "Backfill competition_auctions from legacy blobs"
version = "1.0.0"

[database]
url = "postgresql://localhost/settlement"
max_connections = 10

[tasks]
run = ["auctions", "fees"]
batch_size = 5
throttle_ms = 100
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.migration.name, "auction-backfill");
        assert_eq!(config.db_url(), "postgresql://localhost/settlement");
        assert_eq!(config.max_connections(), 10);
        assert_eq!(config.batch_size(), 5);
        assert_eq!(config.throttle_ms(), 100);
        assert_eq!(config.tasks(), ["auctions", "fees"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_optional_fields() {
        let toml_content = r#"
[migration]
name = "minimal"
description = "minimal"
version = "1.0"

[database]
url = "postgresql://"

[tasks]
run = ["auctions"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.max_connections(), 5);
        assert_eq!(config.batch_size(), 1);
        assert_eq!(config.throttle_ms(), 50);
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_MIGRATION_DB_URL", "postgresql://test-host/db");

        let toml_content = r#"
[migration]
name = "test"
description = "test"
version = "1.0"

[database]
url = "${TEST_MIGRATION_DB_URL}"

[tasks]
run = ["auctions"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.db_url(), "postgresql://test-host/db");

        std::env::remove_var("TEST_MIGRATION_DB_URL");
    }

    #[test]
    fn test_unset_env_var_is_left_verbatim_and_fails_validation() {
        let toml_content = r#"
[migration]
name = "test"
description = "test"
version = "1.0"

[database]
url = "${DOES_NOT_EXIST_FOR_SURE}"

[tasks]
run = ["auctions"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.db_url(), "${DOES_NOT_EXIST_FOR_SURE}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_task_fails_validation() {
        let toml_content = r#"
[migration]
name = "test"
description = "test"
version = "1.0"

[database]
url = "postgresql://"

[tasks]
run = ["orders"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[migration]
name = "file-test"
description = "File test"
version = "1.0"

[database]
url = "postgresql://"

[tasks]
run = ["fees"]

[monitoring]
enabled = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.migration.name, "file-test");
        assert!(config.monitoring_enabled());
    }
}
