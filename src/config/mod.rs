pub mod toml_config;

use crate::core::{ConfigProvider, KNOWN_TASKS};
use crate::utils::error::Result;
use crate::utils::validation::{
    self, validate_db_url, validate_positive_number, validate_range, Validate,
};
use clap::Parser;
use url::Url;

#[derive(Debug, Clone, Parser)]
#[command(name = "data-migration")]
#[command(about = "One-shot backfill and repair migrations for the settlement database")]
pub struct CliConfig {
    /// Url of the Postgres database. By default connects to locally running
    /// postgres.
    #[arg(long, env, default_value = "postgresql://")]
    pub db_url: Url,

    /// Migration tasks to run, in order.
    #[arg(long, value_delimiter = ',', default_value = "auctions")]
    pub tasks: Vec<String>,

    /// Competitions per transaction. Batches above 1 make skipping corrupt
    /// rows slower.
    #[arg(long, default_value = "1")]
    pub batch_size: i64,

    /// Pause between batches so the backfill does not starve production
    /// load.
    #[arg(long, default_value = "50")]
    pub throttle_ms: u64,

    #[arg(long, default_value = "5")]
    pub max_connections: u32,

    /// Optional TOML configuration file. Settings from the file take
    /// precedence over the flags above.
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON for log collectors.
    #[arg(long)]
    pub log_json: bool,

    #[arg(long, help = "Log process resource usage around each task")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn db_url(&self) -> &str {
        self.db_url.as_str()
    }

    fn max_connections(&self) -> u32 {
        self.max_connections
    }

    fn batch_size(&self) -> i64 {
        self.batch_size
    }

    fn throttle_ms(&self) -> u64 {
        self.throttle_ms
    }

    fn tasks(&self) -> &[String] {
        &self.tasks
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_db_url("db_url", self.db_url.as_str())?;
        validate_positive_number("batch_size", self.batch_size, 1)?;
        validate_range("throttle_ms", self.throttle_ms, 0, 60_000)?;
        validate_positive_number("max_connections", i64::from(self.max_connections), 1)?;
        validation::validate_task_names("tasks", &self.tasks, &KNOWN_TASKS)?;
        Ok(())
    }
}
