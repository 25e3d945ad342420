pub mod config;
pub mod core;
pub mod db;
pub mod domain;
pub mod utils;

pub use crate::config::{toml_config::TomlConfig, CliConfig};
pub use crate::core::{
    auctions::PopulateHistoricAuctions, engine::MigrationEngine, fees::ConvertExecutedFees,
};
pub use crate::db::Postgres;
pub use crate::domain::model::MigrationReport;
pub use crate::utils::error::{MigrationError, Result};
