use crate::db::Postgres;
use crate::domain::model::MigrationReport;
use crate::utils::error::Result;
use async_trait::async_trait;

/// One self-contained migration task. The engine drives tasks through this
/// seam so it can be tested without a live database.
#[async_trait]
pub trait Migration: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, db: &Postgres) -> Result<MigrationReport>;
}

pub trait ConfigProvider: Send + Sync {
    fn db_url(&self) -> &str;
    fn max_connections(&self) -> u32;
    fn batch_size(&self) -> i64;
    fn throttle_ms(&self) -> u64;
    fn tasks(&self) -> &[String];
}
