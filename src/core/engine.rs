use crate::core::auctions::PopulateHistoricAuctions;
use crate::core::fees::ConvertExecutedFees;
use crate::db::Postgres;
use crate::domain::model::MigrationReport;
use crate::domain::ports::{ConfigProvider, Migration};
use crate::utils::error::{MigrationError, Result};
use crate::utils::monitor::SystemMonitor;
use std::time::{Duration, Instant};

/// Runs migration tasks in order. A failing task aborts the run; work the
/// task already committed stays committed.
pub struct MigrationEngine {
    tasks: Vec<Box<dyn Migration>>,
    monitor: SystemMonitor,
}

impl MigrationEngine {
    pub fn new(tasks: Vec<Box<dyn Migration>>) -> Self {
        Self {
            tasks,
            monitor: SystemMonitor::default(),
        }
    }

    pub fn new_with_monitoring(tasks: Vec<Box<dyn Migration>>, monitor_enabled: bool) -> Self {
        Self {
            tasks,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Builds the engine with one task per configured task name, in the
    /// configured order.
    pub fn from_config<C: ConfigProvider>(config: &C, monitor_enabled: bool) -> Result<Self> {
        let throttle = Duration::from_millis(config.throttle_ms());

        let mut tasks: Vec<Box<dyn Migration>> = Vec::new();
        for name in config.tasks() {
            match name.as_str() {
                PopulateHistoricAuctions::NAME => tasks.push(Box::new(
                    PopulateHistoricAuctions::new(config.batch_size(), throttle),
                )),
                ConvertExecutedFees::NAME => tasks.push(Box::new(ConvertExecutedFees::new(
                    config.batch_size(),
                    throttle,
                ))),
                other => {
                    return Err(MigrationError::InvalidConfigValueError {
                        field: "tasks".to_string(),
                        value: other.to_string(),
                        reason: format!(
                            "Unknown task. Known tasks: {}",
                            crate::core::KNOWN_TASKS.join(", ")
                        ),
                    })
                }
            }
        }

        Ok(Self::new_with_monitoring(tasks, monitor_enabled))
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|task| task.name()).collect()
    }

    pub async fn run_all(&self, db: &Postgres) -> Result<Vec<MigrationReport>> {
        let mut reports = Vec::with_capacity(self.tasks.len());

        for task in &self.tasks {
            tracing::info!("starting migration task `{}`", task.name());
            self.monitor.log_stats(task.name());

            let started = Instant::now();
            let report = task.run(db).await?;

            tracing::info!(
                "task `{}` finished in {:?}: {} processed, {} skipped, {} failed",
                task.name(),
                started.elapsed(),
                report.processed,
                report.skipped,
                report.failed
            );
            self.monitor.log_stats(task.name());

            reports.push(report);
        }

        self.monitor.log_final_stats();
        Ok(reports)
    }
}
