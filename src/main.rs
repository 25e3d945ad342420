use anyhow::Context;
use clap::Parser;
use data_migration::core::ConfigProvider;
use data_migration::utils::error::ErrorSeverity;
use data_migration::utils::{logger, validation::Validate};
use data_migration::{CliConfig, MigrationEngine, Postgres, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting data-migration");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    match &cli.config {
        Some(path) => {
            let config = TomlConfig::from_file(path)
                .with_context(|| format!("failed to load configuration from {path}"))?;
            let monitor = cli.monitor || config.monitoring_enabled();
            run(&config, monitor).await
        }
        None => run(&cli, cli.monitor).await,
    }
}

async fn run<C: ConfigProvider + Validate>(config: &C, monitor: bool) -> anyhow::Result<()> {
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e.user_friendly_message());
        eprintln!("Suggestion: {}", e.recovery_suggestion());
        std::process::exit(3);
    }

    let engine = match MigrationEngine::from_config(config, monitor) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{}", e.user_friendly_message());
            std::process::exit(3);
        }
    };

    let db = Postgres::connect(config.db_url(), config.max_connections())
        .await
        .context("failed to connect to the database")?;

    tracing::info!("running tasks: {}", engine.task_names().join(", "));

    match engine.run_all(&db).await {
        Ok(reports) => {
            for report in &reports {
                println!(
                    "task {}: {} processed, {} skipped, {} failed in {:?}",
                    report.task, report.processed, report.skipped, report.failed, report.duration
                );
            }
            tracing::info!("all migration tasks completed");
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "Migration failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );

            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }

            Ok(())
        }
    }
}
