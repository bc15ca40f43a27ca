use anyhow::Context;
use clap::Parser;
use redis_ready::utils::{logger, validation::Validate};
use redis_ready::{CliConfig, DependencySetup, ReadinessWaiter, TomlConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            TomlConfig::from_file(path)
                .with_context(|| format!("failed to load config file '{}'", path.display()))?
        }
        None => TomlConfig::default(),
    };
    cli.apply_to(&mut config);
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let waiter = ReadinessWaiter::new(config.retry_policy()?).with_cancellation(cancel);
    let setup = DependencySetup::new(
        config.container_runtime(),
        config.container_spec(),
        config.build_probe()?,
        waiter,
    );

    match setup.run().await {
        Ok(outcome) => {
            tracing::info!(
                "✅ {} ready after {} attempt(s) in {:?} (container: {:?})",
                outcome.readiness.dependency,
                outcome.readiness.attempts,
                outcome.readiness.elapsed,
                outcome.container
            );
            if cli.report {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "❌ Dependency setup failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    }
}
