use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use verishot::{setup_logging, CaptureConfig, ChromiumDriver, Cli, Orchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    setup_logging(args.verbose);

    info!("Starting verishot v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args).await?;

    let orchestrator = Orchestrator::new(config, Arc::new(ChromiumDriver));
    match orchestrator.run(&args.target_dir).await {
        Ok(summary) => {
            info!(
                "Captured {} screenshots across {} devices ({} failed, {} devices skipped) in {:?}",
                summary.captured,
                summary.devices_processed,
                summary.failed,
                summary.devices_skipped,
                summary.elapsed
            );
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

async fn load_config(args: &Cli) -> anyhow::Result<CaptureConfig> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = tokio::fs::read_to_string(config_path).await?;
        serde_json::from_str(&config_content)?
    } else {
        CaptureConfig::default()
    };

    // Override with CLI arguments
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(timeout) = args.timeout {
        config.navigation_timeout = Duration::from_secs(timeout);
    }
    if let Some(port_min) = args.port_min {
        config.port_min = port_min;
    }
    if let Some(port_max) = args.port_max {
        config.port_max = port_max;
    }
    if let Some(output) = &args.output {
        config.output_root = output.clone();
    }
    if !args.devices.is_empty() {
        config.devices = args.devices.clone();
    }
    if let Some(chrome_path) = &args.chrome_path {
        config.chrome_path = Some(chrome_path.clone());
    }

    config.validate()?;

    info!("Concurrency per device: {}", config.concurrency);
    info!("Navigation timeout: {:?}", config.navigation_timeout);
    info!("Target devices: {}", config.devices.len());

    Ok(config)
}
