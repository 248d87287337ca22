use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "verishot")]
#[command(about = "Multi-device screenshot capture for directories of static HTML pages")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[arg(help = "Directory of static HTML pages to capture")]
    pub target_dir: PathBuf,

    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Max concurrent pages per device")]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Navigation timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Lower bound of the server port range")]
    pub port_min: Option<u16>,

    #[arg(long, help = "Upper bound of the server port range")]
    pub port_max: Option<u16>,

    #[arg(long, help = "Output directory for screenshots")]
    pub output: Option<PathBuf>,

    #[arg(long = "device", help = "Capture only the named device (repeatable)")]
    pub devices: Vec<String>,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,
}

pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}
