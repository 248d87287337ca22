//! # verishot
//!
//! Renders a directory of static HTML pages under a set of simulated device
//! profiles (viewport, user agent, pixel density, touch capability) and
//! writes one screenshot per (page, device) pair for visual-regression
//! review.
//!
//! A run serves the target directory over an ephemeral loopback HTTP server,
//! discovers every `.html` file once, then walks the configured device list
//! strictly in order: each device gets one isolated browsing context and a
//! pool of workers that race through the shared page queue, capturing
//! full-page PNGs into `verification/<subdir>/<Device>_<stem>.png`.
//! Per-page and per-device failures are logged and skipped; only startup
//! errors (bad directory, port exhaustion, browser launch) fail the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use verishot::{CaptureConfig, ChromiumDriver, Orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CaptureConfig::default();
//!     let orchestrator = Orchestrator::new(config, Arc::new(ChromiumDriver));
//!     let summary = orchestrator.run("./site".as_ref()).await?;
//!     println!("captured {} screenshots", summary.captured);
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! verishot ./site --device "Desktop Chrome" --device "iPhone 16"
//! ```

/// Command-line interface and logging setup
pub mod cli;

/// Configuration and settings for a capture run
pub mod config;

/// Content-root validation, page discovery, and path security checks
pub mod content;

/// Device profiles and name resolution
pub mod devices;

/// Browser-automation traits and the chromiumoxide implementation
pub mod driver;

/// Error types shared across the crate
pub mod error;

/// Capture metrics facade
pub mod metrics;

/// Run orchestration across devices
pub mod orchestrator;

/// Output-path derivation and directory-creation cache
pub mod output;

/// Ephemeral static-file server
pub mod server;

/// Per-device capture worker pool
pub mod worker;


pub use cli::*;
pub use config::*;
pub use content::*;
pub use devices::*;
pub use driver::*;
pub use error::*;
pub use metrics::*;
pub use orchestrator::*;
pub use output::*;
pub use server::*;
pub use worker::*;
