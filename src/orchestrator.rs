//! Run orchestration
//!
//! Sequences the whole capture run: validate the content root, start the
//! ephemeral server, discover pages, then process each device strictly in
//! order with one browsing context per device. Parallelism exists only
//! within a device, across its pages. The server is stopped on every exit
//! path; only startup-phase errors propagate to the caller.

use crate::{
    discover_pages, run_capture_pool, validate_directory, BrowserHandle, BrowsingContext,
    CaptureConfig, CaptureError, CaptureMetrics, DeviceProfile, DeviceRegistry, DirCache,
    Driver, RunContext, StaticServer,
};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub pages: usize,
    pub devices_processed: usize,
    pub devices_skipped: usize,
    pub captured: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

pub struct Orchestrator {
    config: CaptureConfig,
    driver: Arc<dyn Driver>,
    registry: DeviceRegistry,
}

impl Orchestrator {
    pub fn new(config: CaptureConfig, driver: Arc<dyn Driver>) -> Self {
        Self {
            config,
            driver,
            registry: DeviceRegistry::builtin(),
        }
    }

    /// Replaces the built-in device preset table, mainly for tests.
    pub fn with_registry(mut self, registry: DeviceRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Runs the full capture pipeline against `target_dir`.
    pub async fn run(&self, target_dir: &Path) -> Result<RunSummary, CaptureError> {
        let started = Instant::now();

        let root = validate_directory(target_dir)?;
        info!("Target directory: {}", root.display());

        let server = StaticServer::start(&root, &self.config).await?;
        info!("Server running at {}", server.base_url());

        // The server must come down whether captures succeed or fail.
        let result = self.run_captures(&root, &server).await;
        server.shutdown().await;

        let mut summary = result?;
        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    async fn run_captures(
        &self,
        root: &Path,
        server: &StaticServer,
    ) -> Result<RunSummary, CaptureError> {
        info!("Scanning for HTML files...");
        let pages = discover_pages(root);

        let mut summary = RunSummary {
            pages: pages.len(),
            ..Default::default()
        };

        if pages.is_empty() {
            info!("No HTML files found.");
            return Ok(summary);
        }
        info!("Found {} HTML files.", pages.len());

        let output_root = std::env::current_dir()?.join(&self.config.output_root);
        let ctx = Arc::new(RunContext {
            base_url: server.base_url().clone(),
            output_root,
            dirs: DirCache::new(),
            navigation_timeout: self.config.navigation_timeout,
            metrics: CaptureMetrics::new(),
        });

        let browser = self.driver.launch(&self.config).await?;
        self.run_devices(browser.as_ref(), &pages, &ctx, &mut summary)
            .await;
        if let Err(e) = browser.close().await {
            warn!("Browser shutdown error: {e}");
        }

        info!("All done!");
        Ok(summary)
    }

    /// Devices are processed strictly sequentially; one device's context is
    /// fully closed before the next opens. Unresolved devices and context
    /// failures are warnings, never fatal.
    async fn run_devices(
        &self,
        browser: &dyn BrowserHandle,
        pages: &[String],
        ctx: &Arc<RunContext>,
        summary: &mut RunSummary,
    ) {
        for device_name in &self.config.devices {
            let profile = match self.resolve_device(device_name) {
                Some(profile) => profile,
                None => {
                    warn!("Device config for '{device_name}' not found. Skipping.");
                    ctx.metrics.record_device_skipped();
                    summary.devices_skipped += 1;
                    continue;
                }
            };

            info!("Processing for device: {device_name}");

            let browser_ctx: Arc<dyn BrowsingContext> =
                match browser.new_context(&profile).await {
                    Ok(browser_ctx) => Arc::from(browser_ctx),
                    Err(e) => {
                        warn!("Could not open context for '{device_name}': {e}. Skipping.");
                        ctx.metrics.record_device_skipped();
                        summary.devices_skipped += 1;
                        continue;
                    }
                };

            let outcome = run_capture_pool(
                ctx.clone(),
                browser_ctx.clone(),
                device_name,
                pages,
                self.config.concurrency,
            )
            .await;
            summary.captured += outcome.captured;
            summary.failed += outcome.failed;
            summary.devices_processed += 1;

            if let Err(e) = browser_ctx.close().await {
                warn!("Context shutdown error for '{device_name}': {e}");
            }
        }
    }

    fn resolve_device(&self, device_name: &str) -> Option<DeviceProfile> {
        if let Some(profile) = self.registry.resolve(device_name) {
            return Some(profile);
        }
        // Desktop Chrome gets an orchestrator-level default when the preset
        // lookup misses; the resolver's substring rule never applies to it.
        if device_name == "Desktop Chrome" {
            return Some(DeviceProfile::desktop_chrome_default());
        }
        None
    }
}
