//! Capture worker pool
//!
//! For one device's browsing context, a set of workers race-pops a shared
//! queue of page paths and captures one screenshot per page. Per-page
//! failures are logged and counted but never abort the pool.

use crate::{
    output_path, validate_page_path, BrowsingContext, CaptureError, CaptureMetrics, DirCache,
    PageHandle,
};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{error, info};
use url::Url;

/// Run-scoped state shared by the orchestrator and every worker. Replaces
/// any notion of process-global mutable state.
pub struct RunContext {
    pub base_url: Url,
    pub output_root: PathBuf,
    pub dirs: DirCache,
    pub navigation_timeout: Duration,
    pub metrics: CaptureMetrics,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PoolOutcome {
    pub captured: usize,
    pub failed: usize,
}

/// Drains `pages` to completion with `min(concurrency, pages)` workers.
///
/// Each page is claimed exactly once; completion order across workers is
/// unspecified. The browsing context is shared read-only; only the queue and
/// the directory cache are mutated, both race-safe.
pub async fn run_capture_pool(
    ctx: Arc<RunContext>,
    browser_ctx: Arc<dyn BrowsingContext>,
    device_name: &str,
    pages: &[String],
    concurrency: usize,
) -> PoolOutcome {
    let queue: Arc<Mutex<VecDeque<String>>> =
        Arc::new(Mutex::new(pages.iter().cloned().collect()));
    let captured = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));

    let worker_count = concurrency.min(pages.len()).max(1);
    let mut handles = Vec::with_capacity(worker_count);

    for _ in 0..worker_count {
        let ctx = ctx.clone();
        let browser_ctx = browser_ctx.clone();
        let queue = queue.clone();
        let device = device_name.to_string();
        let captured = captured.clone();
        let failed = failed.clone();

        handles.push(tokio::spawn(async move {
            loop {
                let page_path = { queue.lock().await.pop_front() };
                let Some(page_path) = page_path else { break };

                let started = Instant::now();
                match capture_page(&ctx, browser_ctx.as_ref(), &device, &page_path).await {
                    Ok(output) => {
                        ctx.metrics.record_capture(started.elapsed(), true);
                        captured.fetch_add(1, Ordering::Relaxed);
                        info!("[{device}] Saved: {page_path} -> {}", display_path(&output));
                    }
                    Err(e) => {
                        ctx.metrics.record_capture(started.elapsed(), false);
                        failed.fetch_add(1, Ordering::Relaxed);
                        error!("[{device}] Error capturing {page_path}: {e}");
                    }
                }
            }
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            error!("Capture worker panicked: {e}");
        }
    }

    PoolOutcome {
        captured: captured.load(Ordering::Relaxed),
        failed: failed.load(Ordering::Relaxed),
    }
}

/// One capture: validate the path, build the URL, materialize the output
/// directory, navigate with the two-phase wait, rasterize, write. The page
/// is closed on every exit path.
async fn capture_page(
    ctx: &RunContext,
    browser_ctx: &dyn BrowsingContext,
    device_name: &str,
    page_path: &str,
) -> Result<PathBuf, CaptureError> {
    validate_page_path(page_path)?;

    let url = page_url(&ctx.base_url, page_path)?;
    let output = output_path(&ctx.output_root, page_path, device_name);
    if let Some(dir) = output.parent() {
        ctx.dirs.ensure(dir).await?;
    }

    let page = browser_ctx.new_page().await?;
    let result = capture_on_page(ctx, page.as_ref(), url.as_str(), &output).await;
    page.close().await;

    result.map(|_| output)
}

async fn capture_on_page(
    ctx: &RunContext,
    page: &dyn PageHandle,
    url: &str,
    output: &Path,
) -> Result<(), CaptureError> {
    // Two-phase wait: initial document parse, then network idle, both under
    // one navigation-timeout budget.
    let navigation = async {
        page.goto(url).await?;
        page.wait_for_idle().await
    };
    match timeout(ctx.navigation_timeout, navigation).await {
        Ok(result) => result?,
        Err(_) => return Err(CaptureError::Timeout(ctx.navigation_timeout)),
    }

    let image = page.screenshot(true).await?;
    tokio::fs::write(output, image).await?;
    Ok(())
}

/// Joins the base URL with the relative page path, percent-encoding each
/// segment independently.
pub fn page_url(base_url: &Url, page_path: &str) -> Result<Url, CaptureError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|_| CaptureError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(page_path.split('/'));
    Ok(url)
}

fn display_path(path: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) => path
            .strip_prefix(&cwd)
            .unwrap_or(path)
            .display()
            .to_string(),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("http://127.0.0.1:3000/").unwrap()
    }

    #[test]
    fn test_page_url_plain() {
        assert_eq!(
            page_url(&base(), "index.html").unwrap().as_str(),
            "http://127.0.0.1:3000/index.html"
        );
        assert_eq!(
            page_url(&base(), "sub/page.html").unwrap().as_str(),
            "http://127.0.0.1:3000/sub/page.html"
        );
    }

    #[test]
    fn test_page_url_encodes_segments() {
        assert_eq!(
            page_url(&base(), "my pages/a page.html").unwrap().as_str(),
            "http://127.0.0.1:3000/my%20pages/a%20page.html"
        );
    }
}
