//! Browser-automation seam
//!
//! The engine drives browsers through object-safe traits so the orchestrator
//! and worker pool never depend on a concrete automation backend; tests run
//! against an in-crate fake. The production implementation maps the traits
//! onto chromiumoxide's CDP session.

use crate::{CaptureConfig, CaptureError, DeviceProfile};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetTouchEmulationEnabledParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::{Page as CdpPage, ScreenshotParams};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// An open page/tab, owned by exactly one worker for one capture.
#[async_trait]
pub trait PageHandle: Send + Sync {
    /// Navigate and wait for the initial document parse.
    async fn goto(&self, url: &str) -> Result<(), CaptureError>;

    /// Wait for network-activity quiescence after `goto`.
    async fn wait_for_idle(&self) -> Result<(), CaptureError>;

    /// Rasterize the page to PNG bytes; the caller owns the file write.
    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, CaptureError>;

    /// Always called on the way out, whether the capture succeeded or not.
    async fn close(&self);
}

/// An isolated browsing session bound to one device profile.
#[async_trait]
pub trait BrowsingContext: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>, CaptureError>;
    async fn close(&self) -> Result<(), CaptureError>;
}

/// A launched browser; lives for the whole run.
#[async_trait]
pub trait BrowserHandle: Send + Sync {
    async fn new_context(
        &self,
        profile: &DeviceProfile,
    ) -> Result<Box<dyn BrowsingContext>, CaptureError>;

    async fn close(&self) -> Result<(), CaptureError>;
}

#[async_trait]
pub trait Driver: Send + Sync {
    async fn launch(&self, config: &CaptureConfig) -> Result<Box<dyn BrowserHandle>, CaptureError>;
}

/// Production driver backed by headless Chrome via chromiumoxide.
pub struct ChromiumDriver;

fn chrome_args() -> Vec<String> {
    // Unique per-run user data dir so concurrent instances on one host never
    // trip over Chrome's profile singleton.
    let unique_id = format!("{}-{}", std::process::id(), uuid::Uuid::new_v4());
    vec![
        "--headless".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        format!("--user-data-dir=/tmp/verishot-chromium-{unique_id}"),
    ]
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn launch(&self, config: &CaptureConfig) -> Result<Box<dyn BrowserHandle>, CaptureError> {
        let mut builder = BrowserConfig::builder().args(chrome_args());
        if let Some(chrome_path) = &config.chrome_path {
            builder = builder.chrome_executable(chrome_path);
        }
        let browser_config = builder.build().map_err(CaptureError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CaptureError::BrowserLaunch(e.to_string()))?;

        // The handler implements Stream and must be polled for the CDP
        // connection to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("CDP handler error: {e}");
                }
            }
            debug!("CDP handler stream ended");
        });

        info!("Browser launched");
        Ok(Box::new(ChromiumBrowser {
            browser: Arc::new(Mutex::new(browser)),
            handler_task,
        }))
    }
}

pub struct ChromiumBrowser {
    browser: Arc<Mutex<Browser>>,
    handler_task: tokio::task::JoinHandle<()>,
}

#[async_trait]
impl BrowserHandle for ChromiumBrowser {
    async fn new_context(
        &self,
        profile: &DeviceProfile,
    ) -> Result<Box<dyn BrowsingContext>, CaptureError> {
        let context_id = {
            let browser = self.browser.lock().await;
            browser
                .execute(CreateBrowserContextParams::default())
                .await
                .map_err(|e| CaptureError::Context(e.to_string()))?
                .result
                .browser_context_id
        };

        Ok(Box::new(ChromiumContext {
            browser: self.browser.clone(),
            context_id,
            profile: profile.clone(),
        }))
    }

    async fn close(&self) -> Result<(), CaptureError> {
        let result = {
            let mut browser = self.browser.lock().await;
            browser.close().await
        };
        self.handler_task.abort();
        result.map_err(|e| CaptureError::Page(e.to_string()))?;
        Ok(())
    }
}

pub struct ChromiumContext {
    browser: Arc<Mutex<Browser>>,
    context_id: BrowserContextId,
    profile: DeviceProfile,
}

#[async_trait]
impl BrowsingContext for ChromiumContext {
    async fn new_page(&self) -> Result<Box<dyn PageHandle>, CaptureError> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.context_id.clone())
            .build()
            .map_err(CaptureError::Context)?;

        let page = {
            let browser = self.browser.lock().await;
            browser
                .new_page(params)
                .await
                .map_err(|e| CaptureError::Page(e.to_string()))?
        };

        apply_device_profile(&page, &self.profile).await?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&self) -> Result<(), CaptureError> {
        let params = DisposeBrowserContextParams::builder()
            .browser_context_id(self.context_id.clone())
            .build()
            .map_err(CaptureError::Context)?;

        let browser = self.browser.lock().await;
        browser
            .execute(params)
            .await
            .map_err(|e| CaptureError::Context(e.to_string()))?;
        Ok(())
    }
}

async fn apply_device_profile(page: &CdpPage, profile: &DeviceProfile) -> Result<(), CaptureError> {
    let device_metrics = SetDeviceMetricsOverrideParams::builder()
        .width(i64::from(profile.viewport_width))
        .height(i64::from(profile.viewport_height))
        .device_scale_factor(profile.device_scale_factor)
        .mobile(profile.is_mobile)
        .build()
        .map_err(CaptureError::Context)?;
    page.execute(device_metrics)
        .await
        .map_err(|e| CaptureError::Page(e.to_string()))?;

    let user_agent = SetUserAgentOverrideParams::builder()
        .user_agent(profile.user_agent.clone())
        .build()
        .map_err(CaptureError::Context)?;
    page.execute(user_agent)
        .await
        .map_err(|e| CaptureError::Page(e.to_string()))?;

    let touch = SetTouchEmulationEnabledParams::builder()
        .enabled(profile.has_touch)
        .build()
        .map_err(CaptureError::Context)?;
    page.execute(touch)
        .await
        .map_err(|e| CaptureError::Page(e.to_string()))?;

    Ok(())
}

pub struct ChromiumPage {
    page: CdpPage,
}

#[async_trait]
impl PageHandle for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<(), CaptureError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| CaptureError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_idle(&self) -> Result<(), CaptureError> {
        self.page
            .wait_for_navigation()
            .await
            .map_err(|e| CaptureError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>, CaptureError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();
        self.page
            .screenshot(params)
            .await
            .map_err(|e| CaptureError::Capture(e.to_string()))
    }

    async fn close(&self) {
        if let Err(e) = self.page.clone().close().await {
            debug!("Page close error: {e}");
        }
    }
}
