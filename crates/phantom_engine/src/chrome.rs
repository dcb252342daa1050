//! Chrome DevTools backed engine.
//!
//! One browser process serves every job of an invocation; each job gets its
//! own tab with a console listener that lives until the tab is closed.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::cdp::js_protocol::runtime::EventConsoleApiCalled;
use chromiumoxide::Page;
use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::StreamExt;
use phantom_core::JobId;
use tempfile::TempDir;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::engine::{ConsoleSink, Engine, EnginePage, PageLayout};
use crate::persist::write_atomic_blocking;
use crate::EngineError;

/// Browser launch options.
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Run without a visible window (default: true).
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Extra Chrome command-line arguments.
    pub args: Vec<String>,
    /// Chrome executable (None = auto-detect).
    pub chrome_path: Option<PathBuf>,
}

impl ChromeConfig {
    /// Shows the browser window while jobs run.
    #[must_use]
    pub fn visible(mut self) -> Self {
        self.headless = false;
        self
    }

    #[must_use]
    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    fn to_browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig, EngineError> {
        let mut config = BrowserConfig::builder()
            .window_size(self.window_size.0, self.window_size.1)
            .user_data_dir(profile_dir);

        if !self.headless {
            config = config.with_head();
        }
        for arg in &self.args {
            config = config.arg(arg.clone());
        }
        if let Some(path) = &self.chrome_path {
            config = config.chrome_executable(path);
        }

        config.build().map_err(|e| EngineError::LaunchFailed {
            reason: format!("invalid browser configuration: {e}"),
            source: None,
        })
    }
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: (1280, 1024),
            args: vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
            ],
            chrome_path: None,
        }
    }
}

/// A running Chrome process.
pub struct ChromeEngine {
    browser: Mutex<Option<Browser>>,
    handler_task: JoinHandle<()>,
    // Removed from disk on drop.
    _profile: TempDir,
}

impl ChromeEngine {
    pub async fn launch(config: ChromeConfig) -> Result<Self, EngineError> {
        engine_debug!("launching chrome with {:?}", config);
        let profile = tempfile::Builder::new()
            .prefix("phantom-chrome-")
            .tempdir()?;
        let browser_config = config.to_browser_config(profile.path())?;

        let (browser, mut handler) =
            Browser::launch(browser_config)
                .await
                .map_err(|e| EngineError::LaunchFailed {
                    reason: "failed to launch Chrome process".to_string(),
                    source: Some(Box::new(e)),
                })?;

        // The handler must be polled for any CDP traffic to flow.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    engine_debug!("browser handler error: {}", e);
                }
            }
        });

        engine_info!("chrome launched (headless: {})", config.headless);
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler_task,
            _profile: profile,
        })
    }

    /// Closes the browser and waits for the process to exit.
    pub async fn shutdown(&self) -> Result<(), EngineError> {
        let mut guard = self.browser.lock().await;
        if let Some(mut browser) = guard.take() {
            engine_debug!("closing chrome");
            browser
                .close()
                .await
                .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?;
            let _ = browser.wait().await;
        }
        self.handler_task.abort();
        Ok(())
    }
}

#[async_trait::async_trait]
impl Engine for ChromeEngine {
    async fn open_page(
        &self,
        job_id: JobId,
        console: Arc<dyn ConsoleSink>,
    ) -> Result<Arc<dyn EnginePage>, EngineError> {
        let page = {
            let guard = self.browser.lock().await;
            let browser = guard.as_ref().ok_or(EngineError::AlreadyClosed)?;
            browser
                .new_page("about:blank")
                .await
                .map_err(|e| EngineError::ConnectionFailed(e.to_string()))?
        };

        let mut events = page.event_listener::<EventConsoleApiCalled>().await?;
        let console_task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                console.emit(console_text(&event));
            }
        });

        engine_debug!("job {} opened tab", job_id);
        Ok(Arc::new(ChromePage {
            job_id,
            page,
            console_task,
        }))
    }
}

struct ChromePage {
    job_id: JobId,
    page: Page,
    console_task: JoinHandle<()>,
}

#[async_trait::async_trait]
impl EnginePage for ChromePage {
    async fn load(&self, url: &str) -> Result<(), EngineError> {
        self.page
            .goto(url)
            .await
            .map_err(|e| EngineError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn run_script(&self, source: &str) -> Result<(), EngineError> {
        self.page
            .evaluate(source)
            .await
            .map_err(|e| EngineError::ScriptExecutionFailed(e.to_string()))?;
        Ok(())
    }

    async fn serialize(&self) -> Result<String, EngineError> {
        self.page
            .content()
            .await
            .map_err(|e| EngineError::CaptureFailed(e.to_string()))
    }

    async fn print(&self, target: &Path, layout: &PageLayout) -> Result<(), EngineError> {
        let margin = layout.margin_in();
        let params = PrintToPdfParams::builder()
            .paper_width(layout.paper_width_in)
            .paper_height(layout.paper_height_in)
            .margin_top(margin)
            .margin_bottom(margin)
            .margin_left(margin)
            .margin_right(margin)
            .print_background(layout.print_background)
            .build();

        let bytes = self
            .page
            .pdf(params)
            .await
            .map_err(|e| EngineError::PrintFailed(e.to_string()))?;
        let size = bytes.len();
        write_atomic_blocking(target.to_path_buf(), bytes).await?;
        engine_debug!(
            "job {} wrote {} bytes of pdf to {}",
            self.job_id,
            size,
            target.display()
        );
        Ok(())
    }

    async fn close(&self) {
        self.console_task.abort();
        if let Err(e) = self.page.clone().close().await {
            engine_warn!("job {} could not close tab: {}", self.job_id, e);
        }
    }
}

/// Joins console arguments with spaces the way devtools displays them.
fn console_text(event: &EventConsoleApiCalled) -> String {
    event
        .args
        .iter()
        .map(|arg| match (&arg.value, &arg.description) {
            (Some(value), _) => match value.as_str() {
                Some(text) => text.to_string(),
                None => value.to_string(),
            },
            (None, Some(description)) => description.clone(),
            (None, None) => "<object>".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
