use crate::{BrowserSession, Error, ProfileDir, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

const WINDOW_SIZE: (u32, u32) = (1280, 720);

/// Builds and starts a Chrome instance driven over CDP
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile: ProfileDir,
    headless: bool,
    sandbox: bool,
    request_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf, profile: ProfileDir) -> Self {
        Self {
            chrome_path,
            profile,
            headless: true,
            sandbox: true,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Show the browser window
    pub fn headed(mut self, headed: bool) -> Self {
        self.headless = !headed;
        self
    }

    /// Needed when running as root inside containers
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Upper bound for each CDP command round-trip
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Extra command-line switches on top of chromiumoxide's defaults
    fn build_args(&self) -> Vec<String> {
        vec![
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--lang=en-US".to_string(),
        ]
    }

    fn build_config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(self.profile.path())
            .window_size(WINDOW_SIZE.0, WINDOW_SIZE.1)
            .request_timeout(self.request_timeout)
            .args(self.build_args());

        if !self.headless {
            builder = builder.with_head();
        }
        if !self.sandbox {
            builder = builder.no_sandbox();
        }

        builder.build().map_err(Error::Browser)
    }

    /// Start Chrome and open a blank page.
    ///
    /// The CDP handler runs on its own task for the lifetime of the session;
    /// without it no command ever gets a response.
    pub async fn launch(self) -> Result<BrowserSession> {
        let config = self.build_config()?;
        tracing::info!(
            "Launching Chrome at {} ({})",
            self.chrome_path.display(),
            if self.headless { "headless" } else { "headed" }
        );

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e.into());
            }
        };
        tracing::debug!("CDP: page created");

        Ok(BrowserSession::new(browser, handler_task, page, self.profile))
    }
}
