use crate::input::{click_events, key_events};
use crate::{Error, ProfileDir, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::input::InsertTextParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use serde_json::Value;
use tokio::task::JoinHandle;
use undocheck_core::locator::EDITABLE_FOCUS_SCRIPT;
use undocheck_core::{Key, KeyChord, Locator, PageDriver};

/// A launched browser with the single page under test.
///
/// Call [`BrowserSession::close`] on every exit path. Dropping without
/// closing still stops the CDP handler and lets chromiumoxide kill the
/// child process.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    _profile: ProfileDir,
}

impl BrowserSession {
    pub(crate) fn new(
        browser: Browser,
        handler_task: JoinHandle<()>,
        page: Page,
        profile: ProfileDir,
    ) -> Self {
        Self {
            browser,
            handler_task,
            page,
            _profile: profile,
        }
    }

    /// Close the browser and wait for the process to exit
    pub async fn close(mut self) -> Result<()> {
        tracing::debug!("Closing browser");
        self.browser.close().await?;
        self.browser.wait().await?;
        self.handler_task.abort();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl PageDriver for BrowserSession {
    async fn navigate(&mut self, url: &str) -> undocheck_core::Result<()> {
        tracing::debug!("CDP: navigating to {}", url);
        self.page.goto(url).await.map_err(Error::from)?;
        Ok(())
    }

    async fn visible_count(&mut self, locator: &Locator) -> undocheck_core::Result<usize> {
        let value = eval(&self.page, locator.visible_count_script()).await?;
        let count = value.as_u64().ok_or_else(|| {
            Error::Cdp(format!("Expected a count for {}, got {}", locator, value))
        })?;
        Ok(count as usize)
    }

    async fn fill(&mut self, locator: &Locator, text: &str) -> undocheck_core::Result<()> {
        eval_on_match(&self.page, locator, locator.focus_script(true)).await?;
        if text.is_empty() {
            dispatch_chord(&self.page, &KeyChord::key(Key::Delete)).await?;
        } else {
            // Replaces the selection and fires the same input events typing would
            self.page
                .execute(InsertTextParams::new(text))
                .await
                .map_err(Error::from)?;
        }
        Ok(())
    }

    async fn press(&mut self, locator: &Locator, chord: &KeyChord) -> undocheck_core::Result<()> {
        eval_on_match(&self.page, locator, locator.focus_script(false)).await?;
        dispatch_chord(&self.page, chord).await?;
        Ok(())
    }

    async fn focus(&mut self, locator: &Locator) -> undocheck_core::Result<()> {
        eval_on_match(&self.page, locator, locator.focus_script(false)).await?;
        Ok(())
    }

    async fn blur(&mut self, locator: &Locator) -> undocheck_core::Result<()> {
        eval_on_match(&self.page, locator, locator.blur_script()).await?;
        Ok(())
    }

    async fn click_at(&mut self, x: f64, y: f64) -> undocheck_core::Result<()> {
        for event in click_events(x, y)? {
            self.page.execute(event).await.map_err(Error::from)?;
        }
        Ok(())
    }

    async fn keyboard_press(&mut self, chord: &KeyChord) -> undocheck_core::Result<()> {
        dispatch_chord(&self.page, chord).await?;
        Ok(())
    }

    async fn editable_has_focus(&mut self) -> undocheck_core::Result<bool> {
        let value = eval(&self.page, EDITABLE_FOCUS_SCRIPT.to_string()).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn screenshot(&mut self) -> undocheck_core::Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let png = self.page.screenshot(params).await.map_err(Error::from)?;
        Ok(png)
    }
}

async fn eval(page: &Page, script: String) -> Result<Value> {
    let result = page.evaluate(script).await?;
    result
        .into_value::<Value>()
        .map_err(|e| Error::Cdp(format!("Unexpected evaluation result: {}", e)))
}

/// Run a locator script that reports whether it found an element
async fn eval_on_match(page: &Page, locator: &Locator, script: String) -> Result<()> {
    match eval(page, script).await? {
        Value::Bool(true) => Ok(()),
        _ => Err(Error::Browser(format!("No element matches {}", locator))),
    }
}

async fn dispatch_chord(page: &Page, chord: &KeyChord) -> Result<()> {
    for event in key_events(chord)? {
        page.execute(event).await?;
    }
    Ok(())
}
