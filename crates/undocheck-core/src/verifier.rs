//! Scripted end-to-end checks of the task journal's undo feature.
//!
//! A run walks the phases of a [`Scenario`] in order. Each phase is a hard
//! precondition for the next one: the first failure is recorded with a
//! diagnostic screenshot and every later phase is marked as skipped. The
//! caller always gets a [`Report`] back, never a bare error.

use crate::wait::Waiter;
use crate::{
    Error, Key, KeyChord, Locator, Modifiers, PageDriver, Phase, PhaseOutcome, PhaseRecord,
    Report, Result, ScreenshotSink,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_URL: &str = "http://localhost:5173";
pub const DEFAULT_TASK_TITLE: &str = "Task Undo Test";
pub const DEFAULT_INPUT_ID: &str = "main-bullet-editor-input";
pub const DEFAULT_HEADINGS: [&str; 2] = ["Last Task", "Today"];
pub const DEFAULT_TOAST_TEXT: &str = "Undone";
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_TOAST_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// Add a task, undo it, expect the notification and the task gone
    Undo,
    /// Undo chord sent while the editor has focus must be ignored
    FocusGuard,
}

impl Scenario {
    pub fn phases(self) -> &'static [Phase] {
        match self {
            Scenario::Undo => &[
                Phase::Load,
                Phase::AddTask,
                Phase::ReleaseFocus,
                Phase::Undo,
                Phase::VerifyRemoved,
            ],
            Scenario::FocusGuard => &[Phase::Load, Phase::AddTask, Phase::GuardedShortcut],
        }
    }

    pub fn success_screenshot_name(self) -> &'static str {
        match self {
            Scenario::Undo => "verification_undo_success.png",
            Scenario::FocusGuard => "verification_focus_guard_success.png",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Undo => "undo",
            Scenario::FocusGuard => "focus-guard",
        }
    }
}

/// Everything a run needs to know about the application under test
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    pub url: String,
    pub task_title: String,
    /// `id` attribute of the task editor input
    pub input_id: String,
    /// Any of these inside an `h1` means the app finished loading
    pub heading_texts: Vec<String>,
    pub toast_text: String,
    pub undo_chord: KeyChord,
    pub load_timeout: Duration,
    pub expect_timeout: Duration,
    pub toast_timeout: Duration,
    /// Pause between releasing focus and sending the undo chord
    pub settle: Duration,
    pub poll_interval: Duration,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            task_title: DEFAULT_TASK_TITLE.to_string(),
            input_id: DEFAULT_INPUT_ID.to_string(),
            heading_texts: DEFAULT_HEADINGS.iter().map(|h| h.to_string()).collect(),
            toast_text: DEFAULT_TOAST_TEXT.to_string(),
            undo_chord: KeyChord::new(Modifiers::CONTROL, Key::Char('z')),
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            expect_timeout: DEFAULT_EXPECT_TIMEOUT,
            toast_timeout: DEFAULT_TOAST_TIMEOUT,
            settle: DEFAULT_SETTLE,
            poll_interval: crate::wait::DEFAULT_POLL_INTERVAL,
        }
    }
}

impl VerifyConfig {
    /// First visible `h1` carrying any of the expected heading texts
    pub fn heading_locator(&self) -> Locator {
        let mut texts = self.heading_texts.iter();
        let first = match texts.next() {
            Some(text) => Locator::css_with_text("h1", text.as_str()),
            None => Locator::css("h1"),
        };
        texts
            .fold(first, |acc, text| {
                acc.or(Locator::css_with_text("h1", text.as_str()))
            })
            .first()
    }

    pub fn input_locator(&self) -> Locator {
        Locator::id(self.input_id.as_str())
    }

    pub fn task_locator(&self) -> Locator {
        Locator::text(self.task_title.as_str())
    }

    pub fn toast_locator(&self) -> Locator {
        Locator::text(self.toast_text.as_str())
    }
}

pub struct UndoVerifier<'a, D: PageDriver + ?Sized> {
    driver: &'a mut D,
    config: VerifyConfig,
    sink: ScreenshotSink,
    waiter: Waiter,
}

impl<'a, D: PageDriver + ?Sized> UndoVerifier<'a, D> {
    pub fn new(driver: &'a mut D, config: VerifyConfig, sink: ScreenshotSink) -> Self {
        let waiter = Waiter::new(config.poll_interval);
        Self {
            driver,
            config,
            sink,
            waiter,
        }
    }

    /// Run every phase of `scenario` and collect the outcome
    pub async fn run(&mut self, scenario: Scenario) -> Report {
        let started_at = Utc::now();
        let clock = Instant::now();
        tracing::info!("Running {} scenario against {}", scenario.as_str(), self.config.url);

        let mut phases = Vec::with_capacity(scenario.phases().len());
        let mut failed = false;

        for &phase in scenario.phases() {
            if failed {
                phases.push(PhaseRecord::skipped(phase));
                continue;
            }

            let phase_clock = Instant::now();
            let result = self.run_phase(phase).await;
            let duration_ms = phase_clock.elapsed().as_millis() as u64;

            match result {
                Ok(()) => {
                    tracing::debug!("Phase {} passed in {}ms", phase, duration_ms);
                    phases.push(PhaseRecord {
                        phase,
                        outcome: PhaseOutcome::Passed,
                        duration_ms,
                        screenshot: None,
                    });
                }
                Err(e) => {
                    let kind = phase.failure_kind();
                    tracing::error!("{} during {}: {} ({})", kind, phase, kind.description(), e);
                    let screenshot = self
                        .sink
                        .capture(&mut *self.driver, phase.screenshot_name())
                        .await;
                    phases.push(PhaseRecord {
                        phase,
                        outcome: PhaseOutcome::Failed {
                            kind,
                            detail: e.to_string(),
                        },
                        duration_ms,
                        screenshot,
                    });
                    failed = true;
                }
            }
        }

        let success_screenshot = if failed {
            None
        } else {
            tracing::info!("Success! Taking screenshot.");
            self.sink
                .capture(&mut *self.driver, scenario.success_screenshot_name())
                .await
        };

        Report {
            scenario,
            url: self.config.url.clone(),
            started_at,
            duration_ms: clock.elapsed().as_millis() as u64,
            phases,
            success_screenshot,
        }
    }

    async fn run_phase(&mut self, phase: Phase) -> Result<()> {
        match phase {
            Phase::Load => self.load().await,
            Phase::AddTask => self.add_task().await,
            Phase::ReleaseFocus => self.release_focus().await,
            Phase::Undo => self.undo().await,
            Phase::VerifyRemoved => self.verify_removed().await,
            Phase::GuardedShortcut => self.guarded_shortcut().await,
        }
    }

    async fn load(&mut self) -> Result<()> {
        tracing::info!("Navigating to app...");
        self.driver.navigate(&self.config.url).await?;

        tracing::info!(
            "Waiting for {}...",
            self.config
                .heading_texts
                .iter()
                .map(|h| format!("'{}'", h))
                .collect::<Vec<_>>()
                .join(" or ")
        );
        self.waiter
            .expect_visible(
                &mut *self.driver,
                &self.config.heading_locator(),
                self.config.load_timeout,
            )
            .await
    }

    async fn add_task(&mut self) -> Result<()> {
        tracing::info!("Adding task '{}'...", self.config.task_title);
        let input = self.config.input_locator();
        self.driver.fill(&input, &self.config.task_title).await?;
        self.driver
            .press(&input, &KeyChord::key(Key::Enter))
            .await?;

        tracing::info!("Verifying task added...");
        self.waiter
            .expect_visible(
                &mut *self.driver,
                &self.config.task_locator(),
                self.config.expect_timeout,
            )
            .await
    }

    async fn release_focus(&mut self) -> Result<()> {
        tracing::info!("Blurring input...");
        self.driver.blur(&self.config.input_locator()).await?;
        // Neutral spot on the body so that no editable keeps focus
        self.driver.click_at(0.0, 0.0).await?;

        tokio::time::sleep(self.config.settle).await;

        if self.driver.editable_has_focus().await? {
            return Err(Error::Assertion(
                "an editable element still holds focus; the undo shortcut would be swallowed"
                    .to_string(),
            ));
        }
        let toast = self.config.toast_locator();
        if self.driver.visible_count(&toast).await? > 0 {
            return Err(Error::Assertion(format!(
                "{} is visible before the undo shortcut was sent",
                toast
            )));
        }
        Ok(())
    }

    async fn undo(&mut self) -> Result<()> {
        tracing::info!("Pressing {}...", self.config.undo_chord);
        self.driver.keyboard_press(&self.config.undo_chord).await?;

        tracing::info!("Verifying toast...");
        self.waiter
            .expect_visible(
                &mut *self.driver,
                &self.config.toast_locator(),
                self.config.toast_timeout,
            )
            .await?;
        tracing::info!("Toast appeared!");
        Ok(())
    }

    async fn verify_removed(&mut self) -> Result<()> {
        tracing::info!("Verifying task removed...");
        self.waiter
            .expect_hidden(
                &mut *self.driver,
                &self.config.task_locator(),
                self.config.expect_timeout,
            )
            .await
    }

    async fn guarded_shortcut(&mut self) -> Result<()> {
        tracing::info!("Focusing input...");
        self.driver.focus(&self.config.input_locator()).await?;
        if !self.driver.editable_has_focus().await? {
            return Err(Error::Assertion(
                "editor input did not take focus".to_string(),
            ));
        }

        tracing::info!("Pressing {} inside the editor...", self.config.undo_chord);
        self.driver.keyboard_press(&self.config.undo_chord).await?;

        tracing::info!("Verifying no toast...");
        self.waiter
            .expect_absent_for(
                &mut *self.driver,
                &self.config.toast_locator(),
                self.config.toast_timeout,
            )
            .await?;

        let task = self.config.task_locator();
        if self.driver.visible_count(&task).await? == 0 {
            return Err(Error::Assertion(format!(
                "{} disappeared although the shortcut should have been ignored",
                task
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_app_contract() {
        let config = VerifyConfig::default();

        assert_eq!(config.url, "http://localhost:5173");
        assert_eq!(config.task_title, "Task Undo Test");
        assert_eq!(config.undo_chord.to_string(), "Control+z");
        assert_eq!(config.load_timeout, Duration::from_secs(10));
        assert_eq!(config.toast_timeout, Duration::from_secs(3));
        assert_eq!(config.settle, Duration::from_millis(500));
    }

    #[test]
    fn test_heading_locator_is_first_of_both_variants() {
        let heading = VerifyConfig::default().heading_locator();

        assert!(!heading.is_strict());
        assert_eq!(
            heading.to_string(),
            "h1:has-text(\"Last Task\"), h1:has-text(\"Today\") >> first"
        );
    }

    #[test]
    fn test_scenario_phase_plans() {
        assert_eq!(Scenario::Undo.phases().len(), 5);
        assert_eq!(Scenario::Undo.phases().last(), Some(&Phase::VerifyRemoved));
        assert_eq!(
            Scenario::FocusGuard.phases(),
            &[Phase::Load, Phase::AddTask, Phase::GuardedShortcut]
        );
    }
}
