//! Polling expectations over [`Locator`]s.

use crate::{Error, Locator, PageDriver, Result};
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Interval between two evaluations of a locator
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Visible,
    Hidden,
}

impl Condition {
    fn is_met(self, visible: usize) -> bool {
        match self {
            Condition::Visible => visible > 0,
            Condition::Hidden => visible == 0,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Visible => write!(f, "visible"),
            Condition::Hidden => write!(f, "hidden"),
        }
    }
}

/// Polls locators until a condition holds or a deadline passes
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    poll_interval: Duration,
}

impl Default for Waiter {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl Waiter {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub async fn expect_visible<D>(
        &self,
        driver: &mut D,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<()>
    where
        D: PageDriver + ?Sized,
    {
        self.wait_for(driver, locator, Condition::Visible, timeout)
            .await
    }

    pub async fn expect_hidden<D>(
        &self,
        driver: &mut D,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<()>
    where
        D: PageDriver + ?Sized,
    {
        self.wait_for(driver, locator, Condition::Hidden, timeout)
            .await
    }

    /// Wait until `condition` holds for `locator`.
    ///
    /// The locator is evaluated at least once, even with a zero timeout. A
    /// strict locator with several visible matches fails immediately when
    /// waiting for visibility.
    pub async fn wait_for<D>(
        &self,
        driver: &mut D,
        locator: &Locator,
        condition: Condition,
        timeout: Duration,
    ) -> Result<()>
    where
        D: PageDriver + ?Sized,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let visible = driver.visible_count(locator).await?;
            tracing::trace!("{} -> {} visible", locator, visible);

            if condition == Condition::Visible && locator.is_strict() && visible > 1 {
                return Err(Error::StrictMode {
                    locator: locator.to_string(),
                    count: visible,
                });
            }
            if condition.is_met(visible) {
                return Ok(());
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(Error::Timeout {
                    what: format!("{} to be {}", locator, condition),
                    after: timeout,
                });
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    /// Require that `locator` stays hidden for the whole `window`
    pub async fn expect_absent_for<D>(
        &self,
        driver: &mut D,
        locator: &Locator,
        window: Duration,
    ) -> Result<()>
    where
        D: PageDriver + ?Sized,
    {
        let deadline = Instant::now() + window;
        loop {
            if driver.visible_count(locator).await? > 0 {
                return Err(Error::UnexpectedlyVisible {
                    what: locator.to_string(),
                    window,
                });
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval.min(deadline - now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyChord;
    use async_trait::async_trait;

    /// Reports a fixed visible count once `appears_after` has elapsed
    struct DelayedDriver {
        started: Instant,
        appears_after: Duration,
        before: usize,
        after: usize,
        polls: usize,
    }

    impl DelayedDriver {
        fn new(appears_after: Duration, before: usize, after: usize) -> Self {
            Self {
                started: Instant::now(),
                appears_after,
                before,
                after,
                polls: 0,
            }
        }
    }

    #[async_trait]
    impl PageDriver for DelayedDriver {
        async fn navigate(&mut self, _url: &str) -> Result<()> {
            Ok(())
        }

        async fn visible_count(&mut self, _locator: &Locator) -> Result<usize> {
            self.polls += 1;
            if self.started.elapsed() >= self.appears_after {
                Ok(self.after)
            } else {
                Ok(self.before)
            }
        }

        async fn fill(&mut self, _locator: &Locator, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn press(&mut self, _locator: &Locator, _chord: &KeyChord) -> Result<()> {
            Ok(())
        }

        async fn focus(&mut self, _locator: &Locator) -> Result<()> {
            Ok(())
        }

        async fn blur(&mut self, _locator: &Locator) -> Result<()> {
            Ok(())
        }

        async fn click_at(&mut self, _x: f64, _y: f64) -> Result<()> {
            Ok(())
        }

        async fn keyboard_press(&mut self, _chord: &KeyChord) -> Result<()> {
            Ok(())
        }

        async fn editable_has_focus(&mut self) -> Result<bool> {
            Ok(false)
        }

        async fn screenshot(&mut self) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_expect_visible_waits_for_element() {
        let mut driver = DelayedDriver::new(Duration::from_millis(750), 0, 1);
        let waiter = Waiter::default();

        let started = Instant::now();
        waiter
            .expect_visible(&mut driver, &Locator::text("Undone"), Duration::from_secs(3))
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(750));
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(driver.polls > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expect_visible_times_out_at_deadline() {
        let mut driver = DelayedDriver::new(Duration::from_secs(60), 0, 1);
        let waiter = Waiter::default();

        let started = Instant::now();
        let err = waiter
            .expect_visible(&mut driver, &Locator::text("Undone"), Duration::from_secs(3))
            .await
            .unwrap_err();

        assert!(started.elapsed() >= Duration::from_secs(3));
        assert!(started.elapsed() < Duration::from_millis(3100));
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(err.to_string().contains("text=\"Undone\" to be visible"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_still_polls_once() {
        let mut driver = DelayedDriver::new(Duration::ZERO, 0, 1);
        let waiter = Waiter::default();

        waiter
            .expect_visible(&mut driver, &Locator::text("Today"), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(driver.polls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_locator_rejects_duplicates() {
        let mut driver = DelayedDriver::new(Duration::ZERO, 0, 2);
        let waiter = Waiter::default();

        let err = waiter
            .expect_visible(&mut driver, &Locator::text("Task"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StrictMode { count: 2, .. }));

        // first() accepts several matches
        waiter
            .expect_visible(&mut driver, &Locator::text("Task").first(), Duration::from_secs(5))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_expect_hidden_waits_for_removal() {
        let mut driver = DelayedDriver::new(Duration::from_millis(300), 1, 0);
        let waiter = Waiter::default();

        waiter
            .expect_hidden(&mut driver, &Locator::text("Task Undo Test"), Duration::from_secs(5))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_expect_absent_for_fails_when_element_shows_up() {
        let mut driver = DelayedDriver::new(Duration::from_secs(1), 0, 1);
        let waiter = Waiter::default();

        let err = waiter
            .expect_absent_for(&mut driver, &Locator::text("Undone"), Duration::from_secs(3))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedlyVisible { .. }));

        let mut quiet = DelayedDriver::new(Duration::from_secs(60), 0, 1);
        let started = Instant::now();
        waiter
            .expect_absent_for(&mut quiet, &Locator::text("Undone"), Duration::from_secs(3))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(3));
    }
}
