use crate::{KeyChord, Locator, Result};
use async_trait::async_trait;

/// Browser page operations the verifier relies on.
///
/// Implementations own exactly one page. Locators are resolved against the
/// live document on every call.
#[async_trait]
pub trait PageDriver: Send {
    /// Navigate to `url` and wait for the initial document
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Number of elements matching `locator` that are currently visible
    async fn visible_count(&mut self, locator: &Locator) -> Result<usize>;

    /// Replace the content of the first match with `text`
    async fn fill(&mut self, locator: &Locator, text: &str) -> Result<()>;

    /// Focus the first match and press `chord` on it
    async fn press(&mut self, locator: &Locator, chord: &KeyChord) -> Result<()>;

    /// Give input focus to the first match
    async fn focus(&mut self, locator: &Locator) -> Result<()>;

    /// Remove focus from the first match
    async fn blur(&mut self, locator: &Locator) -> Result<()>;

    /// Left click at viewport coordinates
    async fn click_at(&mut self, x: f64, y: f64) -> Result<()>;

    /// Press `chord` on whatever currently has focus
    async fn keyboard_press(&mut self, chord: &KeyChord) -> Result<()>;

    /// Whether an input, textarea or contenteditable holds focus
    async fn editable_has_focus(&mut self) -> Result<bool>;

    /// PNG capture of the current viewport
    async fn screenshot(&mut self) -> Result<Vec<u8>>;
}
