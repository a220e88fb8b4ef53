//! Chromium-backed implementation of [`undocheck_core::PageDriver`].

mod chrome_finder;
mod error;
mod input;
mod launcher;
mod profile;
mod session;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::ChromeLauncher;
pub use profile::ProfileDir;
pub use session::BrowserSession;
