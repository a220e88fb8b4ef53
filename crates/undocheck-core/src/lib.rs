pub mod driver;
pub mod error;
pub mod keys;
pub mod locator;
pub mod phase;
pub mod report;
pub mod screenshot;
pub mod verifier;
pub mod wait;

pub use driver::PageDriver;
pub use error::{Error, Result};
pub use keys::{Key, KeyChord, Modifiers};
pub use locator::Locator;
pub use phase::{FailureKind, Phase, PhaseOutcome, PhaseRecord};
pub use report::{Report, ReportWriter};
pub use screenshot::ScreenshotSink;
pub use verifier::{Scenario, UndoVerifier, VerifyConfig};
