use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Timed out after {}ms waiting for {what}", after.as_millis())]
    Timeout { what: String, after: Duration },

    #[error("Strict mode violation: {locator} resolved to {count} visible elements")]
    StrictMode { locator: String, count: usize },

    #[error("{what} became visible within {}ms", window.as_millis())]
    UnexpectedlyVisible { what: String, window: Duration },

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Invalid key chord: {0}")]
    InvalidChord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
