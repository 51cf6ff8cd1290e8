//! Error types for the behavioral prober

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Server failed to start: {0}")]
    ServerStartup(String),

    #[error("Site at {url} unreachable after {attempts} attempts")]
    Unreachable { url: String, attempts: usize },

    #[error("Playwright driver not available: {0}. Install with: npm install playwright && npx playwright install")]
    DriverNotFound(String),

    #[error("Playwright driver failed to launch: {0}")]
    DriverLaunch(String),

    #[error("Playwright driver exited unexpectedly")]
    DriverClosed,

    #[error("Probe failed: {0}")]
    Driver(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ProbeResult<T> = Result<T, ProbeError>;
