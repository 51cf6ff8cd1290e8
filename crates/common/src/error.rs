//! Error types for siteqa

use thiserror::Error;

/// Result type alias using the siteqa Error
pub type Result<T> = std::result::Result<T, Error>;

/// siteqa error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Profile parse error in {path}: {source}")]
    ProfileParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}
