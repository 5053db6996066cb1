use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not find a configuration directory")]
    NoConfigDir,

    #[error("Failed to access settings file: {0}")]
    SettingsIo(#[from] io::Error),

    #[error("Failed to (de)serialize settings: {0}")]
    SettingsFormat(#[from] serde_json::Error),

    #[error("No Discord application id configured")]
    MissingAppId,

    #[error("Invalid Discord application id: {0}")]
    InvalidAppId(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to fetch map manifest: {0}")]
    Manifest(#[source] reqwest::Error),

    #[error("Presence sink unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Presence sink handshake timed out")]
    SinkTimeout,
}

pub type Result<T> = std::result::Result<T, Error>;
