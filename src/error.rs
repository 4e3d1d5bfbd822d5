//! Crate-wide error type.
//!
//! Nothing in the switcher is fatal once the daemon is running: collectors
//! swallow these into empty results and the dispatcher turns them into
//! `error: ...` response strings. They only surface to the user during
//! startup (config loading, socket binding).

use std::io;
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwitcherError>;

#[derive(Debug, Error)]
pub enum SwitcherError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("`{command}` exited with {status}: {stderr}")]
    Process {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("invalid command: {0}")]
    InvalidCommand(String),
    #[error("transport error: {0}")]
    Transport(String),
}
