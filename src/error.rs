// Typed errors for the two stages whose callers need to tell failure causes
// apart. Everything else uses `anyhow` with context strings.

use std::path::PathBuf;
use thiserror::Error;

/// Failures talking to the AnkiConnect endpoint.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not connect to Anki at {0}")]
    Unreachable(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("AnkiConnect returned an error: {0}")]
    Api(String),
    #[error("response missing 'result' field")]
    MissingResult,
    #[error("unexpected response shape: {0}")]
    Decode(String),
    #[error("deck name must not be empty")]
    InvalidDeck,
}

impl FetchError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, FetchError::Unreachable(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            let url = err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "unknown endpoint".into());
            FetchError::Unreachable(url)
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Failures while driving git in the repository.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to change working directory to {path}: {source}")]
    WorkingDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}
