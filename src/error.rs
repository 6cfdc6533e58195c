// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("GET {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GET {url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The page no longer contains a usable flow table.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl FlowError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlowError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for the two kinds that mean the source could not be read.
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            FlowError::Fetch { .. } | FlowError::Status { .. } | FlowError::Parse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;
