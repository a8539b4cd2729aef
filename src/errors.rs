//! Typed error hierarchy for pagesmith.
//!
//! One enum per subsystem:
//! - `ConfigError` — environment loading at startup
//! - `CompletionError` — chat-completion calls (always absorbed by the generator)
//! - `AttachmentError` — a single attachment that could not be decoded or saved
//! - `PublishError` — GitHub repository, contents, and Pages calls
//! - `NotifyError` — the evaluation callback POST
//! - `LedgerError` — writing the processed-request log
//! - `PipelineError` — everything that can abort a background run

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Environment variable {var} is set but empty")]
    EmptyVar { var: &'static str },
}

/// Errors from the completion API.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Completion API returned no choices")]
    NoChoices,
}

/// Why a single attachment was not saved.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("data URI has no ',' separator")]
    MissingSeparator,

    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("attachment name {0:?} is not a plain file name")]
    UnsafeName(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the repository host.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("GitHub request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Repository {repo} has no commits")]
    NoCommits { repo: String },
}

/// Errors from the evaluation callback.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to POST notification to {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Errors from persisting the processed-request log.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Failed to serialize request log: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write request log at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Request log writer task failed: {0}")]
    Writer(#[from] tokio::task::JoinError),
}

/// Errors that abort a background pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Publication failed: {0}")]
    Publish(#[from] PublishError),

    #[error("Notification failed: {0}")]
    Notify(#[from] NotifyError),

    #[error("Request log write failed: {0}")]
    Ledger(#[from] LedgerError),
}
