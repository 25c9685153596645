//! Error types shared by every crate in the workspace.
//!
//! Callers branch on [`FinderError::kind`] instead of matching on message
//! text.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while discovering, fetching, normalizing or scoring critics
///
/// Each variant carries the structured context of the failure (the url that
/// was requested, the raw input that did not parse, the file that could not
/// be opened) rather than a pre-formatted message.
#[derive(Error, Debug)]
pub enum FinderError {
    /// A request to the web source failed or returned a non-success status
    #[error("request to {url} failed: {reason}")]
    Transport {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// A payload or a rating did not match any accepted shape
    #[error("could not parse {subject} '{input}': {reason}")]
    Parse {
        subject: String,
        input: String,
        reason: String,
    },

    /// A file could not be opened, created, read or written
    #[error("storage failure at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The run cannot start (missing input listing, output dir not creatable)
    #[error("setup failed for {resource}: {reason}")]
    Setup { resource: String, reason: String },
}

/// Coarse classification of a [`FinderError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Parse,
    Storage,
    Setup,
}

impl FinderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FinderError::Transport { .. } => ErrorKind::Transport,
            FinderError::Parse { .. } => ErrorKind::Parse,
            FinderError::Storage { .. } => ErrorKind::Storage,
            FinderError::Setup { .. } => ErrorKind::Setup,
        }
    }

    pub fn transport(url: impl Into<String>, status: Option<u16>, reason: impl Into<String>) -> Self {
        FinderError::Transport {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// A rating that matches neither the numeric nor the letter-grade form
    pub fn unclassified_rating(raw: impl Into<String>) -> Self {
        FinderError::Parse {
            subject: "rating".to_string(),
            input: raw.into(),
            reason: "matches neither a numeric nor a letter-grade notation".to_string(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FinderError::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn setup(resource: impl Into<String>, reason: impl ToString) -> Self {
        FinderError::Setup {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// Re-label a storage failure on a required input as a setup failure
    pub fn into_setup(self) -> Self {
        match self {
            FinderError::Storage { path, source } => FinderError::Setup {
                resource: path.display().to_string(),
                reason: source.to_string(),
            },
            other => other,
        }
    }
}

/// Convenience type alias for Results in this workspace
pub type Result<T> = std::result::Result<T, FinderError>;
