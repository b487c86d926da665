use std::path::{Path, PathBuf};
use thiserror::Error;

use super::tracker::Origin;

/// Failure raised while resolving a single document of the inclusion tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolutionError {
    #[error(
        "duplicate file: {} found in {referrer}, was already loaded in {origin}",
        .path.display()
    )]
    DuplicateInclusion {
        path: PathBuf,
        referrer: Origin,
        origin: Origin,
    },

    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config file '{}': {source}", .path.display())]
    ReadFailure {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {source}", .path.display())]
    ParseFailure { path: PathBuf, source: ParseError },
}

impl ResolutionError {
    /// The file the failure is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::DuplicateInclusion { path, .. }
            | Self::NotFound(path)
            | Self::ReadFailure { path, .. }
            | Self::ParseFailure { path, .. } => path,
        }
    }
}

/// Decoding failure produced by a [`ConfigParser`](super::ConfigParser).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}
