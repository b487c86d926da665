use crate::config::ResolutionError;
use thiserror::Error;

/// Top-level error type for envfold.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("failed to write exports: {0}")]
    Output(#[from] std::io::Error),
}
