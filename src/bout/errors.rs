use thiserror::Error;

use crate::matches::StoreError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum BoutError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("Match store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bout not found: {0}")]
    NotFound(String),
}
