use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::bout::{BoutDependencies, BoutError, BoutService};
use crate::bracket::{BracketError, BracketService, PollingMatchObserver};
use crate::event::EventBus;
use crate::identity::IdentityProvider;
use crate::matches::{MatchStore, StoreError};
use crate::ranking::RankingStore;
use crate::scoring::{ScoringError, WinnerResolver};

/// Clock tick period of live bouts
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub bout_service: Arc<BoutService>,
    pub bracket_service: Arc<BracketService>,
    pub match_store: Arc<dyn MatchStore>,
    pub ranking_store: Arc<dyn RankingStore>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(
        match_store: Arc<dyn MatchStore>,
        ranking_store: Arc<dyn RankingStore>,
        identity: Arc<dyn IdentityProvider>,
        resolver: WinnerResolver,
    ) -> Self {
        let event_bus = EventBus::new();

        let bout_service = Arc::new(BoutService::new(BoutDependencies {
            match_store: Arc::clone(&match_store),
            ranking_store: Arc::clone(&ranking_store),
            event_bus: event_bus.clone(),
            identity,
            resolver,
            tick_period: CLOCK_TICK,
        }));

        let bracket_service = Arc::new(BracketService::new(
            Arc::clone(&match_store),
            Arc::new(PollingMatchObserver::new(Arc::clone(&match_store))),
            event_bus.clone(),
        ));

        Self {
            bout_service,
            bracket_service,
            match_store,
            ranking_store,
            event_bus,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => AppError::NotFound(id),
            other => AppError::DatabaseError(other.to_string()),
        }
    }
}

impl From<ScoringError> for AppError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::InvalidDuration
            | ScoringError::InvalidBallot { .. }
            | ScoringError::EmptyPanel
            | ScoringError::TieIsNotADecision => AppError::BadRequest(err.to_string()),
            // The request was valid but the bout is in the wrong phase for it
            _ => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<BoutError> for AppError {
    fn from(err: BoutError) -> Self {
        match err {
            BoutError::Scoring(e) => e.into(),
            BoutError::Store(e) => e.into(),
            BoutError::Validation(msg) => AppError::BadRequest(msg),
            BoutError::NotFound(id) => AppError::NotFound(format!("bout {id}")),
        }
    }
}

impl From<BracketError> for AppError {
    fn from(err: BracketError) -> Self {
        match err {
            BracketError::Store(e) => e.into(),
            BracketError::NotFound(id) => AppError::NotFound(format!("bracket {id}")),
            BracketError::SlotNotFound { .. } => AppError::NotFound(err.to_string()),
            BracketError::SlotLocked { .. } => AppError::Conflict(err.to_string()),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
