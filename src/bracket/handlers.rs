use axum::{
    extract::{Path, State},
    Json,
};
use tracing::{info, instrument};

use super::engine::{BracketConfig, BracketSnapshot};
use super::types::{
    AssignCompetitorRequest, AssignJudgeRequest, CreateMatchRequest, DrawRequest,
    OpenBracketRequest, RefreshResponse, ResetRequest, ResetResponse,
};
use crate::matches::MatchRecord;
use crate::scoring::BoutCategory;
use crate::shared::{AppError, AppState};

/// POST /brackets/:competition
///
/// Opens the bracket, rebuilding any progress already in the match store
#[instrument(name = "open_bracket", skip(state))]
pub async fn open_bracket(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<OpenBracketRequest>,
) -> Result<Json<BracketSnapshot>, AppError> {
    let mut config = BracketConfig::new(
        request.rounds,
        request.category.unwrap_or(BoutCategory::Senior),
    );
    config.legacy_pair_fallback = request.legacy_pair_fallback;

    let snapshot = state.bracket_service.open(&competition_id, config).await?;
    Ok(Json(snapshot))
}

/// GET /brackets/:competition
#[instrument(name = "get_bracket", skip(state))]
pub async fn get_bracket(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
) -> Result<Json<BracketSnapshot>, AppError> {
    Ok(Json(state.bracket_service.snapshot(&competition_id).await?))
}

/// POST /brackets/:competition/assign
#[instrument(name = "assign_competitor", skip(state))]
pub async fn assign_competitor(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<AssignCompetitorRequest>,
) -> Result<Json<BracketSnapshot>, AppError> {
    let snapshot = state
        .bracket_service
        .assign_competitor(
            &competition_id,
            request.round,
            request.position,
            request.competitor_id,
            request.side,
        )
        .await?;
    Ok(Json(snapshot))
}

/// POST /brackets/:competition/judge
#[instrument(name = "assign_judge", skip(state))]
pub async fn assign_judge(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<AssignJudgeRequest>,
) -> Result<Json<BracketSnapshot>, AppError> {
    let snapshot = state
        .bracket_service
        .assign_judge(&competition_id, request.round, request.position, request.judge_id)
        .await?;
    Ok(Json(snapshot))
}

/// POST /brackets/:competition/draw
#[instrument(name = "draw_bracket", skip(state))]
pub async fn draw(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<DrawRequest>,
) -> Result<Json<BracketSnapshot>, AppError> {
    let snapshot = state
        .bracket_service
        .draw(&competition_id, &request.athletes)
        .await?;
    Ok(Json(snapshot))
}

/// POST /brackets/:competition/matches
#[instrument(name = "create_bracket_match", skip(state))]
pub async fn create_match(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<CreateMatchRequest>,
) -> Result<Json<MatchRecord>, AppError> {
    let record = state
        .bracket_service
        .create_match(&competition_id, request.round, request.position)
        .await?;

    info!(match_id = %record.id, "Bracket match created");
    Ok(Json(record))
}

/// POST /brackets/:competition/refresh
#[instrument(name = "refresh_bracket", skip(state))]
pub async fn refresh(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
) -> Result<Json<RefreshResponse>, AppError> {
    let report = state.bracket_service.refresh(&competition_id).await?;
    let bracket = state.bracket_service.snapshot(&competition_id).await?;
    Ok(Json(RefreshResponse { report, bracket }))
}

/// POST /brackets/:competition/reset
#[instrument(name = "reset_bracket", skip(state, request))]
pub async fn reset(
    State(state): State<AppState>,
    Path(competition_id): Path<String>,
    Json(request): Json<ResetRequest>,
) -> Result<Json<ResetResponse>, AppError> {
    let deleted_matches = state
        .bracket_service
        .reset(&competition_id, &request.confirmation)
        .await?;
    Ok(Json(ResetResponse { deleted_matches }))
}
