use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::controller::BoutController;
use super::types::{
    BallotRequest, BoutResponse, CategoryRequest, ClockResetRequest, DeclareWinnerRequest,
    OpenBoutRequest, OverrideRequest, PenaltyRequest, PointRequest, ResolveResponse,
    UndoPointRequest,
};
use crate::scoring::ResultReason;
use crate::shared::{AppError, AppState};

async fn controller(state: &AppState, bout_id: &str) -> Result<Arc<BoutController>, AppError> {
    Ok(state.bout_service.get_or_attach(bout_id).await?)
}

async fn view(controller: &BoutController) -> Json<BoutResponse> {
    let session = controller.session();
    let session = session.read().await;
    Json(BoutResponse::from(&*session))
}

/// POST /bouts
#[instrument(name = "open_bout", skip(state))]
pub async fn open_bout(
    State(state): State<AppState>,
    Json(request): Json<OpenBoutRequest>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = state.bout_service.open_bout(request).await?;
    Ok(view(&controller).await)
}

/// GET /bouts/:id
#[instrument(name = "get_bout", skip(state))]
pub async fn get_bout(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/points
#[instrument(name = "add_point", skip(state))]
pub async fn add_point(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
    Json(request): Json<PointRequest>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller.add_point(request.side, request.technique).await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/points/undo
#[instrument(name = "subtract_point", skip(state))]
pub async fn subtract_point(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
    Json(request): Json<UndoPointRequest>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller.subtract_point(request.side).await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/penalties
#[instrument(name = "set_penalty", skip(state))]
pub async fn set_penalty(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
    Json(request): Json<PenaltyRequest>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller
        .set_penalty(request.side, request.category, request.flag, request.value)
        .await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/clock/start
#[instrument(name = "start_clock", skip(state))]
pub async fn start_clock(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller.start_clock().await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/clock/pause
#[instrument(name = "pause_clock", skip(state))]
pub async fn pause_clock(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller.pause_clock().await;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/clock/toggle
#[instrument(name = "toggle_clock", skip(state))]
pub async fn toggle_clock(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller.toggle_clock().await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/clock/reset
#[instrument(name = "reset_clock", skip(state))]
pub async fn reset_clock(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
    Json(request): Json<ClockResetRequest>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller.reset_clock(request.duration_seconds).await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/category
#[instrument(name = "set_category", skip(state))]
pub async fn set_category(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
    Json(request): Json<CategoryRequest>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller.set_category(request.category).await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/resolve
///
/// Decides by points, or opens a Hantei vote when totals are level
#[instrument(name = "resolve_bout", skip(state))]
pub async fn resolve(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
) -> Result<Json<ResolveResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    let outcome = controller.resolve().await?;
    let Json(bout) = view(&controller).await;
    state.bout_service.release_finalized(&bout_id).await;
    Ok(Json(ResolveResponse { outcome, bout }))
}

/// POST /bouts/:id/hantei/ballots
#[instrument(name = "cast_ballot", skip(state))]
pub async fn cast_ballot(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
    Json(request): Json<BallotRequest>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller
        .cast_ballot(request.judge_index, request.ballot)
        .await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/hantei/override
#[instrument(name = "set_hantei_override", skip(state))]
pub async fn set_hantei_override(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
    Json(request): Json<OverrideRequest>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller
        .set_hantei_override(request.side, request.value)
        .await?;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/hantei/confirm
#[instrument(name = "confirm_hantei", skip(state))]
pub async fn confirm_hantei(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
) -> Result<Json<ResolveResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    let outcome = controller.confirm_hantei().await?;
    let Json(bout) = view(&controller).await;
    state.bout_service.release_finalized(&bout_id).await;
    Ok(Json(ResolveResponse { outcome, bout }))
}

/// POST /bouts/:id/winner
#[instrument(name = "declare_winner", skip(state))]
pub async fn declare_winner(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
    Json(request): Json<DeclareWinnerRequest>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    let reason = request.reason.unwrap_or(ResultReason::ByDirectDecision);
    let result = controller.declare_winner(request.side, reason).await?;

    info!(bout_id = %bout_id, winner_id = ?result.winner_id(), "Winner declared");
    state.bout_service.release_finalized(&bout_id).await;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/finalize
///
/// Retries writing a pending result after a store failure
#[instrument(name = "finalize_bout", skip(state))]
pub async fn finalize(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller.finalize().await?;
    state.bout_service.release_finalized(&bout_id).await;
    Ok(view(&controller).await)
}

/// POST /bouts/:id/withdraw
#[instrument(name = "withdraw_result", skip(state))]
pub async fn withdraw(
    State(state): State<AppState>,
    Path(bout_id): Path<String>,
) -> Result<Json<BoutResponse>, AppError> {
    let controller = controller(&state, &bout_id).await?;
    controller.withdraw_pending().await?;
    Ok(view(&controller).await)
}
