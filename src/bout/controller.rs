use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, instrument, warn};

use super::errors::BoutError;
use super::session::{BoutSessionState, ResolveOutcome};
use super::ticker::ClockTicker;
use crate::event::{CompetitionEvent, EventBus};
use crate::identity::IdentityProvider;
use crate::matches::{MatchResultUpdate, MatchState, MatchStore};
use crate::ranking::RankingStore;
use crate::scoring::{
    Ballot, BoutCategory, BoutResult, PenaltyCategory, PenaltyFlag, ResultReason, ScoringError,
    Side, Technique, WinnerResolver,
};

/// Collaborators shared by every bout controller
#[derive(Clone)]
pub struct BoutDependencies {
    pub match_store: Arc<dyn MatchStore>,
    pub ranking_store: Arc<dyn RankingStore>,
    pub event_bus: EventBus,
    pub identity: Arc<dyn IdentityProvider>,
    pub resolver: WinnerResolver,
    pub tick_period: Duration,
}

/// Single owner of one bout's live state.
///
/// UI bindings get the session handle for reading; every change goes
/// through the controller so clock ticking and store writes stay in step.
pub struct BoutController {
    session: Arc<RwLock<BoutSessionState>>,
    deps: BoutDependencies,
    ticker: ClockTicker,
    store_lock: Mutex<()>,
}

impl BoutController {
    pub fn new(session: BoutSessionState, deps: BoutDependencies) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            deps,
            ticker: ClockTicker::new(),
            store_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> Arc<RwLock<BoutSessionState>> {
        Arc::clone(&self.session)
    }

    pub async fn snapshot(&self) -> BoutSessionState {
        self.session.read().await.clone()
    }

    pub async fn bout_id(&self) -> String {
        self.session.read().await.bout_id().to_string()
    }

    pub async fn add_point(&self, side: Side, technique: Technique) -> Result<u32, BoutError> {
        Ok(self.session.write().await.add_point(side, technique)?)
    }

    pub async fn subtract_point(&self, side: Side) -> Result<Option<Technique>, BoutError> {
        Ok(self.session.write().await.subtract_point(side)?)
    }

    pub async fn set_penalty(
        &self,
        side: Side,
        category: PenaltyCategory,
        flag: PenaltyFlag,
        value: bool,
    ) -> Result<(), BoutError> {
        Ok(self
            .session
            .write()
            .await
            .set_penalty(side, category, flag, value)?)
    }

    /// Starts the clock. The first start also marks the match in progress in
    /// the store; the clock only runs once that write succeeded. Nothing is
    /// written when the bout cannot start.
    #[instrument(skip(self))]
    pub async fn start_clock(&self) -> Result<bool, BoutError> {
        let _guard = self.store_lock.lock().await;

        let (bout_id, needs_store_update) = {
            let session = self.session.read().await;
            if !session.can_start_clock()? {
                return Ok(false);
            }
            (session.bout_id().to_string(), !session.started_in_store())
        };

        if needs_store_update {
            self.deps
                .match_store
                .update_state(&bout_id, MatchState::InProgress)
                .await
                .map_err(|e| {
                    warn!(bout_id = %bout_id, error = %e, "Failed to mark match in progress");
                    e
                })?;
            self.session.write().await.mark_started_in_store();
        }

        let started = self.session.write().await.start_clock()?;
        if started {
            self.ticker
                .start(self.session(), self.deps.tick_period)
                .await;
            info!(bout_id = %bout_id, "Match clock started");
        }
        Ok(started)
    }

    pub async fn pause_clock(&self) -> bool {
        self.ticker.stop().await;
        self.session.write().await.pause_clock()
    }

    pub async fn toggle_clock(&self) -> Result<bool, BoutError> {
        let running = self.session.read().await.clock().is_running();
        if running {
            Ok(self.pause_clock().await)
        } else {
            self.start_clock().await
        }
    }

    pub async fn reset_clock(&self, new_duration: Option<u32>) -> Result<(), BoutError> {
        self.ticker.stop().await;
        Ok(self.session.write().await.reset_clock(new_duration)?)
    }

    /// Switches category in the store first, then on the live clock
    #[instrument(skip(self))]
    pub async fn set_category(&self, category: BoutCategory) -> Result<(), BoutError> {
        let _guard = self.store_lock.lock().await;

        let bout_id = {
            let session = self.session.read().await;
            session.can_change_category()?;
            session.bout_id().to_string()
        };

        self.deps
            .match_store
            .update_category(&bout_id, category.as_ref(), category.duration_seconds())
            .await?;

        self.session.write().await.set_category(category)?;
        info!(bout_id = %bout_id, category = %category, "Bout category changed");
        Ok(())
    }

    /// Resolve by points. A decided bout is finalized straight away.
    pub async fn resolve(&self) -> Result<ResolveOutcome, BoutError> {
        let outcome = self
            .session
            .write()
            .await
            .resolve(&self.deps.resolver)?;
        self.after_outcome(outcome).await
    }

    pub async fn cast_ballot(&self, judge_index: usize, ballot: Ballot) -> Result<(), BoutError> {
        Ok(self
            .session
            .write()
            .await
            .cast_ballot(judge_index, ballot)?)
    }

    pub async fn set_hantei_override(&self, side: Side, value: bool) -> Result<(), BoutError> {
        Ok(self
            .session
            .write()
            .await
            .set_hantei_override(side, value)?)
    }

    pub async fn confirm_hantei(&self) -> Result<ResolveOutcome, BoutError> {
        let outcome = self.session.write().await.confirm_hantei()?;
        self.after_outcome(outcome).await
    }

    /// Direct decision (e.g. kiken, shikkaku), available at any time
    pub async fn declare_winner(
        &self,
        side: Side,
        reason: ResultReason,
    ) -> Result<BoutResult, BoutError> {
        self.session.write().await.declare_winner(side, reason)?;
        self.ticker.stop().await;
        self.finalize().await
    }

    pub async fn withdraw_pending(&self) -> Result<BoutResult, BoutError> {
        Ok(self.session.write().await.withdraw_pending()?)
    }

    async fn after_outcome(&self, outcome: ResolveOutcome) -> Result<ResolveOutcome, BoutError> {
        match outcome {
            ResolveOutcome::Declared { .. } => {
                self.ticker.stop().await;
                let result = self.finalize().await?;
                Ok(ResolveOutcome::Declared { result })
            }
            ResolveOutcome::HanteiRequired { .. } => {
                self.ticker.stop().await;
                Ok(outcome)
            }
            ResolveOutcome::UnresolvedTie { votes1, votes2 } => {
                warn!(votes1, votes2, "Hantei ballots level, panel must vote again");
                Ok(outcome)
            }
        }
    }

    /// Writes the pending result to the match store.
    ///
    /// On a store failure the pending result stays in place and the error is
    /// recorded for display; calling `finalize` again retries. Calling it on
    /// an already finalized bout returns the stored result without repeating
    /// any side effect.
    #[instrument(skip(self))]
    pub async fn finalize(&self) -> Result<BoutResult, BoutError> {
        let _guard = self.store_lock.lock().await;

        let (participants, pending) = {
            let session = self.session.read().await;
            if let Some(result) = session.result() {
                return Ok(result.clone());
            }
            let pending = session
                .pending_result()
                .cloned()
                .ok_or(ScoringError::NoPendingResult)?;
            (session.participants().clone(), pending)
        };

        let winner_id = pending
            .winner_id()
            .map(str::to_string)
            .ok_or(ScoringError::TieIsNotADecision)?;
        let (score1, score2) = pending.final_score();

        let update = MatchResultUpdate {
            winner_id: winner_id.clone(),
            result_reason: pending.reason(),
            score1,
            score2,
        };

        if let Err(e) = self
            .deps
            .match_store
            .record_result(&participants.bout_id, &update)
            .await
        {
            error!(bout_id = %participants.bout_id, error = %e, "Failed to store bout result");
            self.session.write().await.record_error(e.to_string());
            return Err(e.into());
        }

        let result = self.session.write().await.mark_finalized()?;
        let recorded_by = self.deps.identity.acting_judge();

        info!(
            bout_id = %participants.bout_id,
            winner_id = %winner_id,
            reason = %result.reason(),
            score1,
            score2,
            recorded_by = ?recorded_by,
            "Bout finalized"
        );

        let loser_id = if winner_id == participants.competitor1_id {
            &participants.competitor2_id
        } else {
            &participants.competitor1_id
        };
        self.update_rankings(&winner_id, loser_id).await;

        if let Some(competition_id) = &participants.competition_id {
            self.deps
                .event_bus
                .emit(
                    competition_id,
                    CompetitionEvent::BoutFinalized {
                        match_id: participants.bout_id.clone(),
                        winner_id,
                        reason: result.reason(),
                        final_score: result.final_score(),
                        recorded_by,
                    },
                )
                .await;
        }

        Ok(result)
    }

    // Rankings are derived data; a failure here does not undo the stored result
    async fn update_rankings(&self, winner_id: &str, loser_id: &str) {
        let ranking = &self.deps.ranking_store;
        if let Err(e) = ranking.record_result(winner_id, loser_id).await {
            error!(winner_id, loser_id, error = %e, "Failed to record ranking result");
            return;
        }
        if let Err(e) = ranking.recalculate_positions().await {
            error!(error = %e, "Failed to recalculate ranking positions");
        }
    }
}
