use serde::{Deserialize, Serialize};

use crate::matches::{MatchRecord, MatchState};
use crate::scoring::{
    Ballot, BoutCategory, BoutResult, BoutScore, ClockState, HanteiOutcome, HanteiVote,
    MatchClock, PenaltyCategory, PenaltyFlag, PenaltyTracker, Resolution, ResultReason,
    ScoringError, Side, Technique, WinnerResolver,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutParticipants {
    pub bout_id: String,
    pub competition_id: Option<String>,
    pub competitor1_id: String,
    pub competitor2_id: String,
    pub judge_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoutPhase {
    Scoring,
    /// Totals were level on resolve; the panel is voting
    Hantei,
    /// A winner is declared and waiting to be written to the store
    AwaitingConfirmation,
    Finalized,
}

/// Result of asking the resolver for a winner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolveOutcome {
    Declared { result: BoutResult },
    HanteiRequired { judges: usize },
    /// Hantei confirmed with level ballots; vote again
    UnresolvedTie { votes1: u32, votes2: u32 },
}

/// Everything the judge console shows for one live bout.
///
/// All mutation goes through these methods so the freeze and finalize rules
/// hold no matter which binding calls in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoutSessionState {
    participants: BoutParticipants,
    category: String,
    score: BoutScore,
    penalties1: PenaltyTracker,
    penalties2: PenaltyTracker,
    clock: MatchClock,
    hantei: Option<HanteiVote>,
    pending_result: Option<BoutResult>,
    result: Option<BoutResult>,
    started_in_store: bool,
    last_error: Option<String>,
}

impl BoutSessionState {
    pub fn new(participants: BoutParticipants, category: BoutCategory) -> Self {
        Self {
            participants,
            category: category.to_string(),
            score: BoutScore::new(),
            penalties1: PenaltyTracker::new(),
            penalties2: PenaltyTracker::new(),
            clock: MatchClock::for_category(category),
            hantei: None,
            pending_result: None,
            result: None,
            started_in_store: false,
            last_error: None,
        }
    }

    /// Session for an existing match record. A finalized record comes back as
    /// a finalized session carrying the stored result.
    pub fn from_record(record: &MatchRecord) -> Result<Self, ScoringError> {
        let participants = BoutParticipants {
            bout_id: record.id.clone(),
            competition_id: record.competition_id.clone(),
            competitor1_id: record.competitor1_id.clone(),
            competitor2_id: record.competitor2_id.clone(),
            judge_id: record.judge_id.clone(),
        };

        let result = match (record.state, &record.winner_id, record.result_reason) {
            (MatchState::Finalized, Some(winner_id), Some(reason)) => Some(BoutResult::decided(
                winner_id.clone(),
                reason,
                (record.score1, record.score2),
            )),
            _ => None,
        };

        Ok(Self {
            participants,
            category: record.category.clone(),
            score: BoutScore::new(),
            penalties1: PenaltyTracker::new(),
            penalties2: PenaltyTracker::new(),
            clock: MatchClock::new(record.duration_seconds)?,
            hantei: None,
            pending_result: None,
            result,
            started_in_store: record.state != MatchState::Scheduled,
            last_error: None,
        })
    }

    pub fn participants(&self) -> &BoutParticipants {
        &self.participants
    }

    pub fn bout_id(&self) -> &str {
        &self.participants.bout_id
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn score(&self) -> &BoutScore {
        &self.score
    }

    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    pub fn penalties(&self, side: Side) -> &PenaltyTracker {
        match side {
            Side::Competitor1 => &self.penalties1,
            Side::Competitor2 => &self.penalties2,
        }
    }

    pub fn hantei(&self) -> Option<&HanteiVote> {
        self.hantei.as_ref()
    }

    pub fn pending_result(&self) -> Option<&BoutResult> {
        self.pending_result.as_ref()
    }

    pub fn result(&self) -> Option<&BoutResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn started_in_store(&self) -> bool {
        self.started_in_store
    }

    pub fn phase(&self) -> BoutPhase {
        if self.result.is_some() {
            BoutPhase::Finalized
        } else if self.pending_result.is_some() {
            BoutPhase::AwaitingConfirmation
        } else if self.hantei.is_some() {
            BoutPhase::Hantei
        } else {
            BoutPhase::Scoring
        }
    }

    pub fn competitor_id(&self, side: Side) -> &str {
        match side {
            Side::Competitor1 => &self.participants.competitor1_id,
            Side::Competitor2 => &self.participants.competitor2_id,
        }
    }

    pub fn side_of(&self, competitor_id: &str) -> Option<Side> {
        if competitor_id == self.participants.competitor1_id {
            Some(Side::Competitor1)
        } else if competitor_id == self.participants.competitor2_id {
            Some(Side::Competitor2)
        } else {
            None
        }
    }

    fn ensure_not_finalized(&self) -> Result<(), ScoringError> {
        if self.result.is_some() {
            return Err(ScoringError::BoutFinalized);
        }
        Ok(())
    }

    fn ensure_scoring_open(&self) -> Result<(), ScoringError> {
        self.ensure_not_finalized()?;
        if self.pending_result.is_some() {
            return Err(ScoringError::ScoreFrozen);
        }
        Ok(())
    }

    pub fn add_point(&mut self, side: Side, technique: Technique) -> Result<u32, ScoringError> {
        self.ensure_scoring_open()?;
        self.score.add_point(side, technique);
        // A vote taken on the old totals no longer applies
        self.hantei = None;
        Ok(self.score.total(side))
    }

    pub fn subtract_point(&mut self, side: Side) -> Result<Option<Technique>, ScoringError> {
        self.ensure_scoring_open()?;
        let removed = self.score.subtract_point(side);
        if removed.is_some() {
            self.hantei = None;
        }
        Ok(removed)
    }

    pub fn set_penalty(
        &mut self,
        side: Side,
        category: PenaltyCategory,
        flag: PenaltyFlag,
        value: bool,
    ) -> Result<(), ScoringError> {
        self.ensure_not_finalized()?;
        let tracker = match side {
            Side::Competitor1 => &mut self.penalties1,
            Side::Competitor2 => &mut self.penalties2,
        };
        tracker.set_flag(category, flag, value);
        Ok(())
    }

    /// Whether a start request would run the clock. Fails when the bout no
    /// longer accepts scoring.
    pub fn can_start_clock(&self) -> Result<bool, ScoringError> {
        self.ensure_scoring_open()?;
        Ok(matches!(
            self.clock.state(),
            ClockState::Idle | ClockState::Paused
        ))
    }

    pub fn start_clock(&mut self) -> Result<bool, ScoringError> {
        self.ensure_scoring_open()?;
        Ok(self.clock.start())
    }

    pub fn pause_clock(&mut self) -> bool {
        self.clock.pause()
    }

    pub fn tick_clock(&mut self) -> u32 {
        self.clock.tick()
    }

    pub fn reset_clock(&mut self, new_duration: Option<u32>) -> Result<(), ScoringError> {
        self.ensure_scoring_open()?;
        self.clock.reset(new_duration)
    }

    /// The clock must be stopped and scoring open to switch category
    pub fn can_change_category(&self) -> Result<(), ScoringError> {
        self.ensure_scoring_open()?;
        if self.clock.is_running() {
            return Err(ScoringError::ClockRunning);
        }
        Ok(())
    }

    pub fn set_category(&mut self, category: BoutCategory) -> Result<(), ScoringError> {
        self.ensure_scoring_open()?;
        self.clock.set_category(category)?;
        self.category = category.to_string();
        Ok(())
    }

    pub fn mark_started_in_store(&mut self) {
        self.started_in_store = true;
    }

    /// Points decide, or a Hantei vote opens when totals are level. An open
    /// vote is kept with its ballots.
    pub fn resolve(&mut self, resolver: &WinnerResolver) -> Result<ResolveOutcome, ScoringError> {
        self.ensure_scoring_open()?;
        if let Some(vote) = &self.hantei {
            return Ok(ResolveOutcome::HanteiRequired {
                judges: vote.ballots().len(),
            });
        }

        match resolver.resolve(&self.score)? {
            Resolution::Decided(decision) => {
                let result = self.declare_winner(decision.winner, decision.reason)?;
                Ok(ResolveOutcome::Declared { result })
            }
            Resolution::Hantei(vote) => {
                let judges = vote.ballots().len();
                self.clock.pause();
                self.hantei = Some(vote);
                Ok(ResolveOutcome::HanteiRequired { judges })
            }
        }
    }

    fn hantei_mut(&mut self) -> Result<&mut HanteiVote, ScoringError> {
        self.ensure_scoring_open()?;
        self.hantei.as_mut().ok_or(ScoringError::NoPendingHantei)
    }

    pub fn cast_ballot(&mut self, judge_index: usize, ballot: Ballot) -> Result<(), ScoringError> {
        self.hantei_mut()?.cast(judge_index, ballot)
    }

    pub fn set_hantei_override(&mut self, side: Side, value: bool) -> Result<(), ScoringError> {
        self.hantei_mut()?.set_override(side, value);
        Ok(())
    }

    /// Level ballots leave the vote open so the panel can vote again
    pub fn confirm_hantei(&mut self) -> Result<ResolveOutcome, ScoringError> {
        let outcome = self.hantei_mut()?.confirm();

        match outcome {
            HanteiOutcome::Decided { winner, reason } => {
                let result = self.declare_winner(winner, reason)?;
                Ok(ResolveOutcome::Declared { result })
            }
            HanteiOutcome::UnresolvedTie { votes1, votes2 } => {
                Ok(ResolveOutcome::UnresolvedTie { votes1, votes2 })
            }
        }
    }

    /// Declare a winner directly, at any point of the bout. Stops the clock
    /// and freezes the score until the result is finalized or withdrawn.
    pub fn declare_winner(
        &mut self,
        side: Side,
        reason: ResultReason,
    ) -> Result<BoutResult, ScoringError> {
        self.ensure_not_finalized()?;
        if reason == ResultReason::Tie {
            return Err(ScoringError::TieIsNotADecision);
        }

        self.clock.pause();
        self.hantei = None;

        let result = BoutResult::decided(
            self.competitor_id(side).to_string(),
            reason,
            self.score.totals(),
        );
        self.pending_result = Some(result.clone());
        Ok(result)
    }

    /// Close the result dialog without finalizing; scoring resumes
    pub fn withdraw_pending(&mut self) -> Result<BoutResult, ScoringError> {
        self.ensure_not_finalized()?;
        self.last_error = None;
        self.pending_result
            .take()
            .ok_or(ScoringError::NoPendingResult)
    }

    /// Promote the pending result after the store accepted it
    pub fn mark_finalized(&mut self) -> Result<BoutResult, ScoringError> {
        self.ensure_not_finalized()?;
        let result = self
            .pending_result
            .take()
            .ok_or(ScoringError::NoPendingResult)?;
        self.result = Some(result.clone());
        self.started_in_store = true;
        self.last_error = None;
        Ok(result)
    }

    pub fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> BoutSessionState {
        BoutSessionState::new(
            BoutParticipants {
                bout_id: "bout-1".to_string(),
                competition_id: Some("cup".to_string()),
                competitor1_id: "aka".to_string(),
                competitor2_id: "ao".to_string(),
                judge_id: Some("judge-1".to_string()),
            },
            BoutCategory::Senior,
        )
    }

    #[test]
    fn test_resolve_by_points_declares_pending_result() {
        let mut session = session();
        session.start_clock().unwrap();
        session
            .add_point(Side::Competitor1, Technique::Ippon)
            .unwrap();

        let outcome = session.resolve(&WinnerResolver::default()).unwrap();
        let ResolveOutcome::Declared { result } = outcome else {
            panic!("expected a declared result");
        };

        assert_eq!(result.winner_id(), Some("aka"));
        assert_eq!(result.reason(), ResultReason::ByPoints);
        assert_eq!(result.final_score(), (3, 0));
        assert_eq!(session.phase(), BoutPhase::AwaitingConfirmation);
        assert!(!session.clock().is_running());
        assert!(session.hantei().is_none());
    }

    #[test]
    fn test_pending_result_freezes_score() {
        let mut session = session();
        session
            .declare_winner(Side::Competitor2, ResultReason::ByDirectDecision)
            .unwrap();

        assert_eq!(
            session.add_point(Side::Competitor1, Technique::Yuko),
            Err(ScoringError::ScoreFrozen)
        );
        assert_eq!(
            session.subtract_point(Side::Competitor2),
            Err(ScoringError::ScoreFrozen)
        );
        assert_eq!(session.start_clock(), Err(ScoringError::ScoreFrozen));

        session.withdraw_pending().unwrap();
        assert_eq!(
            session.add_point(Side::Competitor1, Technique::Yuko),
            Ok(1)
        );
    }

    #[test]
    fn test_tie_opens_hantei_and_level_vote_stays_open() {
        let mut session = session();
        session
            .add_point(Side::Competitor1, Technique::Wazaari)
            .unwrap();
        session
            .add_point(Side::Competitor2, Technique::Wazaari)
            .unwrap();

        let outcome = session.resolve(&WinnerResolver::default()).unwrap();
        assert_eq!(outcome, ResolveOutcome::HanteiRequired { judges: 5 });
        assert_eq!(session.phase(), BoutPhase::Hantei);
        assert!(session.pending_result().is_none());

        session.cast_ballot(0, Ballot::Competitor1).unwrap();
        session.cast_ballot(1, Ballot::Competitor2).unwrap();

        let outcome = session.confirm_hantei().unwrap();
        assert_eq!(
            outcome,
            ResolveOutcome::UnresolvedTie {
                votes1: 1,
                votes2: 1
            }
        );
        assert_eq!(session.phase(), BoutPhase::Hantei);

        session.cast_ballot(2, Ballot::Competitor2).unwrap();
        let ResolveOutcome::Declared { result } = session.confirm_hantei().unwrap() else {
            panic!("expected a declared result");
        };
        assert_eq!(result.winner_id(), Some("ao"));
        assert_eq!(result.reason(), ResultReason::ByHanteiDecision);
    }

    #[test]
    fn test_score_change_discards_stale_vote() {
        let mut session = session();
        session.resolve(&WinnerResolver::default()).unwrap();
        assert!(session.hantei().is_some());

        session
            .add_point(Side::Competitor2, Technique::Yuko)
            .unwrap();
        assert!(session.hantei().is_none());
        assert_eq!(
            session.cast_ballot(0, Ballot::Competitor1),
            Err(ScoringError::NoPendingHantei)
        );
    }

    #[test]
    fn test_resolve_again_keeps_cast_ballots() {
        let mut session = session();
        session.resolve(&WinnerResolver::default()).unwrap();
        session.cast_ballot(0, Ballot::Competitor2).unwrap();

        let outcome = session.resolve(&WinnerResolver::default()).unwrap();
        assert_eq!(outcome, ResolveOutcome::HanteiRequired { judges: 5 });
        assert_eq!(
            session.hantei().unwrap().ballots()[0],
            Ballot::Competitor2
        );
    }

    #[test]
    fn test_start_check_follows_phase_and_clock() {
        let mut session = session();
        assert_eq!(session.can_start_clock(), Ok(true));

        session.start_clock().unwrap();
        assert_eq!(session.can_start_clock(), Ok(false));
        assert_eq!(
            session.can_change_category(),
            Err(ScoringError::ClockRunning)
        );

        session
            .declare_winner(Side::Competitor1, ResultReason::ByDirectDecision)
            .unwrap();
        assert_eq!(session.can_start_clock(), Err(ScoringError::ScoreFrozen));

        session.mark_finalized().unwrap();
        assert!(session.started_in_store());
        assert_eq!(session.can_start_clock(), Err(ScoringError::BoutFinalized));
    }

    #[test]
    fn test_direct_decision_ignores_points() {
        let mut session = session();
        session
            .add_point(Side::Competitor1, Technique::Ippon)
            .unwrap();
        session.set_penalty(
            Side::Competitor1,
            PenaltyCategory::Category2,
            PenaltyFlag::Shikkaku,
            true,
        )
        .unwrap();

        let result = session
            .declare_winner(Side::Competitor2, ResultReason::ByDirectDecision)
            .unwrap();
        assert_eq!(result.winner_id(), Some("ao"));
        assert_eq!(result.final_score(), (3, 0));
        assert!(session.penalties(Side::Competitor1).has_disqualification());
    }

    #[test]
    fn test_tie_reason_cannot_be_declared() {
        let mut session = session();
        assert_eq!(
            session.declare_winner(Side::Competitor1, ResultReason::Tie),
            Err(ScoringError::TieIsNotADecision)
        );
    }

    #[test]
    fn test_penalties_do_not_touch_score() {
        let mut session = session();
        session
            .add_point(Side::Competitor2, Technique::Wazaari)
            .unwrap();
        session
            .set_penalty(
                Side::Competitor2,
                PenaltyCategory::Category1,
                PenaltyFlag::Hansoku,
                true,
            )
            .unwrap();

        assert_eq!(session.score().totals(), (0, 2));
    }

    #[test]
    fn test_finalized_session_rejects_changes() {
        let mut session = session();
        session
            .declare_winner(Side::Competitor1, ResultReason::ByPoints)
            .unwrap();
        session.mark_finalized().unwrap();

        assert_eq!(session.phase(), BoutPhase::Finalized);
        assert_eq!(
            session.add_point(Side::Competitor1, Technique::Yuko),
            Err(ScoringError::BoutFinalized)
        );
        assert_eq!(
            session.declare_winner(Side::Competitor2, ResultReason::ByDirectDecision),
            Err(ScoringError::BoutFinalized)
        );
    }

    #[test]
    fn test_category_change_resets_clock() {
        let mut session = session();
        session.start_clock().unwrap();
        assert_eq!(
            session.set_category(BoutCategory::Cadet),
            Err(ScoringError::ClockRunning)
        );

        session.pause_clock();
        session.set_category(BoutCategory::Cadet).unwrap();
        assert_eq!(session.clock().remaining_seconds(), 90);
        assert_eq!(session.clock().state(), ClockState::Idle);
        assert_eq!(session.category(), "cadet");
    }
}
