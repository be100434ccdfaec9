use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::errors::BracketError;
use super::slot::{BracketSlot, SlotState};
use crate::matches::{MatchFilter, MatchRecord, MatchState, MatchStore, NewMatch, SlotKey};
use crate::scoring::{BoutCategory, Side};

/// Largest supported bracket: 1024 opening places
pub const MAX_ROUNDS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketConfig {
    pub rounds: u32,
    pub category: BoutCategory,
    /// Join unlinked slots to records by competitor pair. Off unless a
    /// competition predates slot links on match records.
    pub legacy_pair_fallback: bool,
}

impl BracketConfig {
    pub fn new(rounds: u32, category: BoutCategory) -> Self {
        Self {
            rounds,
            category,
            legacy_pair_fallback: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advancement {
    pub from: SlotKey,
    pub to: SlotKey,
    pub competitor_id: String,
}

/// What a reconcile pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub started: Vec<SlotKey>,
    pub finalized: Vec<SlotKey>,
    pub advanced: Vec<Advancement>,
    /// Advancement targets whose side was already taken by someone else
    pub blocked: Vec<SlotKey>,
}

impl ReconcileReport {
    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
            && self.finalized.is_empty()
            && self.advanced.is_empty()
            && self.blocked.is_empty()
    }
}

/// Read-only view for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSnapshot {
    pub competition_id: String,
    pub rounds: u32,
    pub category: BoutCategory,
    pub slots: Vec<BracketSlot>,
    pub champion: Option<String>,
}

impl BracketSnapshot {
    pub fn slot(&self, round: u32, position: u32) -> Option<&BracketSlot> {
        self.slots
            .iter()
            .find(|s| s.round == round && s.position == position)
    }
}

/// Single-elimination bracket for one competition.
///
/// Slot state only moves forward from what the match store reports; the
/// engine never writes results itself.
pub struct BracketEngine {
    competition_id: String,
    config: BracketConfig,
    store: Arc<dyn MatchStore>,
    slots: BTreeMap<SlotKey, BracketSlot>,
}

impl BracketEngine {
    /// Creates every slot of the tree empty: round `r` has `2^(rounds-r)` slots
    pub fn new(
        competition_id: impl Into<String>,
        config: BracketConfig,
        store: Arc<dyn MatchStore>,
    ) -> Result<Self, BracketError> {
        if config.rounds == 0 || config.rounds > MAX_ROUNDS {
            return Err(BracketError::InvalidRounds {
                rounds: config.rounds,
                max: MAX_ROUNDS,
            });
        }

        let mut slots = BTreeMap::new();
        for round in 1..=config.rounds {
            let count = 1u32 << (config.rounds - round);
            for position in 1..=count {
                slots.insert(
                    SlotKey::new(round, position),
                    BracketSlot::new(round, position),
                );
            }
        }

        Ok(Self {
            competition_id: competition_id.into(),
            config,
            store,
            slots,
        })
    }

    /// Rebuilds the bracket from the match records tagged with the competition
    #[instrument(skip(store))]
    pub async fn load(
        competition_id: &str,
        config: BracketConfig,
        store: Arc<dyn MatchStore>,
    ) -> Result<Self, BracketError> {
        let records = store
            .list_matches(&MatchFilter::for_competition(competition_id))
            .await?;
        let mut engine = Self::new(competition_id, config, store)?;

        for record in &records {
            let Some(key) = record.slot else {
                continue;
            };
            if record.state == MatchState::Cancelled {
                continue;
            }
            let Some(slot) = engine.slots.get_mut(&key) else {
                warn!(
                    match_id = %record.id,
                    round = key.round,
                    position = key.position,
                    "Stored match points outside the bracket"
                );
                continue;
            };

            slot.competitor1 = Some(record.competitor1_id.clone());
            slot.competitor2 = Some(record.competitor2_id.clone());
            slot.assigned_judge = record.judge_id.clone();
            slot.linked_match_id = Some(record.id.clone());
            slot.state = SlotState::InProgress;
        }

        let report = engine.reconcile(&records);
        info!(
            competition_id = %competition_id,
            records = records.len(),
            finalized = report.finalized.len(),
            "Bracket loaded from match store"
        );
        Ok(engine)
    }

    pub fn competition_id(&self) -> &str {
        &self.competition_id
    }

    pub fn config(&self) -> &BracketConfig {
        &self.config
    }

    pub fn slot(&self, round: u32, position: u32) -> Option<&BracketSlot> {
        self.slots.get(&SlotKey::new(round, position))
    }

    /// Opening round capacity in athletes
    pub fn capacity(&self) -> usize {
        2 * (1usize << (self.config.rounds - 1))
    }

    fn slot_mut(&mut self, round: u32, position: u32) -> Result<&mut BracketSlot, BracketError> {
        self.slots
            .get_mut(&SlotKey::new(round, position))
            .ok_or(BracketError::SlotNotFound { round, position })
    }

    fn editable_slot_mut(
        &mut self,
        round: u32,
        position: u32,
    ) -> Result<&mut BracketSlot, BracketError> {
        let slot = self.slot_mut(round, position)?;
        if !slot.is_editable() {
            return Err(BracketError::SlotLocked { round, position });
        }
        Ok(slot)
    }

    /// Puts an athlete on one side of an opening round slot. `None` clears it.
    pub fn assign_competitor(
        &mut self,
        round: u32,
        position: u32,
        competitor_id: Option<String>,
        side: Side,
    ) -> Result<(), BracketError> {
        if round != 1 {
            return Err(BracketError::NotOpeningRound(round));
        }
        let slot = self.editable_slot_mut(round, position)?;

        if let Some(id) = &competitor_id {
            if slot.competitor(side.opposite()) == Some(id.as_str()) {
                return Err(BracketError::SameCompetitorBothSides(id.clone()));
            }
        }

        *slot.competitor_mut(side) = competitor_id;
        Ok(())
    }

    pub fn assign_judge(
        &mut self,
        round: u32,
        position: u32,
        judge_id: Option<String>,
    ) -> Result<(), BracketError> {
        let slot = self.editable_slot_mut(round, position)?;
        slot.assigned_judge = judge_id;
        Ok(())
    }

    pub fn draw(&mut self, athletes: &[String]) -> Result<(), BracketError> {
        self.draw_with_rng(athletes, &mut rand::rng())
    }

    /// Places athletes into the opening round in random order, filling each
    /// slot's competitor1 then competitor2. Replaces any manual assignment.
    pub fn draw_with_rng<R: Rng + ?Sized>(
        &mut self,
        athletes: &[String],
        rng: &mut R,
    ) -> Result<(), BracketError> {
        let capacity = self.capacity();
        if athletes.len() > capacity {
            return Err(BracketError::DrawOverCapacity {
                athletes: athletes.len(),
                capacity,
            });
        }

        let mut seen = HashSet::new();
        for athlete in athletes {
            if !seen.insert(athlete.as_str()) {
                return Err(BracketError::DuplicateAthlete(athlete.clone()));
            }
        }

        if let Some(locked) = self
            .slots
            .values()
            .find(|s| s.round == 1 && !s.is_editable())
        {
            return Err(BracketError::SlotLocked {
                round: locked.round,
                position: locked.position,
            });
        }

        let mut order = athletes.to_vec();
        order.shuffle(rng);
        let mut order = order.into_iter();

        for slot in self.slots.values_mut().filter(|s| s.round == 1) {
            slot.competitor1 = order.next();
            slot.competitor2 = order.next();
        }

        info!(
            competition_id = %self.competition_id,
            athletes = athletes.len(),
            "Opening round drawn"
        );
        Ok(())
    }

    /// Creates the match record for a slot. The slot links to it only once
    /// the store has confirmed the write.
    #[instrument(skip(self), fields(competition_id = %self.competition_id))]
    pub async fn create_match(
        &mut self,
        round: u32,
        position: u32,
    ) -> Result<MatchRecord, BracketError> {
        let category = self.config.category;
        let competition_id = self.competition_id.clone();

        let slot = self.editable_slot_mut(round, position)?;
        let (Some(competitor1_id), Some(competitor2_id)) =
            (slot.competitor1.clone(), slot.competitor2.clone())
        else {
            return Err(BracketError::MissingCompetitor { round, position });
        };
        let new_match = NewMatch {
            competition_id: Some(competition_id),
            slot: Some(slot.key()),
            competitor1_id,
            competitor2_id,
            judge_id: slot.assigned_judge.clone(),
            category: category.to_string(),
            duration_seconds: category.duration_seconds(),
            scheduled_at: Utc::now(),
        };

        let record = self.store.create_match(new_match).await?;

        let slot = self.slot_mut(round, position)?;
        slot.linked_match_id = Some(record.id.clone());
        slot.state = SlotState::InProgress;

        info!(match_id = %record.id, round, position, "Match created for slot");
        Ok(record)
    }

    fn find_record<'a>(
        &self,
        slot: &BracketSlot,
        records: &'a [MatchRecord],
    ) -> Option<&'a MatchRecord> {
        if let Some(link) = &slot.linked_match_id {
            return records.iter().find(|r| &r.id == link);
        }
        if !self.config.legacy_pair_fallback {
            return None;
        }

        let (Some(one), Some(two)) = (&slot.competitor1, &slot.competitor2) else {
            return None;
        };
        let mut candidates = records.iter().filter(|r| r.has_pair(one, two));
        let first = candidates.next()?;
        if candidates.next().is_some() {
            warn!(
                round = slot.round,
                position = slot.position,
                match_id = %first.id,
                "Several records share this competitor pair, taking the first"
            );
        }
        Some(first)
    }

    /// Applies observed match records to the slots and advances winners.
    ///
    /// Finalized slots are never revisited and an occupied advancement side
    /// is never overwritten, so running this repeatedly on the same records
    /// changes nothing after the first pass.
    #[instrument(skip(self, records), fields(competition_id = %self.competition_id, records = records.len()))]
    pub fn reconcile(&mut self, records: &[MatchRecord]) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let keys: Vec<SlotKey> = self.slots.keys().copied().collect();

        for key in keys {
            let Some(slot) = self.slots.get(&key) else {
                continue;
            };
            if slot.is_finalized() {
                continue;
            }
            let Some(record) = self.find_record(slot, records) else {
                continue;
            };
            let legacy_link = !slot.is_linked();

            match record.state {
                MatchState::Scheduled | MatchState::InProgress => {
                    let Some(slot) = self.slots.get_mut(&key) else {
                        continue;
                    };
                    if legacy_link {
                        slot.linked_match_id = Some(record.id.clone());
                    }
                    if slot.state == SlotState::Pending {
                        slot.state = SlotState::InProgress;
                        report.started.push(key);
                    }
                }
                MatchState::Finalized => {
                    let Some(winner) = record.winner_id.clone() else {
                        warn!(match_id = %record.id, "Finalized match has no winner");
                        continue;
                    };
                    if !slot.has_competitor(&winner) {
                        warn!(
                            match_id = %record.id,
                            winner_id = %winner,
                            "Stored winner is not in the slot, ignoring"
                        );
                        continue;
                    }

                    let Some(slot) = self.slots.get_mut(&key) else {
                        continue;
                    };
                    if legacy_link {
                        slot.linked_match_id = Some(record.id.clone());
                    }
                    slot.winner = Some(winner.clone());
                    slot.final_score = Some((record.score1, record.score2));
                    slot.state = SlotState::Finalized;
                    report.finalized.push(key);

                    let (next, side) = (slot.next_key(), slot.feeds_side());
                    self.advance(key, next, side, winner, &mut report);
                }
                MatchState::Cancelled => {
                    debug!(match_id = %record.id, "Linked match was cancelled");
                }
            }
        }

        if !report.is_empty() {
            info!(
                started = report.started.len(),
                finalized = report.finalized.len(),
                advanced = report.advanced.len(),
                blocked = report.blocked.len(),
                "Bracket reconciled"
            );
        }
        report
    }

    fn advance(
        &mut self,
        from: SlotKey,
        to: SlotKey,
        side: Side,
        winner: String,
        report: &mut ReconcileReport,
    ) {
        // Final round winner has nowhere to go
        let Some(target) = self.slots.get_mut(&to) else {
            return;
        };

        match target.competitor(side) {
            None if target.competitor(side.opposite()) != Some(winner.as_str()) => {
                *target.competitor_mut(side) = Some(winner.clone());
                report.advanced.push(Advancement {
                    from,
                    to,
                    competitor_id: winner,
                });
            }
            Some(existing) if existing == winner => {}
            _ => {
                warn!(
                    round = to.round,
                    position = to.position,
                    winner_id = %winner,
                    "Advancement side already taken, keeping existing competitor"
                );
                report.blocked.push(to);
            }
        }
    }

    /// Wipes the bracket and every stored match of the competition. The
    /// confirmation must repeat the competition id.
    #[instrument(skip(self), fields(competition_id = %self.competition_id))]
    pub async fn reset(&mut self, confirmation: &str) -> Result<u64, BracketError> {
        if confirmation != self.competition_id {
            return Err(BracketError::ConfirmationMismatch);
        }

        let deleted = self
            .store
            .delete_competition_matches(&self.competition_id)
            .await?;
        for slot in self.slots.values_mut() {
            slot.clear();
        }

        info!(deleted, "Bracket reset");
        Ok(deleted)
    }

    pub fn champion(&self) -> Option<&str> {
        self.slot(self.config.rounds, 1)
            .and_then(|s| s.winner.as_deref())
    }

    pub fn snapshot(&self) -> BracketSnapshot {
        BracketSnapshot {
            competition_id: self.competition_id.clone(),
            rounds: self.config.rounds,
            category: self.config.category,
            slots: self.slots.values().cloned().collect(),
            champion: self.champion().map(str::to_string),
        }
    }
}
