use crate::games::types::{BetCategory, BetSelection, RoomId, UserId, Wager};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoundPhase {
    /// Accepting bets
    Open,
    /// Bets closed, ball in motion
    Spinning,
    /// Paid out; the round is about to be discarded
    Settled,
}

/// The in-memory state of one room's round
#[derive(Debug, Clone)]
pub struct RoundState {
    room: RoomId,
    phase: RoundPhase,
    bets: BTreeMap<BetCategory, Vec<Wager>>,
}

impl RoundState {
    pub fn new(room: RoomId) -> Self {
        Self {
            room,
            phase: RoundPhase::Open,
            bets: BTreeMap::new(),
        }
    }

    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == RoundPhase::Open
    }

    /// Close betting. Returns false if the round had already left `Open`.
    pub fn begin_spin(&mut self) -> bool {
        if self.phase != RoundPhase::Open {
            return false;
        }
        self.phase = RoundPhase::Spinning;
        true
    }

    pub fn mark_settled(&mut self) {
        self.phase = RoundPhase::Settled;
    }

    pub fn has_wager(&self, bettor: UserId, selection: &BetSelection) -> bool {
        self.bets
            .get(&selection.category())
            .map(|wagers| {
                wagers
                    .iter()
                    .any(|w| w.bettor == bettor && w.selection == *selection)
            })
            .unwrap_or(false)
    }

    /// Append to the category bucket. Callers enforce uniqueness first.
    pub(crate) fn push(&mut self, wager: Wager) {
        self.bets
            .entry(wager.selection.category())
            .or_default()
            .push(wager);
    }

    pub fn wagers(&self, category: BetCategory) -> &[Wager] {
        self.bets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_bets_in(&self, category: BetCategory) -> bool {
        !self.wagers(category).is_empty()
    }

    pub fn iter_wagers(&self) -> impl Iterator<Item = &Wager> {
        self.bets.values().flatten()
    }

    pub fn bettors(&self) -> BTreeSet<UserId> {
        self.iter_wagers().map(|w| w.bettor).collect()
    }

    pub fn wager_count(&self) -> usize {
        self.bets.values().map(Vec::len).sum()
    }

    pub fn total_staked(&self) -> u64 {
        self.iter_wagers().map(|w| w.amount).sum()
    }
}
