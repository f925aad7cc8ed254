//! Round orchestration
//!
//! Each room owns at most one [`RoundState`], guarded by its own async mutex.
//! Bet placement and the Open -> Spinning transition both take that lock, so
//! no wager can land after the wheel starts. A spawned task per round drives
//! the timing: wait out the betting window (or an early spin request), close
//! betting, wait for the ball, settle, update the leaderboard and discard the
//! round. Rounds are not persisted; a process restart loses in-flight rounds
//! together with their already-debited stakes.

use crate::config::RouletteConfig;
use crate::errors::{BetRejection, RoundError, RouletteResult};
use crate::games::hot_spin::HotSpinBonus;
use crate::games::leaderboard::LeaderboardAccumulator;
use crate::games::ledger::BetLedger;
use crate::games::parser::parse_bets;
use crate::games::payout::{PayoutEngine, Settlement};
use crate::games::round::{RoundPhase, RoundState};
use crate::games::types::{BetSelection, RoomId, UserId};
use crate::games::wheel::WheelRng;
use crate::store::{BalanceLedger, ConfigStore, UserStatsStore};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const OUTCOME_CHANNEL_CAPACITY: usize = 64;

/// Collaborators the scheduler is wired to
#[derive(Clone)]
pub struct EngineServices {
    pub bank: Arc<dyn BalanceLedger>,
    pub config: Arc<dyn ConfigStore>,
    pub stats: Arc<dyn UserStatsStore>,
    pub wheel: Arc<dyn WheelRng>,
}

/// Published once per settled round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub room: RoomId,
    #[serde(flatten)]
    pub settlement: Settlement,
    /// False when the stats store refused any update; payouts still happened
    pub leaderboard_updated: bool,
    /// Bettors whose leaderboard entry was not updated for this round
    pub leaderboard_failed: Vec<UserId>,
}

/// Result of one multi-bet submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BetReceipt {
    pub stake: u64,
    pub accepted: Vec<BetSelection>,
    pub rejected: Vec<BetRejection>,
    /// Set when this submission opened the round
    pub opened_window: Option<Duration>,
}

impl BetReceipt {
    pub fn total_staked(&self) -> u64 {
        self.stake.saturating_mul(self.accepted.len() as u64)
    }
}

/// Handle on an opened round
pub struct RoundTicket {
    pub room: RoomId,
    pub betting_window: Duration,
    pub handle: JoinHandle<RoundOutcome>,
}

#[derive(Clone)]
struct RoomHandle {
    round: Arc<Mutex<RoundState>>,
    spin_now: Arc<Notify>,
}

impl RoomHandle {
    fn new(room: RoomId) -> Self {
        Self {
            round: Arc::new(Mutex::new(RoundState::new(room))),
            spin_now: Arc::new(Notify::new()),
        }
    }

    fn same_round(&self, other: &RoomHandle) -> bool {
        Arc::ptr_eq(&self.round, &other.round)
    }
}

struct SchedulerInner {
    rooms: DashMap<RoomId, RoomHandle>,
    ledger: BetLedger,
    payouts: PayoutEngine,
    leaderboard: LeaderboardAccumulator,
    config: Arc<dyn ConfigStore>,
    wheel: Arc<dyn WheelRng>,
    outcomes: broadcast::Sender<RoundOutcome>,
}

/// Opens, times and settles roulette rounds, one per room
#[derive(Clone)]
pub struct RoundScheduler {
    inner: Arc<SchedulerInner>,
}

impl RoundScheduler {
    pub fn new(services: EngineServices) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SchedulerInner {
                rooms: DashMap::new(),
                ledger: BetLedger::new(services.bank.clone()),
                payouts: PayoutEngine::new(services.bank),
                leaderboard: LeaderboardAccumulator::new(services.stats),
                config: services.config,
                wheel: services.wheel,
                outcomes,
            }),
        }
    }

    /// Settled rounds from every room
    pub fn subscribe(&self) -> broadcast::Receiver<RoundOutcome> {
        self.inner.outcomes.subscribe()
    }

    pub fn leaderboard(&self) -> &LeaderboardAccumulator {
        &self.inner.leaderboard
    }

    pub fn active_rounds(&self) -> usize {
        self.inner.rooms.len()
    }

    pub fn is_active(&self, room: RoomId) -> bool {
        self.inner.rooms.contains_key(&room)
    }

    pub async fn phase(&self, room: RoomId) -> Option<RoundPhase> {
        let handle = self.inner.rooms.get(&room).map(|h| h.clone())?;
        let phase = handle.round.lock().await.phase();
        Some(phase)
    }

    /// Open a round explicitly. Fails if the room already has one; the
    /// running round and its timer are left untouched.
    pub async fn start_round(&self, room: RoomId) -> RouletteResult<RoundTicket> {
        let config = self.inner.config.load(room).await?;
        if !config.enabled {
            return Err(RoundError::Disabled { room }.into());
        }

        match self.claim_room(room, config) {
            (_, Some(ticket)) => Ok(ticket),
            (_, None) => {
                debug!(room, "Start refused, round already active");
                Err(RoundError::AlreadyActive { room }.into())
            }
        }
    }

    /// Skip the rest of the betting window
    pub fn spin_now(&self, room: RoomId) -> RouletteResult<()> {
        let handle = self
            .inner
            .rooms
            .get(&room)
            .map(|h| h.clone())
            .ok_or(RoundError::NoActiveRound { room })?;
        handle.spin_now.notify_one();
        Ok(())
    }

    /// Place `amount` on every selection in `raw`, opening a round if the
    /// room has none.
    ///
    /// Submission-level problems (disabled room, stake limits, nothing
    /// parseable, wheel spinning) fail the whole call. Per-selection problems
    /// are collected in the receipt and do not affect the other selections.
    pub async fn place_bets(
        &self,
        room: RoomId,
        bettor: UserId,
        amount: u64,
        raw: &str,
    ) -> RouletteResult<BetReceipt> {
        let config = self.inner.config.load(room).await?;
        if !config.enabled {
            return Err(BetRejection::Disabled.into());
        }
        let limits = &config.betting;
        if amount < limits.min_bet {
            return Err(BetRejection::BelowMinimum { amount, min: limits.min_bet }.into());
        }
        if amount > limits.max_bet {
            return Err(BetRejection::AboveMaximum { amount, max: limits.max_bet }.into());
        }

        let parsed = parse_bets(raw);
        if parsed.candidates.is_empty() {
            return Err(BetRejection::InvalidSelection(raw.trim().to_string()).into());
        }

        let (handle, ticket) = self.claim_room(room, config);
        let mut receipt = BetReceipt {
            stake: amount,
            rejected: parsed.failures,
            opened_window: ticket.map(|t| t.betting_window),
            ..Default::default()
        };

        let mut round = handle.round.lock().await;
        if !round.is_open() {
            return Err(BetRejection::WheelSpinning.into());
        }
        for candidate in parsed.candidates {
            match self.inner.ledger.place_bet(&mut round, bettor, candidate, amount).await {
                Ok(selection) => receipt.accepted.push(selection),
                Err(rejection) => receipt.rejected.push(rejection),
            }
        }

        debug!(
            room,
            bettor,
            accepted = receipt.accepted.len(),
            rejected = receipt.rejected.len(),
            staked = receipt.total_staked(),
            "Bets submitted"
        );
        Ok(receipt)
    }

    /// Join the room's round, or create it and start its timer
    fn claim_room(&self, room: RoomId, config: RouletteConfig) -> (RoomHandle, Option<RoundTicket>) {
        let handle = match self.inner.rooms.entry(room) {
            Entry::Occupied(entry) => return (entry.get().clone(), None),
            Entry::Vacant(entry) => {
                let handle = RoomHandle::new(room);
                entry.insert(handle.clone());
                handle
            }
        };

        let betting_window = config.timing.betting_window();
        info!(room, window_secs = betting_window.as_secs(), "Roulette round opened");

        let inner = Arc::clone(&self.inner);
        let task_handle = handle.clone();
        let join = tokio::spawn(async move { inner.run_round(room, task_handle, config).await });

        (
            handle,
            Some(RoundTicket {
                room,
                betting_window,
                handle: join,
            }),
        )
    }
}

impl SchedulerInner {
    async fn run_round(&self, room: RoomId, handle: RoomHandle, opened_with: RouletteConfig) -> RoundOutcome {
        tokio::select! {
            _ = tokio::time::sleep(opened_with.timing.betting_window()) => {}
            _ = handle.spin_now.notified() => debug!(room, "Early spin requested"),
        }

        {
            let mut round = handle.round.lock().await;
            round.begin_spin();
            info!(
                room,
                wagers = round.wager_count(),
                staked = round.total_staked(),
                "The wheel begins to spin"
            );
        }

        let (min_delay, max_delay) = opened_with.timing.spin_delay_bounds();
        tokio::time::sleep(self.wheel.spin_delay(min_delay, max_delay)).await;

        let outcome = self.settle(room, &handle, opened_with).await;

        self.rooms.remove_if(&room, |_, current| current.same_round(&handle));
        if self.outcomes.send(outcome.clone()).is_err() {
            debug!(room, "No outcome subscribers");
        }
        outcome
    }

    async fn settle(&self, room: RoomId, handle: &RoomHandle, opened_with: RouletteConfig) -> RoundOutcome {
        // Payout settings may have changed while the round was open.
        let config = match self.config.load(room).await {
            Ok(config) => config,
            Err(e) => {
                warn!(room, error = %e, "Config unavailable at settlement, using round-open settings");
                opened_with
            }
        };

        let mut round = handle.round.lock().await;
        let pocket = self.wheel.draw();
        let bonus = HotSpinBonus::sample(&config.hot_spin, self.wheel.as_ref());
        let settlement = self.payouts.settle(pocket, &round, &config.payouts, bonus).await;
        round.mark_settled();
        drop(round);

        info!(
            room,
            number = pocket.number(),
            color = %pocket.color(),
            bonus = %bonus,
            winners = settlement.winners.len(),
            paid = settlement.total_paid,
            staked = settlement.total_staked,
            "The wheel lands on {}",
            pocket
        );

        let leaderboard_failed = self.leaderboard.apply(&settlement.net).await;
        if !leaderboard_failed.is_empty() {
            error!(room, users = ?leaderboard_failed, "Leaderboard left incomplete for this round");
        }

        RoundOutcome {
            room,
            settlement,
            leaderboard_updated: leaderboard_failed.is_empty(),
            leaderboard_failed,
        }
    }
}
