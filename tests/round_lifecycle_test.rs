//! End-to-end round tests against in-memory collaborators
//!
//! The tokio clock is paused, so betting windows and spin delays elapse
//! instantly once every task is idle.

use roulette_engine::config::RouletteConfig;
use roulette_engine::errors::{BetRejection, RouletteError};
use roulette_engine::games::{
    BetSelection, Color, EngineServices, FixedWheel, LeaderboardEntry, Pocket, RoundPhase,
    RoundScheduler, RouletteSettings, Third,
};
use async_trait::async_trait;
use roulette_engine::errors::{LedgerError, RouletteResult};
use roulette_engine::games::UserId;
use roulette_engine::store::{
    BalanceLedger, ConfigStore, InMemoryBank, InMemoryConfigStore, InMemoryStatsStore,
    UserStatsStore,
};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    scheduler: RoundScheduler,
    bank: Arc<InMemoryBank>,
    config: Arc<InMemoryConfigStore>,
    stats: Arc<InMemoryStatsStore>,
}

fn harness(number: u8, max_balance: u64) -> Harness {
    let bank = Arc::new(InMemoryBank::new(max_balance));
    let config = Arc::new(InMemoryConfigStore::default());
    let stats = Arc::new(InMemoryStatsStore::new());
    let scheduler = RoundScheduler::new(EngineServices {
        bank: bank.clone(),
        config: config.clone(),
        stats: stats.clone(),
        wheel: Arc::new(FixedWheel(Pocket::new(number).unwrap())),
    });
    Harness {
        scheduler,
        bank,
        config,
        stats,
    }
}

#[tokio::test(start_paused = true)]
async fn test_red_bet_wins_on_twelve() {
    let h = harness(12, u64::MAX);
    h.bank.set_balance(1, 1_000);

    let ticket = h.scheduler.start_round(7).await.unwrap();
    let receipt = h.scheduler.place_bets(7, 1, 100, "red").await.unwrap();
    assert_eq!(receipt.accepted, vec![BetSelection::Color(Color::Red)]);
    assert_eq!(receipt.opened_window, None);
    assert_eq!(h.bank.balance(1).await.unwrap(), 900);

    let outcome = ticket.handle.await.unwrap();

    assert_eq!(outcome.settlement.pocket.number(), 12);
    assert_eq!(outcome.settlement.winners.len(), 1);
    assert_eq!(outcome.settlement.winners[0].amount, 200);
    assert_eq!(outcome.settlement.net[&1], 100);
    assert!(outcome.leaderboard_updated);
    assert_eq!(h.bank.balance(1).await.unwrap(), 1_100);
    assert!(!h.scheduler.is_active(7));
}

#[tokio::test(start_paused = true)]
async fn test_multi_bet_straight_number_and_losers() {
    let h = harness(5, u64::MAX);
    h.bank.set_balance(1, 1_000);
    h.bank.set_balance(2, 1_000);

    let ticket = h.scheduler.start_round(1).await.unwrap();
    let receipt = h
        .scheduler
        .place_bets(1, 1, 50, "5, black, 3rd dozen")
        .await
        .unwrap();
    assert_eq!(receipt.accepted.len(), 3);
    assert_eq!(receipt.total_staked(), 150);
    h.scheduler.place_bets(1, 2, 50, "2nd column").await.unwrap();

    h.scheduler.spin_now(1).unwrap();
    let outcome = ticket.handle.await.unwrap();

    // 5 is red, first dozen, second column
    let winners: Vec<_> = outcome
        .settlement
        .winners
        .iter()
        .map(|line| (line.bettor, line.selection, line.amount))
        .collect();
    assert_eq!(
        winners,
        vec![
            (1, BetSelection::Number(5), 1_800),
            (2, BetSelection::Column(Third::Second), 150),
        ]
    );
    assert_eq!(outcome.settlement.net[&1], 1_750 - 100);
    assert_eq!(outcome.settlement.net[&2], 100);
    assert_eq!(h.bank.balance(1).await.unwrap(), 1_000 - 150 + 1_800);
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_and_out_of_range_reported_per_selection() {
    let h = harness(12, u64::MAX);
    h.bank.set_balance(1, 1_000);

    let receipt = h
        .scheduler
        .place_bets(2, 1, 10, "red, 40, RED, banana, odd")
        .await
        .unwrap();

    assert_eq!(
        receipt.accepted,
        vec![
            BetSelection::Color(Color::Red),
            BetSelection::Parity(roulette_engine::games::Parity::Odd),
        ]
    );
    assert!(receipt
        .rejected
        .contains(&BetRejection::Duplicate(BetSelection::Color(Color::Red))));
    assert!(receipt.rejected.contains(&BetRejection::OutOfRange("40".to_string())));
    assert!(receipt
        .rejected
        .contains(&BetRejection::InvalidSelection("banana".to_string())));
    assert_eq!(h.bank.balance(1).await.unwrap(), 980);
}

#[tokio::test(start_paused = true)]
async fn test_bets_refused_once_wheel_spins() {
    let h = harness(0, u64::MAX);
    h.bank.set_balance(1, 1_000);

    let ticket = h.scheduler.start_round(3).await.unwrap();
    h.scheduler.place_bets(3, 1, 10, "0").await.unwrap();

    // Past the 60s window, inside the minimum 3s spin delay
    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(h.scheduler.phase(3).await, Some(RoundPhase::Spinning));

    let err = h.scheduler.place_bets(3, 1, 10, "red").await.err().unwrap();
    assert!(matches!(err, RouletteError::Bet(BetRejection::WheelSpinning)));
    assert_eq!(h.bank.balance(1).await.unwrap(), 990);

    let outcome = ticket.handle.await.unwrap();
    assert_eq!(outcome.settlement.winners[0].amount, 360);
}

#[tokio::test(start_paused = true)]
async fn test_leaderboard_counts_each_round_once() {
    let h = harness(12, u64::MAX);
    h.bank.set_balance(1, 1_000);

    for _ in 0..2 {
        let ticket = h.scheduler.start_round(4).await.unwrap();
        h.scheduler
            .place_bets(4, 1, 10, "red, black, odd, even")
            .await
            .unwrap();
        h.scheduler.spin_now(4).unwrap();
        ticket.handle.await.unwrap();
    }

    // 12: red and even win 20 each, black and odd lose 10 each
    assert_eq!(
        h.stats.load_entry(1).await.unwrap(),
        LeaderboardEntry { games: 2, total: 0 }
    );
    let standings = h.scheduler.leaderboard().standings(5).await.unwrap();
    assert_eq!(standings, vec![(1, LeaderboardEntry { games: 2, total: 0 })]);
}

#[tokio::test(start_paused = true)]
async fn test_payout_clipped_at_balance_ceiling() {
    let h = harness(30, 1_000);
    h.bank.set_balance(1, 900);

    let settings = RouletteSettings::new(h.config.clone());
    settings.set_payout(6, "dozen", 4).await.unwrap();

    let ticket = h.scheduler.start_round(6).await.unwrap();
    h.scheduler.place_bets(6, 1, 100, "3rd dozen").await.unwrap();
    h.scheduler.spin_now(6).unwrap();
    let outcome = ticket.handle.await.unwrap();

    let line = &outcome.settlement.winners[0];
    assert_eq!(line.owed, 500);
    assert_eq!(line.amount, 200);
    assert!(line.clipped);
    assert_eq!(h.bank.balance(1).await.unwrap(), 1_000);
}

#[tokio::test(start_paused = true)]
async fn test_outcome_broadcast_to_subscribers() {
    let h = harness(17, u64::MAX);
    h.bank.set_balance(1, 1_000);
    let mut outcomes = h.scheduler.subscribe();

    let receipt = h.scheduler.place_bets(8, 1, 25, "17").await.unwrap();
    assert_eq!(receipt.opened_window, Some(Duration::from_secs(60)));

    let outcome = outcomes.recv().await.unwrap();
    assert_eq!(outcome.room, 8);
    assert_eq!(outcome.settlement.pocket.number(), 17);
    assert_eq!(outcome.settlement.total_paid, 900);
    assert_eq!(outcome.settlement.total_staked, 25);

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["room"], 8);
    assert_eq!(json["total_paid"], 900);
    assert_eq!(json["leaderboard_updated"], true);
    assert_eq!(json["leaderboard_failed"], serde_json::json!([]));
}

#[tokio::test(start_paused = true)]
async fn test_disabled_room_refuses_bets_and_rounds() {
    let h = harness(12, u64::MAX);
    h.bank.set_balance(1, 1_000);
    let config = RouletteConfig {
        enabled: false,
        ..RouletteConfig::default()
    };
    h.config.save(9, &config).await.unwrap();

    let err = h.scheduler.place_bets(9, 1, 10, "red").await.err().unwrap();
    assert!(matches!(err, RouletteError::Bet(BetRejection::Disabled)));
    assert!(h.scheduler.start_round(9).await.is_err());
    assert!(!h.scheduler.is_active(9));
    assert_eq!(h.bank.balance(1).await.unwrap(), 1_000);
}

#[tokio::test(start_paused = true)]
async fn test_insufficient_funds_keeps_other_selections() {
    let h = harness(12, u64::MAX);
    h.bank.set_balance(1, 30);

    let receipt = h
        .scheduler
        .place_bets(10, 1, 20, "red, black")
        .await
        .unwrap();

    assert_eq!(receipt.accepted, vec![BetSelection::Color(Color::Red)]);
    assert_eq!(
        receipt.rejected,
        vec![BetRejection::InsufficientFunds(BetSelection::Color(Color::Black))]
    );
    assert_eq!(h.bank.balance(1).await.unwrap(), 10);
}

/// Stats store that is down for writes
struct ReadOnlyStats;

#[async_trait]
impl UserStatsStore for ReadOnlyStats {
    async fn load_entry(&self, _user: UserId) -> RouletteResult<LeaderboardEntry> {
        Ok(LeaderboardEntry::default())
    }

    async fn save_entry(&self, _user: UserId, _entry: LeaderboardEntry) -> RouletteResult<()> {
        Err(LedgerError::Unavailable("stats offline".to_string()).into())
    }

    async fn all_entries(&self) -> RouletteResult<Vec<(UserId, LeaderboardEntry)>> {
        Ok(Vec::new())
    }
}

#[tokio::test(start_paused = true)]
async fn test_leaderboard_outage_still_pays() {
    let bank = Arc::new(InMemoryBank::default());
    bank.set_balance(1, 100);
    bank.set_balance(2, 100);
    let scheduler = RoundScheduler::new(EngineServices {
        bank: bank.clone(),
        config: Arc::new(InMemoryConfigStore::default()),
        stats: Arc::new(ReadOnlyStats),
        wheel: Arc::new(FixedWheel(Pocket::new(12).unwrap())),
    });

    let ticket = scheduler.start_round(11).await.unwrap();
    scheduler.place_bets(11, 1, 10, "red").await.unwrap();
    scheduler.place_bets(11, 2, 10, "black").await.unwrap();
    scheduler.spin_now(11).unwrap();
    let outcome = ticket.handle.await.unwrap();

    assert!(!outcome.leaderboard_updated);
    assert_eq!(outcome.leaderboard_failed, vec![1, 2]);
    assert_eq!(bank.balance(1).await.unwrap(), 110);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bets_race_the_spin() {
    const ROOM: u64 = 20;
    const PLAYERS: u64 = 64;
    const STAKE: u64 = 10;
    const STARTING: u64 = 1_000;

    // Zero lands, so every stake is lost and balances show debits only
    let h = harness(0, u64::MAX);
    let mut config = RouletteConfig::default();
    config.timing.spin_delay_min_secs = 0;
    config.timing.spin_delay_max_secs = 0;
    h.config.save(ROOM, &config).await.unwrap();
    for player in 1..=PLAYERS {
        h.bank.set_balance(player, STARTING);
    }
    let mut outcomes = h.scheduler.subscribe();

    let ticket = h.scheduler.start_round(ROOM).await.unwrap();
    let mut submissions = Vec::new();
    for player in 1..=PLAYERS {
        let scheduler = h.scheduler.clone();
        submissions.push(tokio::spawn(async move {
            scheduler.place_bets(ROOM, player, STAKE, "red, black, 17").await
        }));
        if player == PLAYERS / 2 {
            h.scheduler.spin_now(ROOM).unwrap();
        }
    }

    let mut receipted = 0;
    for submission in submissions {
        match submission.await.unwrap() {
            Ok(receipt) => receipted += receipt.total_staked(),
            Err(e) => assert!(matches!(e, RouletteError::Bet(BetRejection::WheelSpinning))),
        }
    }
    ticket.handle.await.unwrap();

    // A submission that arrived after teardown opened a follow-up round
    let mut rounds = 1;
    if h.scheduler.is_active(ROOM) {
        h.scheduler.spin_now(ROOM).unwrap();
        rounds += 1;
    }

    let mut staked = 0;
    for _ in 0..rounds {
        let outcome = outcomes.recv().await.unwrap();
        assert_eq!(outcome.room, ROOM);
        assert!(outcome.settlement.winners.is_empty());
        staked += outcome.settlement.total_staked;
    }

    let mut debited = 0;
    for player in 1..=PLAYERS {
        debited += STARTING - h.bank.balance(player).await.unwrap();
    }
    assert!(staked > 0);
    assert_eq!(debited, staked);
    assert_eq!(receipted, staked);
}
