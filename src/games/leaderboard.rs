//! Cumulative per-user roulette statistics.

use crate::errors::RouletteResult;
use crate::games::types::{LeaderboardEntry, UserId};
use crate::store::UserStatsStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Folds settled rounds into persisted leaderboard entries
#[derive(Clone)]
pub struct LeaderboardAccumulator {
    stats: Arc<dyn UserStatsStore>,
}

impl LeaderboardAccumulator {
    pub fn new(stats: Arc<dyn UserStatsStore>) -> Self {
        Self { stats }
    }

    /// Every bettor present in `net` played one more game, including those
    /// who broke even.
    ///
    /// Entries are stored one user at a time. A store failure skips that user
    /// only; the returned list names every bettor left unrecorded.
    pub async fn apply(&self, net: &BTreeMap<UserId, i64>) -> Vec<UserId> {
        let mut failed = Vec::new();
        for (&user, &delta) in net {
            if let Err(e) = self.record(user, delta).await {
                error!(user, delta, error = %e, "Failed to update leaderboard entry");
                failed.push(user);
            }
        }
        failed
    }

    async fn record(&self, user: UserId, delta: i64) -> RouletteResult<()> {
        let mut entry = self.stats.load_entry(user).await?;
        entry.games = entry.games.saturating_add(1);
        entry.total = entry.total.saturating_add(delta);
        self.stats.save_entry(user, entry).await?;
        debug!(user, delta, games = entry.games, total = entry.total, "Leaderboard updated");
        Ok(())
    }

    /// Zero both counters for each user
    pub async fn reset(&self, users: &[UserId]) -> RouletteResult<()> {
        for &user in users {
            self.stats.save_entry(user, LeaderboardEntry::default()).await?;
        }
        Ok(())
    }

    /// Ranked by cumulative total, highest first; ties go to fewer games,
    /// then lower user id
    pub async fn standings(&self, limit: usize) -> RouletteResult<Vec<(UserId, LeaderboardEntry)>> {
        let mut entries: Vec<_> = self
            .stats
            .all_entries()
            .await?
            .into_iter()
            .filter(|(_, entry)| entry.games > 0)
            .collect();
        entries.sort_by(|(a_user, a), (b_user, b)| {
            b.total
                .cmp(&a.total)
                .then(a.games.cmp(&b.games))
                .then(a_user.cmp(b_user))
        });
        entries.truncate(limit);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LedgerError;
    use crate::store::InMemoryStatsStore;
    use async_trait::async_trait;

    fn accumulator() -> (Arc<InMemoryStatsStore>, LeaderboardAccumulator) {
        let store = Arc::new(InMemoryStatsStore::new());
        (store.clone(), LeaderboardAccumulator::new(store))
    }

    #[tokio::test]
    async fn test_apply_increments_games_once() {
        let (store, board) = accumulator();
        let net = BTreeMap::from([(1, 200), (2, -50), (3, 0)]);

        assert!(board.apply(&net).await.is_empty());
        assert!(board.apply(&BTreeMap::from([(1, -20)])).await.is_empty());

        assert_eq!(store.load_entry(1).await.unwrap(), LeaderboardEntry { games: 2, total: 180 });
        assert_eq!(store.load_entry(2).await.unwrap(), LeaderboardEntry { games: 1, total: -50 });
        assert_eq!(store.load_entry(3).await.unwrap(), LeaderboardEntry { games: 1, total: 0 });
    }

    #[tokio::test]
    async fn test_empty_apply_is_noop() {
        let (store, board) = accumulator();
        assert!(board.apply(&BTreeMap::new()).await.is_empty());
        assert!(store.all_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_zeroes_without_counting() {
        let (store, board) = accumulator();
        board.apply(&BTreeMap::from([(1, 75)])).await;

        board.reset(&[1]).await.unwrap();

        assert_eq!(store.load_entry(1).await.unwrap(), LeaderboardEntry::default());
    }

    #[tokio::test]
    async fn test_standings_order() {
        let (_store, board) = accumulator();
        board
            .apply(&BTreeMap::from([(1, 100), (2, 300), (3, 100), (4, -10)]))
            .await;
        board.apply(&BTreeMap::from([(3, 0)])).await;

        let ranked: Vec<UserId> = board
            .standings(10)
            .await
            .unwrap()
            .into_iter()
            .map(|(user, _)| user)
            .collect();
        assert_eq!(ranked, vec![2, 1, 3, 4]);

        assert_eq!(board.standings(2).await.unwrap().len(), 2);
    }

    /// Refuses writes for one user
    struct RefusesUser {
        inner: InMemoryStatsStore,
        refused: UserId,
    }

    #[async_trait]
    impl UserStatsStore for RefusesUser {
        async fn load_entry(&self, user: UserId) -> RouletteResult<LeaderboardEntry> {
            self.inner.load_entry(user).await
        }

        async fn save_entry(&self, user: UserId, entry: LeaderboardEntry) -> RouletteResult<()> {
            if user == self.refused {
                return Err(LedgerError::Unavailable("stats offline".to_string()).into());
            }
            self.inner.save_entry(user, entry).await
        }

        async fn all_entries(&self) -> RouletteResult<Vec<(UserId, LeaderboardEntry)>> {
            self.inner.all_entries().await
        }
    }

    #[tokio::test]
    async fn test_partial_failure_names_unrecorded_users() {
        let store = Arc::new(RefusesUser {
            inner: InMemoryStatsStore::new(),
            refused: 2,
        });
        let board = LeaderboardAccumulator::new(store.clone());

        let failed = board.apply(&BTreeMap::from([(1, 10), (2, -10), (3, 5)])).await;

        assert_eq!(failed, vec![2]);
        assert_eq!(store.load_entry(1).await.unwrap(), LeaderboardEntry { games: 1, total: 10 });
        assert_eq!(store.load_entry(2).await.unwrap(), LeaderboardEntry::default());
        assert_eq!(store.load_entry(3).await.unwrap(), LeaderboardEntry { games: 1, total: 5 });
    }
}
