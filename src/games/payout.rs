//! Settlement of a drawn pocket against the round's wagers.

use crate::config::PayoutTable;
use crate::games::hot_spin::HotSpinBonus;
use crate::games::round::RoundState;
use crate::games::types::{BetCategory, BetSelection, UserId, Wager};
use crate::games::wheel::Pocket;
use crate::store::{BalanceLedger, CreditOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, warn};

/// One winning wager, as shown to players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutLine {
    pub category: BetCategory,
    pub selection: BetSelection,
    pub bettor: UserId,
    /// Amount actually credited
    pub amount: u64,
    /// Amount owed before any balance ceiling was applied
    pub owed: u64,
    pub clipped: bool,
}

/// A win the ledger failed to credit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpaidCredit {
    pub bettor: UserId,
    pub selection: BetSelection,
    pub amount: u64,
    pub reason: String,
}

/// Everything a settled round produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub pocket: Pocket,
    pub bonus: HotSpinBonus,
    pub winners: Vec<PayoutLine>,
    /// Profit or loss per bettor: credited winnings minus stake for wins,
    /// minus the stake for losses
    pub net: BTreeMap<UserId, i64>,
    pub unpaid: Vec<UnpaidCredit>,
    pub total_staked: u64,
    pub total_paid: u64,
}

/// Winning selection per category for a pocket. Dozens and columns are only
/// resolved when someone bet on them.
#[derive(Debug, Clone, Default)]
struct WinningValues(BTreeMap<BetCategory, BetSelection>);

impl WinningValues {
    fn resolve(pocket: Pocket, round: &RoundState) -> Self {
        let mut values = BTreeMap::new();
        for category in BetCategory::ALL {
            let needed = match category {
                BetCategory::Dozen | BetCategory::Column => round.has_bets_in(category),
                _ => true,
            };
            if !needed {
                continue;
            }
            if let Some(selection) = pocket.winning_selection(category) {
                values.insert(category, selection);
            }
        }
        Self(values)
    }

    fn wins(&self, category: BetCategory, wager: &Wager) -> bool {
        self.0.get(&category) == Some(&wager.selection)
    }
}

fn signed(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

/// Stake returned plus `stake * multiplier`, before any bonus
pub fn base_payout(stake: u64, multiplier: u64) -> u64 {
    stake.saturating_add(stake.saturating_mul(multiplier))
}

/// Computes winners and pays them through the balance ledger
#[derive(Clone)]
pub struct PayoutEngine {
    bank: Arc<dyn BalanceLedger>,
}

impl PayoutEngine {
    pub fn new(bank: Arc<dyn BalanceLedger>) -> Self {
        Self { bank }
    }

    /// Settle every wager in the round against `pocket`.
    ///
    /// Stakes were debited when the wagers were placed, so losses are
    /// bookkeeping only. A credit the ledger cannot complete is recorded in
    /// `unpaid` and the remaining wagers are still settled.
    pub async fn settle(
        &self,
        pocket: Pocket,
        round: &RoundState,
        payouts: &PayoutTable,
        bonus: HotSpinBonus,
    ) -> Settlement {
        let winning = WinningValues::resolve(pocket, round);
        let mut net: BTreeMap<UserId, i64> = round.bettors().into_iter().map(|user| (user, 0)).collect();
        let mut winners = Vec::new();
        let mut unpaid = Vec::new();
        let mut total_paid = 0u64;

        for category in BetCategory::ALL {
            for wager in round.wagers(category) {
                let delta = net.entry(wager.bettor).or_insert(0);

                if !winning.wins(category, wager) {
                    *delta = delta.saturating_sub(signed(wager.amount));
                    continue;
                }

                let owed = bonus.apply(base_payout(wager.amount, payouts.multiplier(category)));
                let credited = match self.bank.credit(wager.bettor, owed).await {
                    Ok(outcome) => {
                        if let CreditOutcome::Clipped { credited, max_balance } = outcome {
                            warn!(
                                room = round.room(),
                                bettor = wager.bettor,
                                owed,
                                credited,
                                max_balance,
                                "Payout clipped at balance ceiling"
                            );
                        }
                        winners.push(PayoutLine {
                            category,
                            selection: wager.selection,
                            bettor: wager.bettor,
                            amount: outcome.credited(),
                            owed,
                            clipped: outcome.is_clipped(),
                        });
                        outcome.credited()
                    }
                    Err(e) => {
                        error!(
                            room = round.room(),
                            bettor = wager.bettor,
                            owed,
                            error = %e,
                            "Failed to credit winning wager"
                        );
                        unpaid.push(UnpaidCredit {
                            bettor: wager.bettor,
                            selection: wager.selection,
                            amount: owed,
                            reason: e.to_string(),
                        });
                        0
                    }
                };

                total_paid = total_paid.saturating_add(credited);
                *delta = delta.saturating_add(signed(credited) - signed(wager.amount));
            }
        }

        Settlement {
            pocket,
            bonus,
            winners,
            net,
            unpaid,
            total_staked: round.total_staked(),
            total_paid,
        }
    }
}
