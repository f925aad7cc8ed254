//! Validates and records wagers against the open round.

use crate::errors::{BetRejection, LedgerError};
use crate::games::parser::BetCandidate;
use crate::games::round::RoundState;
use crate::games::types::{BetSelection, UserId, Wager};
use crate::store::BalanceLedger;
use std::sync::Arc;
use tracing::{debug, warn};

/// Records wagers, debiting the stake exactly once per accepted wager
#[derive(Clone)]
pub struct BetLedger {
    bank: Arc<dyn BalanceLedger>,
}

impl BetLedger {
    pub fn new(bank: Arc<dyn BalanceLedger>) -> Self {
        Self { bank }
    }

    /// Place a single wager.
    ///
    /// The caller holds the room's lock for the whole call, so the duplicate
    /// check, the debit and the append cannot interleave with another bet or
    /// with the spin transition. Nothing is appended unless the debit
    /// succeeded.
    pub async fn place_bet(
        &self,
        round: &mut RoundState,
        bettor: UserId,
        selection: impl Into<BetCandidate>,
        amount: u64,
    ) -> Result<BetSelection, BetRejection> {
        if !round.is_open() {
            return Err(BetRejection::WheelSpinning);
        }
        if amount == 0 {
            return Err(BetRejection::NonPositiveStake);
        }

        // Out-of-range numbers are never on the board; resolve first.
        let candidate: BetCandidate = selection.into();
        let selection = candidate.into_selection()?;
        if round.has_wager(bettor, &selection) {
            return Err(BetRejection::Duplicate(selection));
        }

        match self.bank.debit(bettor, amount).await {
            Ok(remaining) => {
                round.push(Wager {
                    bettor,
                    selection,
                    amount,
                });
                debug!(
                    room = round.room(),
                    bettor,
                    %selection,
                    amount,
                    remaining,
                    "Wager accepted"
                );
                Ok(selection)
            }
            Err(LedgerError::InsufficientFunds { .. }) => {
                debug!(room = round.room(), bettor, %selection, amount, "Insufficient funds for wager");
                Err(BetRejection::InsufficientFunds(selection))
            }
            Err(e) => {
                warn!(room = round.room(), bettor, %selection, error = %e, "Debit failed, wager not recorded");
                Err(BetRejection::LedgerUnavailable(selection))
            }
        }
    }
}
