//! Multi-bet input parsing
//!
//! `"red, 5, 1st dozen"` becomes three candidates. Numbers are range checked
//! later by the ledger so an out-of-range pick is reported with its value.

use crate::errors::BetRejection;
use crate::games::types::BetSelection;
use std::num::IntErrorKind;

/// A token that parsed but has not been validated against the wheel yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetCandidate {
    Symbolic(BetSelection),
    Number(i64),
}

impl BetCandidate {
    /// Resolve to a selection, rejecting numbers outside 0..=36
    pub fn into_selection(self) -> Result<BetSelection, BetRejection> {
        match self {
            BetCandidate::Symbolic(selection) => Ok(selection),
            BetCandidate::Number(n) => {
                BetSelection::number(n).ok_or_else(|| BetRejection::OutOfRange(n.to_string()))
            }
        }
    }
}

impl From<BetSelection> for BetCandidate {
    fn from(selection: BetSelection) -> Self {
        BetCandidate::Symbolic(selection)
    }
}

/// Output of [`parse_bets`]: candidates in input order plus one failure per
/// unrecognised token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBets {
    pub candidates: Vec<BetCandidate>,
    pub failures: Vec<BetRejection>,
}

impl ParsedBets {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.failures.is_empty()
    }
}

/// Split a comma-separated bet string. Empty tokens are skipped.
pub fn parse_bets(input: &str) -> ParsedBets {
    let mut parsed = ParsedBets::default();

    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_token(token) {
            Ok(candidate) => parsed.candidates.push(candidate),
            Err(rejection) => parsed.failures.push(rejection),
        }
    }

    parsed
}

fn parse_token(token: &str) -> Result<BetCandidate, BetRejection> {
    if let Some(selection) = BetSelection::symbolic(token) {
        return Ok(BetCandidate::Symbolic(selection));
    }
    match token.parse::<i64>() {
        Ok(n) => Ok(BetCandidate::Number(n)),
        // Still a number, just far outside the wheel
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(BetRejection::OutOfRange(token.to_string()))
        }
        Err(_) => Err(BetRejection::InvalidSelection(token.to_string())),
    }
}
