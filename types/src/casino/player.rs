use serde::{Deserialize, Serialize};

use super::Outcome;

/// Balance and win/loss counters of a player.
///
/// Balance is signed: a loss is always applied in full, so a table with a
/// fixed maximum can leave the player below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub balance: i64,
    pub wins: u64,
    pub losses: u64,
}

impl Ledger {
    pub fn new(starting_balance: i64) -> Self {
        Self {
            balance: starting_balance,
            wins: 0,
            losses: 0,
        }
    }

    /// Settle a bet, returning the updated ledger.
    pub fn apply(self, amount: u64, outcome: Outcome) -> Self {
        let amount = i64::try_from(amount).unwrap_or(i64::MAX);
        match outcome {
            Outcome::Won => Self {
                balance: self.balance.saturating_add(amount),
                wins: self.wins.saturating_add(1),
                ..self
            },
            Outcome::Lost => Self {
                balance: self.balance.saturating_sub(amount),
                losses: self.losses.saturating_add(1),
                ..self
            },
        }
    }

    pub fn reset(&mut self, starting_balance: i64) {
        *self = Self::new(starting_balance);
    }
}

/// Registered player
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub ledger: Ledger,
}

impl Player {
    pub fn new(name: String, starting_balance: i64) -> Self {
        Self {
            name,
            ledger: Ledger::new(starting_balance),
        }
    }

    pub fn balance(&self) -> i64 {
        self.ledger.balance
    }
}
