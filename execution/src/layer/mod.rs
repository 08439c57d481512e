use dicehouse_types::{
    casino::{
        read_int, read_json, write_int, write_json, BetHistory, GameType, Leaderboard, Outcome,
        Player, Roll, RoundPhase, ValidationError,
    },
    execution::{Key, Value},
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    casino::{Dice, GameError, PhaseEvent, Round, RoundEngine, Table, TableRules},
    state::{PersistenceError, State, Status},
};

mod handlers;

/// Error returned by a [Casino] operation.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The operation completed in memory but could not be saved.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<GameError> for Error {
    fn from(err: GameError) -> Self {
        Self::Validation(err.into())
    }
}

fn encode<T: Serialize>(key: Key, value: &T) -> Result<Value, PersistenceError> {
    write_json(value).map_err(|source| PersistenceError::Encode { key, source })
}

/// Everything the player sees after a roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollOutcome {
    pub roll: Roll,
    pub total: u8,
    pub event: PhaseEvent,
    /// `None` while the round keeps going.
    pub outcome: Option<Outcome>,
    pub balance: i64,
}

/// A single-player dice table bound to a session store.
///
/// Every mutating call stages the keys it touched and commits them once at
/// the end. If the store refuses the write, the in-memory state is kept, the
/// staged keys stay pending for the next commit, and the call returns
/// [Error::Persistence].
pub struct Casino<S: State, D: Dice> {
    rules: TableRules,
    state: S,
    dice: D,

    table: Table,
    player: Option<Player>,
    history: BetHistory,
    leaderboard: Leaderboard,
    last_roll: Option<RollOutcome>,
    rolls: u64,

    pending: BTreeMap<Key, Status>,
}

impl<S: State, D: Dice> Casino<S, D> {
    /// Open a table, resuming whatever session the store holds.
    pub fn open(rules: TableRules, state: S, dice: D) -> Result<Self, Error> {
        let table = Table::new(&rules);
        let mut casino = Self {
            rules,
            state,
            dice,
            table,
            player: None,
            history: BetHistory::default(),
            leaderboard: Leaderboard::default(),
            last_roll: None,
            rolls: 0,
            pending: BTreeMap::new(),
        };
        casino.load()?;
        Ok(casino)
    }

    fn load(&mut self) -> Result<(), PersistenceError> {
        if let Some(rolls) = self.read_int(Key::Rolls)? {
            self.rolls = rolls;
            self.dice.seek(rolls);
        }
        if let Some(leaderboard) = self.read_json::<Leaderboard>(Key::Leaderboard)? {
            self.leaderboard = leaderboard;
        }
        if let Some(history) = self.read_json::<BetHistory>(Key::BetHistory)? {
            self.history = history;
        }

        let Some(name) = self.state.get(&Key::PlayerName)? else {
            info!(
                game = %self.rules.game_type,
                leaderboard = self.leaderboard.len(),
                "no saved session"
            );
            return Ok(());
        };

        let mut player = Player::new(name, self.rules.starting_balance);
        if let Some(balance) = self.read_int(Key::Balance)? {
            player.ledger.balance = balance;
        }
        if let Some(wins) = self.read_int(Key::Wins)? {
            player.ledger.wins = wins;
        }
        if let Some(losses) = self.read_int(Key::Losses)? {
            player.ledger.losses = losses;
        }

        if self.rules.game_type == GameType::Point {
            if let Some(round) = self.read_json::<Round>(Key::Round)? {
                self.table
                    .restore(round)
                    .map_err(|_| PersistenceError::Corrupt {
                        key: Key::Round,
                        reason: format!("invalid round {round:?}"),
                    })?;
            }
        }

        info!(
            name = %player.name,
            balance = player.ledger.balance,
            wins = player.ledger.wins,
            losses = player.ledger.losses,
            bets = self.history.len(),
            phase = %self.table.phase(),
            "resumed session"
        );
        self.player = Some(player);
        Ok(())
    }

    fn read_int<T: std::str::FromStr>(&self, key: Key) -> Result<Option<T>, PersistenceError> {
        self.state
            .get(&key)?
            .map(|value| {
                read_int(&value).map_err(|err| PersistenceError::Corrupt {
                    key,
                    reason: err.to_string(),
                })
            })
            .transpose()
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        &self,
        key: Key,
    ) -> Result<Option<T>, PersistenceError> {
        self.state
            .get(&key)?
            .map(|value| {
                read_json(&value).map_err(|err| PersistenceError::Corrupt {
                    key,
                    reason: err.to_string(),
                })
            })
            .transpose()
    }

    fn insert(&mut self, key: Key, value: Value) {
        self.pending.insert(key, Status::Update(value));
    }

    fn stage_player(&mut self) {
        let Some(player) = &self.player else {
            return;
        };
        let name = player.name.clone();
        let ledger = player.ledger;
        self.insert(Key::PlayerName, name);
        self.insert(Key::Balance, write_int(ledger.balance));
        self.insert(Key::Wins, write_int(ledger.wins));
        self.insert(Key::Losses, write_int(ledger.losses));
    }

    fn stage_history(&mut self) -> Result<(), PersistenceError> {
        let value = encode(Key::BetHistory, &self.history)?;
        self.insert(Key::BetHistory, value);
        Ok(())
    }

    fn stage_leaderboard(&mut self) -> Result<(), PersistenceError> {
        let value = encode(Key::Leaderboard, &self.leaderboard)?;
        self.insert(Key::Leaderboard, value);
        Ok(())
    }

    fn stage_rolls(&mut self) {
        self.insert(Key::Rolls, write_int(self.rolls));
    }

    fn stage_round(&mut self) -> Result<(), PersistenceError> {
        if let Some(round) = self.table.round() {
            let value = encode(Key::Round, round)?;
            self.insert(Key::Round, value);
        }
        Ok(())
    }

    /// Write every staged change in one batch.
    fn commit(&mut self) -> Result<(), PersistenceError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let changes: Vec<(Key, Status)> = self
            .pending
            .iter()
            .map(|(key, status)| (*key, status.clone()))
            .collect();
        match self.state.apply(changes) {
            Ok(()) => {
                self.pending.clear();
                Ok(())
            }
            Err(err) => {
                warn!(
                    error = %err,
                    pending = self.pending.len(),
                    "failed to persist session, keeping changes in memory"
                );
                Err(err)
            }
        }
    }

    pub fn game_type(&self) -> GameType {
        self.rules.game_type
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn current_balance(&self) -> Option<i64> {
        self.player.as_ref().map(Player::balance)
    }

    pub fn current_phase(&self) -> RoundPhase {
        self.table.phase()
    }

    pub fn locked_wager(&self) -> Option<u64> {
        self.table.locked_wager()
    }

    pub fn history(&self) -> &BetHistory {
        &self.history
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn last_roll(&self) -> Option<&RollOutcome> {
        self.last_roll.as_ref()
    }

    /// Whether some changes are still waiting to be written.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}
