//! Dice table execution module.
//!
//! This module contains the round logic for both tables:
//! - Parity (even/odd, every roll is its own round)
//! - Craps (come-out roll, then a point phase)

pub mod craps;
#[cfg(test)]
mod integration_tests;
pub mod parity;

use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use dicehouse_types::casino::{
    GameType, Outcome, Parity, Roll, RoundPhase, ValidationError, MIN_NAME_LENGTH,
    PARITY_STARTING_BALANCE, POINT_STARTING_BALANCE, TABLE_MAX_BET,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub use craps::{CrapsRound, Round};
pub use parity::ParityRound;

/// Source of dice throws.
pub trait Dice {
    /// Throw two independent dice, each uniform over 1..=6.
    fn roll(&mut self) -> Roll;

    /// Position the source after `rolls` earlier throws of a resumed session.
    fn seek(&mut self, _rolls: u64) {}
}

impl<D: Dice + ?Sized> Dice for Box<D> {
    fn roll(&mut self) -> Roll {
        (**self).roll()
    }

    fn seek(&mut self, rolls: u64) {
        (**self).seek(rolls)
    }
}

impl<D: Dice + ?Sized> Dice for &mut D {
    fn roll(&mut self) -> Roll {
        (**self).roll()
    }

    fn seek(&mut self, rolls: u64) {
        (**self).seek(rolls)
    }
}

/// Deterministic random number generator built on a hash chain.
///
/// Uses SHA256 hash chains to generate random numbers deterministically
/// from a 32-byte seed.
#[derive(Clone)]
pub struct GameRng {
    state: [u8; 32],
    index: usize,
}

impl GameRng {
    /// Create a new RNG from a seed, session ID, and roll number.
    pub fn new(seed: &[u8; 32], session_id: u64, roll_number: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(&seed[..]);
        hasher.update(&session_id.to_be_bytes());
        hasher.update(&roll_number.to_be_bytes());
        Self {
            state: hasher.finalize().0,
            index: 0,
        }
    }

    /// Get the next random byte.
    fn next_byte(&mut self) -> u8 {
        if self.index >= 32 {
            // Rehash to get more bytes
            let mut hasher = Sha256::new();
            hasher.update(&self.state);
            self.state = hasher.finalize().0;
            self.index = 0;
        }
        let result = self.state[self.index];
        self.index += 1;
        result
    }

    /// Get a random u8 value.
    pub fn next_u8(&mut self) -> u8 {
        self.next_byte()
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: u8) -> u8 {
        if max == 0 {
            return 0;
        }
        // Simple rejection sampling for unbiased distribution
        let limit = u8::MAX - (u8::MAX % max);
        loop {
            let value = self.next_u8();
            if value < limit {
                return value % max;
            }
        }
    }

    /// Roll a single die (1-6).
    pub fn roll_die(&mut self) -> u8 {
        self.next_bounded(6) + 1
    }
}

impl Dice for GameRng {
    fn roll(&mut self) -> Roll {
        let d1 = self.roll_die();
        let d2 = self.roll_die();
        Roll::new(d1, d2)
    }
}

/// Seeded dice that derive a fresh [GameRng] for every throw.
///
/// Throw `n` depends only on the seed and `n`, so a session that persists its
/// roll count and calls [Dice::seek] on reopen continues the same sequence
/// instead of replaying it.
#[derive(Clone)]
pub struct SeededDice {
    seed: [u8; 32],
    rolls: u64,
}

impl SeededDice {
    pub fn new(seed: [u8; 32]) -> Self {
        Self { seed, rolls: 0 }
    }

    /// Throws made so far.
    pub fn rolls(&self) -> u64 {
        self.rolls
    }
}

impl Dice for SeededDice {
    fn roll(&mut self) -> Roll {
        // High bits pick the session, low bits the roll within it
        let mut rng = GameRng::new(&self.seed, self.rolls >> 32, self.rolls as u32);
        self.rolls += 1;
        rng.roll()
    }

    fn seek(&mut self, rolls: u64) {
        self.rolls = rolls;
    }
}

/// Dice backed by operating system entropy.
pub struct EntropyDice {
    rng: StdRng,
}

impl EntropyDice {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyDice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice for EntropyDice {
    fn roll(&mut self) -> Roll {
        Roll::new(self.rng.gen_range(1..=6), self.rng.gen_range(1..=6))
    }
}

/// A bet offered on the next roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Wager {
    pub amount: u64,
    /// Required on the parity table, ignored on the point table.
    pub pick: Option<Parity>,
}

/// What a roll did to the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    /// Parity table: the roll decided the bet.
    Settled,
    /// Come-out 7 or 11.
    Natural(u8),
    /// Come-out 2, 3 or 12.
    Craps(u8),
    PointEstablished(u8),
    PointMade(u8),
    SevenOut,
    /// Point phase roll that hit neither the point nor 7.
    NoDecision,
}

/// Result of processing a roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// Round is still in progress, no money moves.
    Continue(PhaseEvent),
    /// Round completed with a win.
    Win(PhaseEvent),
    /// Round completed with a loss.
    Loss(PhaseEvent),
}

impl GameResult {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Self::Continue(_) => None,
            Self::Win(_) => Some(Outcome::Won),
            Self::Loss(_) => Some(Outcome::Lost),
        }
    }

    pub fn event(&self) -> PhaseEvent {
        match self {
            Self::Continue(event) | Self::Win(event) | Self::Loss(event) => *event,
        }
    }
}

/// Error during round execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Parity roll without an even/odd pick.
    MissingPick,
    /// Round has already completed.
    GameAlreadyComplete,
    /// Restored round is not a valid state.
    InvalidState,
}

impl From<GameError> for ValidationError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::MissingPick => ValidationError::MissingPick,
            GameError::GameAlreadyComplete | GameError::InvalidState => {
                ValidationError::RoundResolved
            }
        }
    }
}

/// Trait for table round implementations.
pub trait RoundEngine {
    fn game_type(&self) -> GameType;

    fn phase(&self) -> RoundPhase;

    /// Check a wager against the table limits. Never mutates.
    fn validate(&self, wager: &Wager, balance: i64) -> Result<(), ValidationError>;

    /// Resolve a roll against the current round.
    fn process_roll(&mut self, wager: &Wager, roll: Roll) -> Result<GameResult, GameError>;

    /// Re-arm a resolved round. Returns whether anything changed.
    fn next_round(&mut self) -> bool;

    /// Amount riding on an established point, if any.
    fn locked_wager(&self) -> Option<u64> {
        None
    }
}

/// Table configuration fixed for the lifetime of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRules {
    pub game_type: GameType,
    pub starting_balance: i64,
    /// Wager cap on the point table. The parity table caps at the balance.
    pub table_max_bet: u64,
    pub min_name_length: usize,
}

impl TableRules {
    pub fn new(game_type: GameType) -> Self {
        let starting_balance = match game_type {
            GameType::Parity => PARITY_STARTING_BALANCE,
            GameType::Point => POINT_STARTING_BALANCE,
        };
        Self {
            game_type,
            starting_balance,
            table_max_bet: TABLE_MAX_BET,
            min_name_length: MIN_NAME_LENGTH,
        }
    }
}

/// The table a session plays at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Table {
    Parity(ParityRound),
    Point(CrapsRound),
}

impl Table {
    pub fn new(rules: &TableRules) -> Self {
        match rules.game_type {
            GameType::Parity => Self::Parity(ParityRound),
            GameType::Point => Self::Point(CrapsRound::new(rules.table_max_bet)),
        }
    }

    /// Round state worth persisting. Parity rounds never carry any.
    pub fn round(&self) -> Option<&Round> {
        match self {
            Self::Parity(_) => None,
            Self::Point(craps) => Some(craps.round()),
        }
    }

    /// Resume a persisted round. Ignored on the parity table.
    pub fn restore(&mut self, round: Round) -> Result<(), GameError> {
        match self {
            Self::Parity(_) => Ok(()),
            Self::Point(craps) => craps.restore(round),
        }
    }
}

impl RoundEngine for Table {
    fn game_type(&self) -> GameType {
        match self {
            Self::Parity(round) => round.game_type(),
            Self::Point(round) => round.game_type(),
        }
    }

    fn phase(&self) -> RoundPhase {
        match self {
            Self::Parity(round) => round.phase(),
            Self::Point(round) => round.phase(),
        }
    }

    fn validate(&self, wager: &Wager, balance: i64) -> Result<(), ValidationError> {
        match self {
            Self::Parity(round) => round.validate(wager, balance),
            Self::Point(round) => round.validate(wager, balance),
        }
    }

    fn process_roll(&mut self, wager: &Wager, roll: Roll) -> Result<GameResult, GameError> {
        match self {
            Self::Parity(round) => round.process_roll(wager, roll),
            Self::Point(round) => round.process_roll(wager, roll),
        }
    }

    fn next_round(&mut self) -> bool {
        match self {
            Self::Parity(round) => round.next_round(),
            Self::Point(round) => round.next_round(),
        }
    }

    fn locked_wager(&self) -> Option<u64> {
        match self {
            Self::Parity(round) => round.locked_wager(),
            Self::Point(round) => round.locked_wager(),
        }
    }
}
