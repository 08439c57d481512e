pub mod casino;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;

mod state;

pub use casino::{
    Dice, EntropyDice, GameRng, PhaseEvent, RoundEngine, SeededDice, TableRules,
};
pub use layer::{Casino, Error, RollOutcome};
pub use state::{FileStore, Memory, PersistenceError, State, Status};
