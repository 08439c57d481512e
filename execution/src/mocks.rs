use crate::{
    casino::{Dice, TableRules},
    state::{Memory, PersistenceError, State},
};
use dicehouse_types::{
    casino::{GameType, Roll},
    execution::{Key, Value},
};
use std::{cell::Cell, collections::VecDeque, rc::Rc};

/// Creates a 32-byte dice seed from a small integer
pub fn create_seed(n: u64) -> [u8; 32] {
    let mut seed = [0u8; 32];
    seed[..8].copy_from_slice(&n.to_be_bytes());
    seed
}

/// Creates table rules with the default limits
pub fn create_rules(game_type: GameType) -> TableRules {
    TableRules::new(game_type)
}

/// Dice that replay a fixed list of throws.
#[derive(Default)]
pub struct ScriptedDice {
    rolls: VecDeque<Roll>,
}

impl ScriptedDice {
    pub fn new(rolls: &[(u8, u8)]) -> Self {
        Self {
            rolls: rolls.iter().map(|&(d1, d2)| Roll::new(d1, d2)).collect(),
        }
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> Roll {
        self.rolls.pop_front().expect("scripted dice ran out of rolls")
    }
}

/// In-memory store whose writes can be switched off from outside.
#[derive(Default)]
pub struct FlakyStore {
    inner: Memory,
    failing: Rc<Cell<bool>>,
    refused: Rc<Cell<Option<Key>>>,
    writes: Rc<Cell<usize>>,
}

impl FlakyStore {
    /// Shared switch: `set(true)` makes every write fail.
    pub fn switch(&self) -> Rc<Cell<bool>> {
        self.failing.clone()
    }

    /// Shared switch: `set(Some(key))` makes writes to that key fail.
    pub fn refuse(&self) -> Rc<Cell<Option<Key>>> {
        self.refused.clone()
    }

    /// Shared counter of accepted writes.
    pub fn writes(&self) -> Rc<Cell<usize>> {
        self.writes.clone()
    }

    fn check(&self, key: &Key) -> Result<(), PersistenceError> {
        if self.failing.get() || self.refused.get() == Some(*key) {
            return Err(PersistenceError::Unavailable("disk full".to_string()));
        }
        Ok(())
    }
}

impl State for FlakyStore {
    fn get(&self, key: &Key) -> Result<Option<Value>, PersistenceError> {
        self.inner.get(key)
    }

    fn insert(&mut self, key: Key, value: Value) -> Result<(), PersistenceError> {
        self.check(&key)?;
        self.writes.set(self.writes.get() + 1);
        self.inner.insert(key, value)
    }

    fn delete(&mut self, key: &Key) -> Result<(), PersistenceError> {
        self.check(key)?;
        self.writes.set(self.writes.get() + 1);
        self.inner.delete(key)
    }
}
