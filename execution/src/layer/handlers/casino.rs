use dicehouse_types::casino::{validate_name, BetRecord, GameType, Parity, Player, ValidationError};
use tracing::{debug, info};

use super::super::*;
use crate::casino::Wager;

impl<S: State, D: Dice> Casino<S, D> {
    // === Session Handler Methods ===

    /// Register a new player with a fresh ledger.
    pub fn register(&mut self, name: &str) -> Result<&Player, Error> {
        if let Some(player) = &self.player {
            return Err(ValidationError::AlreadyRegistered(player.name.clone()).into());
        }
        let name = validate_name(name, self.rules.min_name_length)?;

        let player = Player::new(name, self.rules.starting_balance);
        self.table = Table::new(&self.rules);
        self.last_roll = None;
        self.leaderboard.upsert(&player.name, player.balance());
        info!(
            name = %player.name,
            balance = player.balance(),
            game = %self.rules.game_type,
            "player registered"
        );
        self.player = Some(player);

        self.stage_player();
        self.stage_history()?;
        self.stage_leaderboard()?;
        self.stage_round()?;
        self.commit()?;

        self.player
            .as_ref()
            .ok_or(Error::Validation(ValidationError::NotRegistered))
    }

    /// Throw the dice for a wager.
    ///
    /// Rejected wagers leave every piece of state untouched. A losing roll is
    /// a normal [RollOutcome], not an error.
    pub fn roll(&mut self, amount: u64, pick: Option<Parity>) -> Result<RollOutcome, Error> {
        let Some(balance) = self.current_balance() else {
            return Err(ValidationError::NotRegistered.into());
        };
        let wager = Wager { amount, pick };
        self.table.validate(&wager, balance)?;

        let roll = self.dice.roll();
        self.rolls += 1;
        let total = roll.total();
        let result = self.table.process_roll(&wager, roll)?;
        let outcome = result.outcome();
        let event = result.event();

        let Some(player) = self.player.as_mut() else {
            return Err(ValidationError::NotRegistered.into());
        };
        if let Some(outcome) = outcome {
            player.ledger = player.ledger.apply(amount, outcome);
            let bet_type = match self.rules.game_type {
                GameType::Parity => pick,
                GameType::Point => None,
            };
            self.history.push(BetRecord {
                outcome,
                amount,
                total,
                bet_type,
            });
            self.leaderboard.upsert(&player.name, player.ledger.balance);
        }

        let rolled = RollOutcome {
            roll,
            total,
            event,
            outcome,
            balance: player.ledger.balance,
        };
        info!(
            name = %player.name,
            d1 = roll.d1,
            d2 = roll.d2,
            total,
            amount,
            ?event,
            ?outcome,
            balance = rolled.balance,
            "dice rolled"
        );
        self.last_roll = Some(rolled);

        if outcome.is_some() {
            self.stage_player();
            self.stage_history()?;
            self.stage_leaderboard()?;
        }
        self.stage_round()?;
        self.stage_rolls();
        self.commit()?;

        Ok(rolled)
    }

    /// Re-arm a resolved round. Does nothing if no round is waiting.
    pub fn next_round(&mut self) -> Result<bool, Error> {
        if !self.table.next_round() {
            debug!(phase = %self.table.phase(), "no round to re-arm");
            return Ok(false);
        }
        self.last_roll = None;
        info!(phase = %self.table.phase(), "next round");

        self.stage_round()?;
        self.commit()?;
        Ok(true)
    }

    /// Forget the player and wipe every persisted key.
    pub fn exit(&mut self) -> Result<(), Error> {
        if let Some(player) = self.player.take() {
            info!(name = %player.name, balance = player.balance(), "player left the table");
        }
        self.table = Table::new(&self.rules);
        self.history = BetHistory::default();
        self.leaderboard = Leaderboard::default();
        self.last_roll = None;
        self.rolls = 0;
        self.dice.seek(0);
        self.pending.clear();

        self.state.clear()?;
        Ok(())
    }
}
