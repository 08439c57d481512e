//! Even/odd table. Every roll is a complete round: the player picks a parity
//! and wins when the dice total matches it.

use super::{GameError, GameResult, PhaseEvent, RoundEngine, Wager};
use dicehouse_types::casino::{GameType, Roll, RoundPhase, ValidationError, MIN_BET};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParityRound;

impl RoundEngine for ParityRound {
    fn game_type(&self) -> GameType {
        GameType::Parity
    }

    fn phase(&self) -> RoundPhase {
        RoundPhase::ComeOut
    }

    fn validate(&self, wager: &Wager, balance: i64) -> Result<(), ValidationError> {
        if wager.amount < MIN_BET {
            return Err(ValidationError::NonPositiveAmount);
        }
        if i128::from(wager.amount) > i128::from(balance) {
            return Err(ValidationError::ExceedsBalance { max: balance });
        }
        if wager.pick.is_none() {
            return Err(ValidationError::MissingPick);
        }
        Ok(())
    }

    fn process_roll(&mut self, wager: &Wager, roll: Roll) -> Result<GameResult, GameError> {
        let pick = wager.pick.ok_or(GameError::MissingPick)?;
        if pick.wins_on(roll.total()) {
            Ok(GameResult::Win(PhaseEvent::Settled))
        } else {
            Ok(GameResult::Loss(PhaseEvent::Settled))
        }
    }

    fn next_round(&mut self) -> bool {
        false
    }
}
