//! Point-based craps round.
//!
//! Round states:
//! ComeOut  - first roll of a round, no point
//! Point    - a point is set and the wager is locked
//! Resolved - the round was won or lost; rolls are refused until the next round
//!
//! Come-out roll: 7/11 win, 2/3/12 lose, anything else becomes the point.
//! Point roll: the point wins, 7 loses, anything else keeps rolling.
//!
//! Persisted form (JSON):
//! {"phase":"comeOut"}
//! {"phase":"point","point":6,"wager":10}
//! {"phase":"resolved","outcome":"Won"}

use super::{GameError, GameResult, PhaseEvent, RoundEngine, Wager};
use dicehouse_types::casino::{
    GameType, Outcome, Roll, RoundPhase, ValidationError, MIN_BET, POINT_NUMBERS,
};
use serde::{Deserialize, Serialize};

/// Craps round state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum Round {
    ComeOut,
    Point { point: u8, wager: u64 },
    Resolved { outcome: Outcome },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrapsRound {
    round: Round,
    table_max: u64,
}

impl CrapsRound {
    pub fn new(table_max: u64) -> Self {
        Self {
            round: Round::ComeOut,
            table_max,
        }
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    /// Resume a persisted round.
    pub fn restore(&mut self, round: Round) -> Result<(), GameError> {
        if let Round::Point { point, wager } = round {
            if !POINT_NUMBERS.contains(&point) || wager < MIN_BET {
                return Err(GameError::InvalidState);
            }
        }
        self.round = round;
        Ok(())
    }
}

/// Update the round after a roll.
fn update_phase(round: &mut Round, total: u8, amount: u64) -> Result<GameResult, GameError> {
    match *round {
        Round::ComeOut => match total {
            7 | 11 => {
                *round = Round::Resolved {
                    outcome: Outcome::Won,
                };
                Ok(GameResult::Win(PhaseEvent::Natural(total)))
            }
            2 | 3 | 12 => {
                *round = Round::Resolved {
                    outcome: Outcome::Lost,
                };
                Ok(GameResult::Loss(PhaseEvent::Craps(total)))
            }
            _ => {
                *round = Round::Point {
                    point: total,
                    wager: amount,
                };
                Ok(GameResult::Continue(PhaseEvent::PointEstablished(total)))
            }
        },
        Round::Point { point, .. } => {
            if total == point {
                *round = Round::Resolved {
                    outcome: Outcome::Won,
                };
                Ok(GameResult::Win(PhaseEvent::PointMade(point)))
            } else if total == 7 {
                *round = Round::Resolved {
                    outcome: Outcome::Lost,
                };
                Ok(GameResult::Loss(PhaseEvent::SevenOut))
            } else {
                Ok(GameResult::Continue(PhaseEvent::NoDecision))
            }
        }
        Round::Resolved { .. } => Err(GameError::GameAlreadyComplete),
    }
}

impl RoundEngine for CrapsRound {
    fn game_type(&self) -> GameType {
        GameType::Point
    }

    fn phase(&self) -> RoundPhase {
        match self.round {
            Round::ComeOut => RoundPhase::ComeOut,
            Round::Point { point, .. } => RoundPhase::Point(point),
            Round::Resolved { .. } => RoundPhase::Resolved,
        }
    }

    fn validate(&self, wager: &Wager, _balance: i64) -> Result<(), ValidationError> {
        if matches!(self.round, Round::Resolved { .. }) {
            return Err(ValidationError::RoundResolved);
        }
        if wager.amount < MIN_BET {
            return Err(ValidationError::NonPositiveAmount);
        }
        if wager.amount > self.table_max {
            return Err(ValidationError::ExceedsTableMax {
                max: self.table_max,
            });
        }
        if let Round::Point { wager: locked, .. } = self.round {
            if wager.amount != locked {
                return Err(ValidationError::WagerLocked { locked });
            }
        }
        Ok(())
    }

    fn process_roll(&mut self, wager: &Wager, roll: Roll) -> Result<GameResult, GameError> {
        update_phase(&mut self.round, roll.total(), wager.amount)
    }

    fn next_round(&mut self) -> bool {
        if matches!(self.round, Round::Resolved { .. }) {
            self.round = Round::ComeOut;
            true
        } else {
            false
        }
    }

    fn locked_wager(&self) -> Option<u64> {
        match self.round {
            Round::Point { wager, .. } => Some(wager),
            _ => None,
        }
    }
}
