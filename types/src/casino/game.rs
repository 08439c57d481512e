use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ValidationError;

/// Table variants a session can be configured with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    /// Every roll is its own round: bet on an even or odd total.
    Parity,
    /// Come-out roll followed by a point phase.
    Point,
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parity" => Ok(Self::Parity),
            "point" | "craps" => Ok(Self::Point),
            other => Err(format!("unknown game type: {other}")),
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parity => f.write_str("parity"),
            Self::Point => f.write_str("point"),
        }
    }
}

/// Pick for the parity table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    /// Parity of a dice total.
    pub fn of(total: u8) -> Self {
        if total % 2 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }

    pub fn wins_on(self, total: u8) -> bool {
        Self::of(total) == self
    }
}

impl FromStr for Parity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "even" => Ok(Self::Even),
            "odd" => Ok(Self::Odd),
            _ => Err(ValidationError::InvalidPick(s.to_string())),
        }
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Even => f.write_str("even"),
            Self::Odd => f.write_str("odd"),
        }
    }
}

/// Result of a resolved bet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Won => f.write_str("Won"),
            Self::Lost => f.write_str("Lost"),
        }
    }
}

/// Read-only view of where a round stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    ComeOut,
    Point(u8),
    /// A decision was reached and the table waits for the next round.
    Resolved,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ComeOut => f.write_str("come-out"),
            Self::Point(point) => write!(f, "point {point}"),
            Self::Resolved => f.write_str("resolved"),
        }
    }
}

/// Two dice thrown together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    pub d1: u8,
    pub d2: u8,
}

impl Roll {
    pub fn new(d1: u8, d2: u8) -> Self {
        debug_assert!((1..=6).contains(&d1) && (1..=6).contains(&d2));
        Self { d1, d2 }
    }

    pub fn total(&self) -> u8 {
        self.d1 + self.d2
    }
}
