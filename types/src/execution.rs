use std::fmt;

/// Persisted session keys. Every value is stored as text.
///
/// Batches are written in declaration order, so the round lands before the
/// ledger it settles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Point-table round, so a reopened session resumes mid-point.
    Round,
    /// Dice thrown so far, so seeded dice continue across sessions.
    Rolls,
    PlayerName,
    Balance,
    Wins,
    Losses,
    BetHistory,
    Leaderboard,
}

impl Key {
    pub const ALL: [Key; 8] = [
        Key::Round,
        Key::Rolls,
        Key::PlayerName,
        Key::Balance,
        Key::Wins,
        Key::Losses,
        Key::BetHistory,
        Key::Leaderboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Round => "round",
            Self::Rolls => "rolls",
            Self::PlayerName => "playerName",
            Self::Balance => "balance",
            Self::Wins => "wins",
            Self::Losses => "losses",
            Self::BetHistory => "betHistory",
            Self::Leaderboard => "leaderboard",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text stored under a [Key].
pub type Value = String;
