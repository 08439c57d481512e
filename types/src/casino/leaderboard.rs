use serde::{Deserialize, Serialize};

/// Casino leaderboard entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: i64,
}

/// Casino leaderboard, sorted by score descending. One entry per name.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn upsert(&mut self, name: &str, score: i64) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.score = score,
            None => self.entries.push(LeaderboardEntry {
                name: name.to_string(),
                score,
            }),
        }

        // Stable: ties keep their relative order
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Highest scores first, capped for display.
    pub fn top(&self, limit: usize) -> &[LeaderboardEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    /// 1-based position of `name`.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }

    pub fn score(&self, name: &str) -> Option<i64> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
