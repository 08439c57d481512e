use serde::{Deserialize, Serialize};

use super::{Outcome, Parity};

/// A resolved bet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
    #[serde(rename = "result")]
    pub outcome: Outcome,
    pub amount: u64,
    pub total: u8,
    /// Pick on the parity table, absent on the point table.
    #[serde(rename = "betType")]
    pub bet_type: Option<Parity>,
}

/// Append-only log of resolved bets, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BetHistory {
    records: Vec<BetRecord>,
}

impl BetHistory {
    pub fn push(&mut self, record: BetRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent bet first.
    pub fn recent(&self) -> impl Iterator<Item = &BetRecord> {
        self.records.iter().rev()
    }

    /// Most recent bets first, capped for display.
    pub fn recent_limited(&self, limit: usize) -> impl Iterator<Item = &BetRecord> {
        self.recent().take(limit)
    }

    pub fn last(&self) -> Option<&BetRecord> {
        self.records.last()
    }
}
