//! Plain-text views of the table.

use dicehouse_execution::{PhaseEvent, RollOutcome};
use dicehouse_types::casino::{BetHistory, GameType, Leaderboard, Outcome, Player, RoundPhase};
use std::fmt::Write;

fn describe(event: PhaseEvent) -> String {
    match event {
        PhaseEvent::Settled => "settled".to_string(),
        PhaseEvent::Natural(total) => format!("natural {total}"),
        PhaseEvent::Craps(total) => format!("craps {total}"),
        PhaseEvent::PointEstablished(point) => format!("point is {point}"),
        PhaseEvent::PointMade(point) => format!("point {point} made"),
        PhaseEvent::SevenOut => "seven out".to_string(),
        PhaseEvent::NoDecision => "no decision, roll again".to_string(),
    }
}

pub fn roll(rolled: &RollOutcome, amount: u64) -> String {
    let mut out = format!(
        "rolled {} + {} = {} ({})",
        rolled.roll.d1,
        rolled.roll.d2,
        rolled.total,
        describe(rolled.event)
    );
    match rolled.outcome {
        Some(Outcome::Won) => {
            let _ = write!(out, "\nyou won ${amount}");
        }
        Some(Outcome::Lost) => {
            let _ = write!(out, "\nyou lost ${amount}");
        }
        None => {}
    }
    let _ = write!(out, "\nbalance: ${}", rolled.balance);
    out
}

pub fn status(
    game: GameType,
    player: Option<&Player>,
    phase: RoundPhase,
    locked_wager: Option<u64>,
) -> String {
    let Some(player) = player else {
        return format!("{game} table, no player registered");
    };
    let mut out = format!(
        "{game} table\nplayer: {}\nbalance: ${}\nwins: {}  losses: {}",
        player.name, player.ledger.balance, player.ledger.wins, player.ledger.losses
    );
    if game == GameType::Point {
        let _ = write!(out, "\nround: {phase}");
        if let Some(locked) = locked_wager {
            let _ = write!(out, " (${locked} riding)");
        }
    }
    out
}

pub fn history(history: &BetHistory, limit: usize) -> String {
    if history.is_empty() {
        return "no bets yet".to_string();
    }
    let mut out = String::new();
    for record in history.recent_limited(limit) {
        let pick = record
            .bet_type
            .map(|pick| format!(" on {pick}"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{} ${}{pick}, rolled {}",
            record.outcome, record.amount, record.total
        );
    }
    if history.len() > limit {
        let _ = writeln!(out, "... {} older", history.len() - limit);
    }
    out.trim_end().to_string()
}

pub fn leaderboard(leaderboard: &Leaderboard, limit: usize) -> String {
    if leaderboard.is_empty() {
        return "leaderboard is empty".to_string();
    }
    let mut out = String::new();
    for (i, entry) in leaderboard.top(limit).iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {:<32} ${}", i + 1, entry.name, entry.score);
    }
    out.trim_end().to_string()
}
