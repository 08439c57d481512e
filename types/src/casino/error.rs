use thiserror::Error;

use super::{MIN_BET, MAX_NAME_LENGTH};

/// A request rejected before any state was touched.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("bet amount must be a whole number, got {0:?}")]
    NotANumber(String),
    #[error("bet must be at least ${}", MIN_BET)]
    NonPositiveAmount,
    #[error("bet must be between $1 and your current balance (${max})")]
    ExceedsBalance { max: i64 },
    #[error("bet must be between $1 and the table maximum (${max})")]
    ExceedsTableMax { max: u64 },
    #[error("pick even or odd")]
    MissingPick,
    #[error("unknown pick {0:?}, expected even or odd")]
    InvalidPick(String),
    #[error("the ${locked} wager is riding on the point")]
    WagerLocked { locked: u64 },
    #[error("round is over, start the next round first")]
    RoundResolved,
    #[error("name must not be empty")]
    EmptyName,
    #[error("name must be at least {min} characters long")]
    NameTooShort { min: usize },
    #[error("name must be at most {} characters long", MAX_NAME_LENGTH)]
    NameTooLong,
    #[error("name must not start with a number")]
    NameStartsWithDigit,
    #[error("no player registered")]
    NotRegistered,
    #[error("{0} is already playing, exit first")]
    AlreadyRegistered(String),
}

/// Parse a wager typed by the player.
pub fn parse_amount(input: &str) -> Result<u64, ValidationError> {
    let trimmed = input.trim();
    let amount: i128 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotANumber(trimmed.to_string()))?;
    if amount < MIN_BET as i128 {
        return Err(ValidationError::NonPositiveAmount);
    }
    u64::try_from(amount).map_err(|_| ValidationError::NotANumber(trimmed.to_string()))
}

/// Check a registration name, returning the trimmed form.
pub fn validate_name(input: &str, min_len: usize) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let len = name.chars().count();
    if len < min_len {
        return Err(ValidationError::NameTooShort { min: min_len });
    }
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::NameStartsWithDigit);
    }
    Ok(name.to_string())
}
