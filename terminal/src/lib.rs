use commonware_utils::from_hex_formatted;
use dicehouse_execution::TableRules;
use dicehouse_types::casino::{
    GameType, HISTORY_DISPLAY_LIMIT, LEADERBOARD_DISPLAY_LIMIT, MAX_NAME_LENGTH,
    MIN_NAME_LENGTH, TABLE_MAX_BET,
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;
use tracing::Level;

pub mod render;

/// Configuration for a `dicehouse` table.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_game")]
    pub game: GameType,
    /// Defaults to the table's own starting balance when unset.
    #[serde(default)]
    pub starting_balance: Option<u64>,
    #[serde(default = "default_table_max_bet")]
    pub table_max_bet: u64,
    #[serde(default = "default_min_name_length")]
    pub min_name_length: usize,

    #[serde(default = "default_history_display_limit")]
    pub history_display_limit: usize,
    #[serde(default = "default_leaderboard_display_limit")]
    pub leaderboard_display_limit: usize,

    #[serde(default = "default_directory")]
    pub directory: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json_logs: bool,

    /// Hex-encoded 32-byte seed. Dice are deterministic when set.
    #[serde(default)]
    pub seed: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{field} must be hex: {value}")]
    InvalidHex { field: &'static str, value: String },
    #[error("{field} must be {expected} bytes (got {actual})")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid log level: {value}")]
    InvalidLogLevel { value: String },
    #[error("{field} must be > 0 (got {value})")]
    InvalidNonZero { field: &'static str, value: u64 },
    #[error("{field} must be at most {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

pub struct ValidatedConfig {
    pub rules: TableRules,

    pub history_display_limit: usize,
    pub leaderboard_display_limit: usize,

    pub directory: PathBuf,
    pub log_level: Level,
    pub json_logs: bool,

    pub seed: Option<[u8; 32]>,
}

fn default_game() -> GameType {
    GameType::Parity
}

fn default_table_max_bet() -> u64 {
    TABLE_MAX_BET
}

fn default_min_name_length() -> usize {
    MIN_NAME_LENGTH
}

fn default_history_display_limit() -> usize {
    HISTORY_DISPLAY_LIMIT
}

fn default_leaderboard_display_limit() -> usize {
    LEADERBOARD_DISPLAY_LIMIT
}

fn default_directory() -> String {
    ".dicehouse".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn parse_seed(field: &'static str, value: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = from_hex_formatted(value).ok_or(ConfigError::InvalidHex {
        field,
        value: value.to_string(),
    })?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| ConfigError::InvalidLength {
        field,
        expected: 32,
        actual,
    })
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidNonZero { field, value });
    }
    Ok(())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game: default_game(),
            starting_balance: None,
            table_max_bet: default_table_max_bet(),
            min_name_length: default_min_name_length(),
            history_display_limit: default_history_display_limit(),
            leaderboard_display_limit: default_leaderboard_display_limit(),
            directory: default_directory(),
            log_level: default_log_level(),
            json_logs: false,
            seed: None,
        }
    }
}

impl Config {
    /// Read a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not a map
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        non_zero("table_max_bet", self.table_max_bet)?;
        // Balances are signed, so a wager must fit in one
        if self.table_max_bet > i64::MAX as u64 {
            return Err(ConfigError::OutOfRange {
                field: "table_max_bet",
                value: self.table_max_bet,
                max: i64::MAX as u64,
            });
        }
        non_zero("min_name_length", self.min_name_length as u64)?;
        if self.min_name_length > MAX_NAME_LENGTH {
            return Err(ConfigError::OutOfRange {
                field: "min_name_length",
                value: self.min_name_length as u64,
                max: MAX_NAME_LENGTH as u64,
            });
        }
        non_zero("history_display_limit", self.history_display_limit as u64)?;
        non_zero(
            "leaderboard_display_limit",
            self.leaderboard_display_limit as u64,
        )?;

        let mut rules = TableRules::new(self.game);
        rules.table_max_bet = self.table_max_bet;
        rules.min_name_length = self.min_name_length;
        if let Some(starting_balance) = self.starting_balance {
            non_zero("starting_balance", starting_balance)?;
            rules.starting_balance =
                i64::try_from(starting_balance).map_err(|_| ConfigError::OutOfRange {
                    field: "starting_balance",
                    value: starting_balance,
                    max: i64::MAX as u64,
                })?;
        }

        let log_level =
            Level::from_str(&self.log_level).map_err(|_| ConfigError::InvalidLogLevel {
                value: self.log_level.clone(),
            })?;

        let seed = self
            .seed
            .as_deref()
            .map(|seed| parse_seed("seed", seed))
            .transpose()?;

        Ok(ValidatedConfig {
            rules,
            history_display_limit: self.history_display_limit,
            leaderboard_display_limit: self.leaderboard_display_limit,
            directory: PathBuf::from(self.directory),
            log_level,
            json_logs: self.json_logs,
            seed,
        })
    }
}
