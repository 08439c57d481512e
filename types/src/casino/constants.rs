/// Minimum name length for player registration
pub const MIN_NAME_LENGTH: usize = 5;

/// Maximum name length for player registration
pub const MAX_NAME_LENGTH: usize = 32;

/// Starting balance for the parity table
pub const PARITY_STARTING_BALANCE: i64 = 1_000;

/// Starting balance for the point table
pub const POINT_STARTING_BALANCE: i64 = 100;

/// Fixed maximum wager accepted by the point table
pub const TABLE_MAX_BET: u64 = 100;

/// Smallest wager any table accepts
pub const MIN_BET: u64 = 1;

/// Numbers that can become the point on a come-out roll
pub const POINT_NUMBERS: [u8; 6] = [4, 5, 6, 8, 9, 10];

/// Default number of history rows shown to the player
pub const HISTORY_DISPLAY_LIMIT: usize = 20;

/// Default number of leaderboard rows shown to the player
pub const LEADERBOARD_DISPLAY_LIMIT: usize = 10;
