mod codec;
mod constants;
mod error;
mod game;
mod history;
mod leaderboard;
mod player;

pub use codec::{read_int, read_json, write_int, write_json, CodecError};
pub use constants::*;
pub use error::{parse_amount, validate_name, ValidationError};
pub use game::*;
pub use history::*;
pub use leaderboard::*;
pub use player::*;
