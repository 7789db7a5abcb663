//! Text command grammar.
//!
//! Commands are a single leading token (`.kick`, `/redeem`, ...) followed by
//! whitespace-separated arguments. The trailing words of moderation commands
//! form a free-text reason.

mod parse;
mod types;

pub use self::parse::parse_minutes;
pub use self::types::{Command, CommandName, DEFAULT_REASON};
