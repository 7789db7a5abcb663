//! # keyward-proto
//!
//! Wire-level building blocks for the keyward moderation bot.
//!
//! ## Features
//!
//! - Text command grammar: command tokens, argument parsing and usage lines
//! - User mention parsing (`<@id>` / `<@!id>`)
//! - Guild permission bit set with administrator implication
//! - Gateway payload types: opcodes, hello, identify, heartbeat and the
//!   dispatch events the bot consumes
//!
//! ## Quick Start
//!
//! ```rust
//! use keyward_proto::{Command, CommandName};
//!
//! let line = ".give 1234 ABC-123 7day";
//! let (name, args) = CommandName::split(line).expect("known command");
//! assert_eq!(name, CommandName::Give);
//!
//! let cmd = Command::parse(name, &args).expect("valid arguments");
//! assert_eq!(
//!     cmd,
//!     Command::Give {
//!         user_id: "1234".to_string(),
//!         key: "ABC-123".to_string(),
//!         duration: "7day".to_string(),
//!     }
//! );
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod gateway;
pub mod mention;
pub mod permissions;

pub use self::command::{Command, CommandName};
pub use self::error::{ParseError, Result};
pub use self::mention::{normalize_user_arg, parse_user_mention};
pub use self::permissions::Permissions;
