//! Integration test common infrastructure.
//!
//! Provides a recording platform double and an in-process bot harness for
//! driving commands end to end without a network.

pub mod harness;
pub mod platform;

#[allow(unused_imports)]
pub use harness::{ADMIN, BUYER_ROLE, CHANNEL, GUILD, MEMBER, TestBot};
#[allow(unused_imports)]
pub use platform::{Call, MockPlatform, Op};
