//! Gateway payload types.
//!
//! The gateway speaks JSON frames of the shape `{"op", "d", "s", "t"}`. This
//! module covers the subset the bot needs: connection setup (hello,
//! identify, heartbeat) and the dispatch events it reacts to.

mod events;
mod opcode;
mod payload;

pub use self::events::{
    ChannelMessage, DispatchEvent, Interaction, InteractionData, InteractionMember,
    InteractionOption, Member, Ready, User, INTERACTION_APPLICATION_COMMAND,
};
pub use self::opcode::OpCode;
pub use self::payload::{heartbeat, identify, GatewayFrame, Hello, Intents};
