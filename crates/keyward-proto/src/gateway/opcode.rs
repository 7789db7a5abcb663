//! Gateway opcodes.

use std::fmt;

/// Gateway opcode carried in the `op` field of every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum OpCode {
    /// An event was dispatched.
    Dispatch,
    /// Keepalive, sent by the client or requested by the server.
    Heartbeat,
    /// Start a new session.
    Identify,
    /// Resume a previous session.
    Resume,
    /// The server asks the client to reconnect.
    Reconnect,
    /// The session was invalidated.
    InvalidSession,
    /// First frame after connecting; carries the heartbeat interval.
    Hello,
    /// Heartbeat acknowledged.
    HeartbeatAck,
    /// Any opcode this crate does not model.
    Unknown(u8),
}

impl OpCode {
    /// Wire value.
    pub fn code(&self) -> u8 {
        match self {
            Self::Dispatch => 0,
            Self::Heartbeat => 1,
            Self::Identify => 2,
            Self::Resume => 6,
            Self::Reconnect => 7,
            Self::InvalidSession => 9,
            Self::Hello => 10,
            Self::HeartbeatAck => 11,
            Self::Unknown(code) => *code,
        }
    }
}

impl From<u8> for OpCode {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Dispatch,
            1 => Self::Heartbeat,
            2 => Self::Identify,
            6 => Self::Resume,
            7 => Self::Reconnect,
            9 => Self::InvalidSession,
            10 => Self::Hello,
            11 => Self::HeartbeatAck,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown opcode {}", code),
            known => write!(f, "{:?}", known),
        }
    }
}
