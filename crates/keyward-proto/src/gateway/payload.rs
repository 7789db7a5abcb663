//! Gateway frames and connection-setup payloads.

use super::opcode::OpCode;
use crate::error::Result;
use serde::Deserialize;
use serde_json::{json, Value};

/// A raw gateway frame.
#[derive(Clone, Debug, Deserialize)]
pub struct GatewayFrame {
    /// Opcode.
    pub op: u8,
    /// Event data; `null` for frames without a body.
    #[serde(default)]
    pub d: Value,
    /// Sequence number, present on dispatches.
    #[serde(default)]
    pub s: Option<u64>,
    /// Event name, present on dispatches.
    #[serde(default)]
    pub t: Option<String>,
}

impl GatewayFrame {
    /// Decode a text frame.
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Typed opcode.
    pub fn opcode(&self) -> OpCode {
        OpCode::from(self.op)
    }

    /// Decode the body of a Hello frame.
    pub fn hello(&self) -> Result<Hello> {
        Ok(Hello::deserialize(&self.d)?)
    }
}

/// Body of the Hello frame.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct Hello {
    /// Milliseconds between heartbeats.
    pub heartbeat_interval: u64,
}

/// Gateway intents bit set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Intents(pub u64);

impl Intents {
    /// Guild lifecycle and channel events.
    pub const GUILDS: Intents = Intents(1 << 0);
    /// Member add/update/remove (privileged).
    pub const GUILD_MEMBERS: Intents = Intents(1 << 1);
    /// Guild message events.
    pub const GUILD_MESSAGES: Intents = Intents(1 << 9);
    /// Message content in message events (privileged).
    pub const MESSAGE_CONTENT: Intents = Intents(1 << 15);

    /// The intents the bot identifies with.
    pub const fn bot_default() -> Intents {
        Intents(
            Self::GUILDS.0 | Self::GUILD_MEMBERS.0 | Self::GUILD_MESSAGES.0 | Self::MESSAGE_CONTENT.0,
        )
    }
}

/// Build an Identify frame.
pub fn identify(token: &str, intents: Intents) -> String {
    json!({
        "op": OpCode::Identify.code(),
        "d": {
            "token": token,
            "intents": intents.0,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "keyward",
                "device": "keyward",
            },
        },
    })
    .to_string()
}

/// Build a Heartbeat frame carrying the last sequence number seen.
pub fn heartbeat(last_sequence: Option<u64>) -> String {
    json!({
        "op": OpCode::Heartbeat.code(),
        "d": last_sequence,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hello() {
        let frame =
            GatewayFrame::parse(r#"{"op":10,"d":{"heartbeat_interval":41250},"s":null,"t":null}"#)
                .unwrap();
        assert_eq!(frame.opcode(), OpCode::Hello);
        assert_eq!(frame.hello().unwrap().heartbeat_interval, 41250);
    }

    #[test]
    fn frame_without_body() {
        let frame = GatewayFrame::parse(r#"{"op":11}"#).unwrap();
        assert_eq!(frame.opcode(), OpCode::HeartbeatAck);
        assert!(frame.d.is_null());
        assert!(frame.s.is_none());
    }

    #[test]
    fn heartbeat_carries_sequence() {
        let v: Value = serde_json::from_str(&heartbeat(Some(7))).unwrap();
        assert_eq!(v["op"], 1);
        assert_eq!(v["d"], 7);

        let v: Value = serde_json::from_str(&heartbeat(None)).unwrap();
        assert!(v["d"].is_null());
    }

    #[test]
    fn identify_carries_token_and_intents() {
        let v: Value = serde_json::from_str(&identify("secret", Intents::bot_default())).unwrap();
        assert_eq!(v["op"], 2);
        assert_eq!(v["d"]["token"], "secret");
        assert_eq!(v["d"]["intents"], 33283);
    }
}
