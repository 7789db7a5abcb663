//! Gateway - the WebSocket event stream from the platform.
//!
//! One session: connect, wait for Hello, Identify, then heartbeat on the
//! server's interval while dispatch events are handed to the router on their
//! own tasks. When a session ends for any reason the client waits the
//! configured delay and starts a fresh one. Sessions are never resumed.

use futures_util::{SinkExt, StreamExt};
use keyward_proto::gateway::{self, DispatchEvent, GatewayFrame, Intents, OpCode};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{Instrument, debug, info, warn};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::handlers::Router;
use crate::telemetry::spans;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for Hello after connecting.
const HELLO_TIMEOUT: Duration = Duration::from_secs(30);

/// Why a session ended without an error.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    Closed,
    Reconnect(&'static str),
}

/// What to do with one received frame.
#[derive(Debug)]
enum FrameAction {
    Dispatch(DispatchEvent),
    HeartbeatNow,
    Ack,
    End(SessionEnd),
    Ignore,
}

/// Gateway client. Runs sessions back to back for the life of the process.
pub struct GatewayClient {
    config: GatewayConfig,
    token: String,
    router: Arc<Router>,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig, token: impl Into<String>, router: Arc<Router>) -> Self {
        Self {
            config,
            token: token.into(),
            router,
        }
    }

    /// Run sessions forever, reconnecting after each one ends.
    pub async fn run(self) {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            let result = self
                .session()
                .instrument(spans::gateway_session(attempt))
                .await;
            match result {
                Ok(SessionEnd::Closed) => info!(attempt, "Gateway closed the connection"),
                Ok(SessionEnd::Reconnect(reason)) => info!(attempt, reason, "Gateway reconnect"),
                Err(e) => warn!(attempt, error = %e, code = e.error_code(), "Gateway session failed"),
            }
            tokio::time::sleep(self.config.reconnect_delay()).await;
        }
    }

    async fn session(&self) -> Result<SessionEnd, GatewayError> {
        let (mut socket, _response) = connect_async(self.config.url.as_str()).await?;
        info!(url = %self.config.url, "Gateway connected");

        let hello = match timeout(HELLO_TIMEOUT, socket.next()).await {
            Err(_) => return Err(GatewayError::Timeout("hello")),
            Ok(None) => return Ok(SessionEnd::Closed),
            Ok(Some(msg)) => read_hello(msg?)?,
        };
        let period = Duration::from_millis(hello.heartbeat_interval);
        debug!(interval_ms = hello.heartbeat_interval, "Hello received");

        socket
            .send(Message::Text(gateway::identify(&self.token, Intents::bot_default())))
            .await?;

        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_sequence: Option<u64> = None;
        let mut awaiting_ack = false;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if awaiting_ack {
                        return Ok(SessionEnd::Reconnect("heartbeat not acknowledged"));
                    }
                    send_heartbeat(&mut socket, last_sequence).await?;
                    awaiting_ack = true;
                }
                msg = socket.next() => {
                    let text = match msg {
                        None => return Ok(SessionEnd::Closed),
                        Some(Err(e)) => return Err(e.into()),
                        Some(Ok(Message::Text(text))) => text,
                        Some(Ok(Message::Close(frame))) => {
                            debug!(?frame, "Close frame received");
                            return Ok(SessionEnd::Closed);
                        }
                        Some(Ok(_)) => continue,
                    };

                    let frame = match GatewayFrame::parse(&text) {
                        Ok(frame) => frame,
                        Err(e) => {
                            warn!(error = %e, "Undecodable gateway frame");
                            continue;
                        }
                    };
                    if let Some(s) = frame.s {
                        last_sequence = Some(s);
                    }

                    match classify(&frame) {
                        FrameAction::Dispatch(event) => self.spawn_dispatch(event),
                        FrameAction::HeartbeatNow => send_heartbeat(&mut socket, last_sequence).await?,
                        FrameAction::Ack => awaiting_ack = false,
                        FrameAction::End(end) => return Ok(end),
                        FrameAction::Ignore => {}
                    }
                }
            }
        }
    }

    fn spawn_dispatch(&self, event: DispatchEvent) {
        let router = Arc::clone(&self.router);
        tokio::spawn(async move {
            let name = event.name().to_string();
            if let Err(e) = router.on_event(event).await {
                warn!(event = %name, error = %e, code = e.error_code(), "Event handling failed");
            }
        });
    }
}

fn read_hello(msg: Message) -> Result<gateway::Hello, GatewayError> {
    let Message::Text(text) = msg else {
        return Err(GatewayError::Handshake {
            expected: "hello",
            got: "non-text message".to_string(),
        });
    };
    let frame = GatewayFrame::parse(&text)?;
    if frame.opcode() != OpCode::Hello {
        return Err(GatewayError::Handshake {
            expected: "hello",
            got: frame.opcode().to_string(),
        });
    }
    let hello = frame.hello()?;
    if hello.heartbeat_interval == 0 {
        return Err(GatewayError::Handshake {
            expected: "non-zero heartbeat interval",
            got: "0".to_string(),
        });
    }
    Ok(hello)
}

async fn send_heartbeat(socket: &mut Socket, last_sequence: Option<u64>) -> Result<(), GatewayError> {
    socket
        .send(Message::Text(gateway::heartbeat(last_sequence)))
        .await?;
    Ok(())
}

fn classify(frame: &GatewayFrame) -> FrameAction {
    match frame.opcode() {
        OpCode::Dispatch => match DispatchEvent::from_frame(frame) {
            Ok(Some(event)) => FrameAction::Dispatch(event),
            Ok(None) => FrameAction::Ignore,
            Err(e) => {
                warn!(event = ?frame.t, error = %e, "Undecodable dispatch");
                FrameAction::Ignore
            }
        },
        OpCode::Heartbeat => FrameAction::HeartbeatNow,
        OpCode::HeartbeatAck => FrameAction::Ack,
        OpCode::Reconnect => FrameAction::End(SessionEnd::Reconnect("server requested reconnect")),
        OpCode::InvalidSession => FrameAction::End(SessionEnd::Reconnect("invalid session")),
        other => {
            debug!(op = %other, "Ignoring gateway opcode");
            FrameAction::Ignore
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(json: &str) -> FrameAction {
        classify(&GatewayFrame::parse(json).unwrap())
    }

    #[test]
    fn control_opcodes() {
        assert!(matches!(action(r#"{"op":1,"d":null}"#), FrameAction::HeartbeatNow));
        assert!(matches!(action(r#"{"op":11}"#), FrameAction::Ack));
        assert!(matches!(
            action(r#"{"op":7,"d":null}"#),
            FrameAction::End(SessionEnd::Reconnect(_))
        ));
        assert!(matches!(
            action(r#"{"op":9,"d":false}"#),
            FrameAction::End(SessionEnd::Reconnect(_))
        ));
        assert!(matches!(action(r#"{"op":42}"#), FrameAction::Ignore));
    }

    #[test]
    fn dispatches_are_decoded() {
        let json = r#"{"op":0,"s":5,"t":"MESSAGE_CREATE","d":{
            "id":"1","channel_id":"2","guild_id":"3",
            "author":{"id":"4","username":"a"},"content":".help"}}"#;
        match action(json) {
            FrameAction::Dispatch(DispatchEvent::MessageCreate(msg)) => {
                assert_eq!(msg.content, ".help")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn broken_dispatch_is_ignored() {
        let json = r#"{"op":0,"s":5,"t":"MESSAGE_CREATE","d":{"id":1}}"#;
        assert!(matches!(action(json), FrameAction::Ignore));
    }

    #[test]
    fn hello_must_come_first() {
        let ok = read_hello(Message::Text(
            r#"{"op":10,"d":{"heartbeat_interval":45000}}"#.to_string(),
        ))
        .unwrap();
        assert_eq!(ok.heartbeat_interval, 45000);

        let err = read_hello(Message::Text(r#"{"op":11}"#.to_string())).unwrap_err();
        assert!(matches!(err, GatewayError::Handshake { .. }));
    }

    #[test]
    fn zero_heartbeat_interval_is_refused() {
        let err = read_hello(Message::Text(
            r#"{"op":10,"d":{"heartbeat_interval":0}}"#.to_string(),
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Handshake { expected: "non-zero heartbeat interval", .. }
        ));
    }
}
