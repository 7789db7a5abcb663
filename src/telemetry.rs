//! Telemetry utilities for command timing and span construction.

use std::time::Instant;
use tracing::debug;

/// Guard for timing command execution.
///
/// Logs the command latency when dropped.
pub struct CommandTimer {
    command: &'static str,
    start: Instant,
}

impl CommandTimer {
    /// Start timing a command.
    pub fn new(command: &'static str) -> Self {
        Self {
            command,
            start: Instant::now(),
        }
    }
}

impl Drop for CommandTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        debug!(command = self.command, elapsed_ms, "Command finished");
    }
}

/// Standardized span constructors.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for a command execution.
    pub fn command(name: &str, user: &str, channel: &str) -> Span {
        info_span!("command", name = %name, user = %user, channel = %channel)
    }

    /// Create a span for one gateway connection attempt.
    pub fn gateway_session(attempt: u64) -> Span {
        info_span!("gateway", attempt)
    }
}
