//! Recording platform double.
//!
//! Records every call in order and answers from configurable state, so tests
//! can assert on exactly what the bot asked the platform to do.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward::error::PlatformError;
use keyward::platform::{ChannelInfo, MessageInfo, Platform, PlatformResult};
use keyward_proto::Permissions;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// One platform call as the bot issued it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Send { channel: String, content: String },
    DeleteMessage { channel: String, message: String },
    Respond { interaction: String, content: String },
    DirectMessage { user: String, content: String },
    GrantRole { user: String, role: String },
    Kick { user: String, reason: String },
    Ban { user: String, reason: String },
    Unban { user: String },
    Timeout { user: String, until: Option<DateTime<Utc>> },
    Lock { channel: String, locked: bool },
    CloneChannel { source: String },
    DeleteChannel { channel: String },
    DeleteMessages { channel: String, ids: Vec<String> },
}

/// Operations a test can make fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    GrantRole,
    Kick,
    Ban,
    DirectMessage,
    Lock,
    DeleteChannel,
}

#[derive(Default)]
pub struct MockPlatform {
    calls: Mutex<Vec<Call>>,
    permissions: Mutex<HashMap<String, Permissions>>,
    channels: Mutex<HashMap<String, ChannelInfo>>,
    history: Mutex<Vec<MessageInfo>>,
    failing: Mutex<HashSet<Op>>,
    next_id: Mutex<u64>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            next_id: Mutex::new(9000),
            ..Default::default()
        }
    }

    pub fn set_permissions(&self, user: &str, perms: Permissions) {
        self.permissions.lock().insert(user.to_string(), perms);
    }

    pub fn add_channel(&self, channel: ChannelInfo) {
        self.channels.lock().insert(channel.id.clone(), channel);
    }

    pub fn set_history(&self, messages: Vec<MessageInfo>) {
        *self.history.lock() = messages;
    }

    pub fn fail(&self, op: Op) {
        self.failing.lock().insert(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Contents of every channel message and interaction response, in order.
    pub fn replies(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Send { content, .. } | Call::Respond { content, .. } => {
                    Some(content.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn last_reply(&self) -> Option<String> {
        self.replies().pop()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn check(&self, op: Op) -> PlatformResult<()> {
        if self.failing.lock().contains(&op) {
            Err(PlatformError::Api {
                status: 403,
                message: "Missing Permissions".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn fresh_id(&self) -> String {
        let mut next = self.next_id.lock();
        *next += 1;
        next.to_string()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn send_message(&self, channel_id: &str, content: &str) -> PlatformResult<String> {
        self.record(Call::Send {
            channel: channel_id.to_string(),
            content: content.to_string(),
        });
        Ok(self.fresh_id())
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> PlatformResult<()> {
        self.record(Call::DeleteMessage {
            channel: channel_id.to_string(),
            message: message_id.to_string(),
        });
        Ok(())
    }

    async fn respond_interaction(
        &self,
        interaction_id: &str,
        _token: &str,
        content: &str,
    ) -> PlatformResult<()> {
        self.record(Call::Respond {
            interaction: interaction_id.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }

    async fn send_direct_message(&self, user_id: &str, content: &str) -> PlatformResult<()> {
        self.check(Op::DirectMessage)?;
        self.record(Call::DirectMessage {
            user: user_id.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }

    async fn member_permissions(
        &self,
        _guild_id: &str,
        user_id: &str,
    ) -> PlatformResult<Permissions> {
        Ok(self
            .permissions
            .lock()
            .get(user_id)
            .copied()
            .unwrap_or(Permissions::NONE))
    }

    async fn grant_role(&self, _guild_id: &str, user_id: &str, role_id: &str) -> PlatformResult<()> {
        self.check(Op::GrantRole)?;
        self.record(Call::GrantRole {
            user: user_id.to_string(),
            role: role_id.to_string(),
        });
        Ok(())
    }

    async fn kick_member(&self, _guild_id: &str, user_id: &str, reason: &str) -> PlatformResult<()> {
        self.check(Op::Kick)?;
        self.record(Call::Kick {
            user: user_id.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn ban_member(&self, _guild_id: &str, user_id: &str, reason: &str) -> PlatformResult<()> {
        self.check(Op::Ban)?;
        self.record(Call::Ban {
            user: user_id.to_string(),
            reason: reason.to_string(),
        });
        Ok(())
    }

    async fn unban_member(&self, _guild_id: &str, user_id: &str) -> PlatformResult<()> {
        self.record(Call::Unban {
            user: user_id.to_string(),
        });
        Ok(())
    }

    async fn timeout_member(
        &self,
        _guild_id: &str,
        user_id: &str,
        until: Option<DateTime<Utc>>,
        _reason: Option<&str>,
    ) -> PlatformResult<()> {
        self.record(Call::Timeout {
            user: user_id.to_string(),
            until,
        });
        Ok(())
    }

    async fn set_channel_locked(
        &self,
        _guild_id: &str,
        channel_id: &str,
        locked: bool,
    ) -> PlatformResult<()> {
        self.check(Op::Lock)?;
        self.record(Call::Lock {
            channel: channel_id.to_string(),
            locked,
        });
        Ok(())
    }

    async fn fetch_channel(&self, channel_id: &str) -> PlatformResult<Option<ChannelInfo>> {
        Ok(self.channels.lock().get(channel_id).cloned())
    }

    async fn clone_channel(&self, channel: &ChannelInfo) -> PlatformResult<String> {
        self.record(Call::CloneChannel {
            source: channel.id.clone(),
        });
        let new_id = self.fresh_id();
        let mut copy = channel.clone();
        copy.id = new_id.clone();
        self.channels.lock().insert(new_id.clone(), copy);
        Ok(new_id)
    }

    async fn delete_channel(&self, channel_id: &str) -> PlatformResult<()> {
        self.check(Op::DeleteChannel)?;
        self.record(Call::DeleteChannel {
            channel: channel_id.to_string(),
        });
        self.channels.lock().remove(channel_id);
        Ok(())
    }

    async fn recent_messages(
        &self,
        _channel_id: &str,
        limit: u32,
    ) -> PlatformResult<Vec<MessageInfo>> {
        let history = self.history.lock();
        Ok(history.iter().take(limit as usize).cloned().collect())
    }

    async fn delete_messages(
        &self,
        channel_id: &str,
        message_ids: &[String],
    ) -> PlatformResult<usize> {
        self.record(Call::DeleteMessages {
            channel: channel_id.to_string(),
            ids: message_ids.to_vec(),
        });
        Ok(message_ids.len())
    }
}
