//! In-process bot harness.
//!
//! Wires a [`Router`] to a [`MockPlatform`] and a memory-backed ledger, and
//! builds gateway events the way the platform would deliver them.

use keyward::config::Config;
use keyward::handlers::{Router, Services};
use keyward::keys::{Ledger, MemoryStore};
use keyward_proto::Permissions;
use keyward_proto::gateway::{ChannelMessage, Interaction};
use serde_json::{Value, json};
use std::sync::Arc;

use super::platform::MockPlatform;

pub const GUILD: &str = "500";
pub const CHANNEL: &str = "600";
pub const BUYER_ROLE: &str = "700";
pub const ADMIN: &str = "11";
pub const MEMBER: &str = "22";

pub struct TestBot {
    pub router: Router,
    pub platform: Arc<MockPlatform>,
    pub store: Arc<MemoryStore>,
    pub ledger: Arc<Ledger>,
}

impl TestBot {
    pub fn new() -> Self {
        Self::with_config("")
    }

    /// Build a bot whose config is the test `[bot]` block plus `extra`.
    pub fn with_config(extra: &str) -> Self {
        let text = format!(
            r#"
[bot]
token = "test-token"
application_id = "100"
guild_id = "{GUILD}"
buyer_role_id = "{BUYER_ROLE}"
{extra}
"#
        );
        let config: Config = toml::from_str(&text).expect("valid test config");

        let platform = Arc::new(MockPlatform::new());
        platform.set_permissions(ADMIN, Permissions::ADMINISTRATOR);

        let store = Arc::new(MemoryStore::new());
        let ledger = Arc::new(Ledger::open(Box::new(Arc::clone(&store))).expect("memory store loads"));
        let services = Services::new(platform.clone(), Arc::clone(&ledger), Arc::new(config));

        Self {
            router: Router::new(services),
            platform,
            store,
            ledger,
        }
    }

    /// Deliver a guild text message from `author`.
    pub async fn say(&self, author: &str, content: &str) {
        self.say_with(author, content, &[], &[]).await;
    }

    /// Deliver a guild text message with mentions and author roles.
    pub async fn say_with(&self, author: &str, content: &str, mentions: &[&str], roles: &[&str]) {
        let mut message = Self::message(author, content);
        message["mentions"] = mentions
            .iter()
            .map(|id| json!({"id": id, "username": format!("user{id}")}))
            .collect();
        message["member"] = json!({"roles": roles});
        self.deliver(message).await;
    }

    /// A guild text message payload, for tests that adjust fields before
    /// delivering it.
    pub fn message(author: &str, content: &str) -> Value {
        json!({
            "id": "1",
            "channel_id": CHANNEL,
            "guild_id": GUILD,
            "author": {"id": author, "username": format!("user{author}")},
            "member": {"roles": []},
            "content": content,
            "mentions": [],
        })
    }

    /// Deliver a raw message payload.
    pub async fn deliver(&self, message: Value) {
        let message: ChannelMessage = serde_json::from_value(message).expect("valid message");
        // Failures have already been answered; tests assert on replies.
        let _ = self.router.on_message(message).await;
    }

    /// Invoke `/redeem` with the given options.
    pub async fn redeem(&self, user: &str, key: Option<&str>, duration: Option<&str>) {
        let mut options = Vec::new();
        if let Some(key) = key {
            options.push(json!({"name": "key", "type": 3, "value": key}));
        }
        if let Some(duration) = duration {
            options.push(json!({"name": "duration", "type": 3, "value": duration}));
        }
        let interaction: Interaction = serde_json::from_value(json!({
            "id": "800",
            "application_id": "100",
            "type": 2,
            "token": "itoken",
            "guild_id": GUILD,
            "channel_id": CHANNEL,
            "member": {
                "user": {"id": user, "username": format!("user{user}")},
                "roles": [],
                "permissions": "0",
            },
            "data": {"id": "900", "name": "redeem", "options": options},
        }))
        .expect("valid interaction");
        let _ = self.router.on_interaction(interaction).await;
    }
}
