//! Key records and expirations.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::duration::LIFETIME_TOKEN;

/// When a key stops being valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Expiration {
    /// Never expires.
    Lifetime,
    /// Expires once the current time passes this instant.
    At(DateTime<Utc>),
}

impl Expiration {
    /// True when a sweep at `now` should remove the record.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Self::Lifetime => false,
            Self::At(at) => *at <= now,
        }
    }

    /// Store encoding: `L` or an RFC 3339 timestamp.
    fn encode(&self) -> String {
        match self {
            Self::Lifetime => LIFETIME_TOKEN.to_string(),
            Self::At(at) => at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lifetime => f.write_str("Lifetime"),
            Self::At(at) => write!(f, "{}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        }
    }
}

impl FromStr for Expiration {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == LIFETIME_TOKEN {
            return Ok(Self::Lifetime);
        }
        DateTime::parse_from_rfc3339(s).map(|at| Self::At(at.with_timezone(&Utc)))
    }
}

impl Serialize for Expiration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Expiration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One redemption: who holds which key until when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Redeeming account id.
    pub user: String,
    /// The redemption code, treated as an opaque token.
    pub key: String,
    /// Expiry policy.
    pub expiration: Expiration,
}

impl KeyRecord {
    /// A record of `user` holding `key` until `expiration`.
    pub fn new(user: impl Into<String>, key: impl Into<String>, expiration: Expiration) -> Self {
        Self {
            user: user.into(),
            key: key.into(),
            expiration,
        }
    }
}
