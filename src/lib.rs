//! keyward - moderation and key-redemption bot.
//!
//! The core is the key [`Ledger`](keys::Ledger): redeemed product keys with
//! their expirations, persisted after every change and swept on a timer.
//! Around it sit the text and slash command [`handlers`], the chat
//! [`platform`] REST client and the [`network`] gateway session that feeds
//! them events.

pub mod config;
pub mod error;
pub mod handlers;
pub mod keys;
pub mod network;
pub mod platform;
pub mod telemetry;
