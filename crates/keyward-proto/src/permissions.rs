//! Guild permission bit set.
//!
//! Bit positions follow the platform's documented permission flags. The
//! platform transmits permission sets as decimal strings, and bits this crate
//! does not name are carried through untouched.

use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// A set of guild permissions.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Permissions: u64 {
        /// Kick members.
        const KICK_MEMBERS = 1 << 1;
        /// Ban members.
        const BAN_MEMBERS = 1 << 2;
        /// Administrator; implies every other permission.
        const ADMINISTRATOR = 1 << 3;
        /// Manage channels.
        const MANAGE_CHANNELS = 1 << 4;
        /// View channel.
        const VIEW_CHANNEL = 1 << 10;
        /// Send messages.
        const SEND_MESSAGES = 1 << 11;
        /// Manage (delete) messages of others.
        const MANAGE_MESSAGES = 1 << 13;
        /// Manage roles.
        const MANAGE_ROLES = 1 << 28;
        /// Time members out.
        const MODERATE_MEMBERS = 1 << 40;

        const _ = !0;
    }
}

impl Permissions {
    /// No permissions.
    pub const NONE: Permissions = Permissions::empty();
    /// Every bit set, named or not.
    pub const ALL: Permissions = Permissions::from_bits_retain(u64::MAX);

    const NAMES: [(Permissions, &'static str); 9] = [
        (Self::KICK_MEMBERS, "Kick Members"),
        (Self::BAN_MEMBERS, "Ban Members"),
        (Self::ADMINISTRATOR, "Administrator"),
        (Self::MANAGE_CHANNELS, "Manage Channels"),
        (Self::VIEW_CHANNEL, "View Channel"),
        (Self::SEND_MESSAGES, "Send Messages"),
        (Self::MANAGE_MESSAGES, "Manage Messages"),
        (Self::MANAGE_ROLES, "Manage Roles"),
        (Self::MODERATE_MEMBERS, "Moderate Members"),
    ];

    /// True when `self` grants `required`, honouring administrator.
    pub const fn allows(self, required: Permissions) -> bool {
        self.contains(Self::ADMINISTRATOR) || self.contains(required)
    }
}

impl FromStr for Permissions {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Permissions::from_bits_retain)
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join(", "))
        }
    }
}
