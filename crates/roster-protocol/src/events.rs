//! Presence event types.
//!
//! Events are the unit of input for the presence store. Each variant carries
//! the arguments already extracted from one protocol line.

use crate::mask::Identity;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event kind identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Welcome,
    Join,
    Part,
    Kick,
    Quit,
    Nick,
    Names,
    Who,
    Mode,
    Disconnected,
}

impl EventKind {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Welcome => "welcome",
            EventKind::Join => "join",
            EventKind::Part => "part",
            EventKind::Kick => "kick",
            EventKind::Quit => "quit",
            EventKind::Nick => "nick",
            EventKind::Names => "names",
            EventKind::Who => "who",
            EventKind::Mode => "mode",
            EventKind::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A channel operator status change carried by a `MODE` line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpChange {
    /// Affected nickname.
    pub nick: String,
    /// `true` for `+o`, `false` for `-o`.
    pub granted: bool,
}

/// A presence event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Registration completed (numeric 001); `nick` is our accepted nickname.
    Welcome {
        /// Our nickname as the server knows it.
        nick: String,
    },

    /// A user joined a channel.
    Join {
        /// The joining user.
        who: Identity,
        /// Channel name.
        channel: String,
    },

    /// A user left a channel.
    Part {
        /// The departing user.
        who: Identity,
        /// Channel name.
        channel: String,
    },

    /// A user was removed from a channel by someone else.
    Kick {
        /// Channel name.
        channel: String,
        /// The kicked nickname.
        nick: String,
    },

    /// A user disconnected from the network.
    Quit {
        /// The quitting user.
        who: Identity,
    },

    /// A user changed nickname.
    Nick {
        /// The user under the old nickname.
        who: Identity,
        /// The new nickname.
        new_nick: String,
    },

    /// One line of a names reply (numeric 353).
    Names {
        /// Channel name.
        channel: String,
        /// Space-delimited nicknames with optional privilege markers.
        nicknames: String,
    },

    /// One line of a who reply (numeric 352).
    Who {
        /// Channel name.
        channel: String,
        /// Nickname.
        nick: String,
        /// Username.
        user: String,
        /// Hostname.
        host: String,
    },

    /// Channel operator status changes.
    Mode {
        /// Channel name.
        channel: String,
        /// `+o` / `-o` changes in line order.
        changes: Vec<OpChange>,
    },

    /// The server closed the link.
    Disconnected,
}

impl Event {
    /// Get the event kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Welcome { .. } => EventKind::Welcome,
            Event::Join { .. } => EventKind::Join,
            Event::Part { .. } => EventKind::Part,
            Event::Kick { .. } => EventKind::Kick,
            Event::Quit { .. } => EventKind::Quit,
            Event::Nick { .. } => EventKind::Nick,
            Event::Names { .. } => EventKind::Names,
            Event::Who { .. } => EventKind::Who,
            Event::Mode { .. } => EventKind::Mode,
            Event::Disconnected => EventKind::Disconnected,
        }
    }

    /// Channel the event is scoped to, if any.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        match self {
            Event::Join { channel, .. }
            | Event::Part { channel, .. }
            | Event::Kick { channel, .. }
            | Event::Names { channel, .. }
            | Event::Who { channel, .. }
            | Event::Mode { channel, .. } => Some(channel),
            Event::Welcome { .. } | Event::Quit { .. } | Event::Nick { .. } | Event::Disconnected => {
                None
            }
        }
    }

    /// Create a new Join event.
    #[must_use]
    pub fn join(who: Identity, channel: impl Into<String>) -> Self {
        Event::Join {
            who,
            channel: channel.into(),
        }
    }

    /// Create a new Part event.
    #[must_use]
    pub fn part(who: Identity, channel: impl Into<String>) -> Self {
        Event::Part {
            who,
            channel: channel.into(),
        }
    }

    /// Create a new Quit event.
    #[must_use]
    pub fn quit(who: Identity) -> Self {
        Event::Quit { who }
    }

    /// Create a new Names event.
    #[must_use]
    pub fn names(channel: impl Into<String>, nicknames: impl Into<String>) -> Self {
        Event::Names {
            channel: channel.into(),
            nicknames: nicknames.into(),
        }
    }

    /// Create a new Who event.
    #[must_use]
    pub fn who(
        channel: impl Into<String>,
        nick: impl Into<String>,
        user: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Event::Who {
            channel: channel.into(),
            nick: nick.into(),
            user: user.into(),
            host: host.into(),
        }
    }
}
